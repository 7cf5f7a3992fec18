//! Folding service occurrences into one record per identity key.
//!
//! Merge rules:
//! - customer id and admin state follow the latest occurrence
//! - other scalars keep the first non-empty value
//! - access points are concatenated
//! - naturally keyed lists (bindings, routes, neighbors) are deduplicated
//! - interfaces, BGP groups and OSPF areas merge by name

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::mem;

use tracing::debug;

use crate::model::{
    Bgp, BgpGroup, Circuit, Ospf, OspfArea, PointBinding, RoutedInterface, RoutingContext, Service,
    ServiceDetail, ServiceKey, SwitchingDomain,
};

/// Fold services into one record per `(type, id)`, in first-seen order.
pub fn reconcile(services: impl IntoIterator<Item = Service>) -> Vec<Service> {
    let mut merged: Vec<Service> = Vec::new();
    let mut index: HashMap<ServiceKey, usize> = HashMap::new();

    for service in services {
        match index.get(&service.key()) {
            Some(&pos) => {
                debug!(
                    kind = service.service_type().keyword(),
                    service_id = service.service_id,
                    "merging repeated service occurrence"
                );
                absorb(&mut merged[pos], service);
            }
            None => {
                index.insert(service.key(), merged.len());
                merged.push(service);
            }
        }
    }

    merged
}

/// Merge two records with the same identity key.
///
/// `existing` wins every descriptive scalar it has a value for. Customer id
/// and admin state come from `incoming`, so a later full definition
/// overrides an earlier skeleton.
pub fn merge_services(mut existing: Service, incoming: Service) -> Service {
    absorb(&mut existing, incoming);
    existing
}

fn absorb(existing: &mut Service, incoming: Service) {
    match (&mut existing.detail, incoming.detail) {
        (ServiceDetail::PointToPointCircuit(a), ServiceDetail::PointToPointCircuit(b)) => {
            *a = merge_circuit(mem::take(a), b);
        }
        (ServiceDetail::MultipointDomain(a), ServiceDetail::MultipointDomain(b)) => {
            *a = merge_domain(mem::take(a), b);
        }
        (ServiceDetail::RoutingInstance(a), ServiceDetail::RoutingInstance(b))
        | (ServiceDetail::InternetEnhanced(a), ServiceDetail::InternetEnhanced(b))
        | (ServiceDetail::BaseRouter(a), ServiceDetail::BaseRouter(b)) => {
            *a = merge_routing(mem::take(a), b);
        }
        _ => {}
    }

    existing.customer_id = incoming.customer_id;
    existing.service_name = first_named(existing.service_name.take(), incoming.service_name);
    existing.description = first_text(mem::take(&mut existing.description), incoming.description);
    existing.admin_state = incoming.admin_state;
    existing.service_mtu = existing.service_mtu.or(incoming.service_mtu);
}

fn merge_circuit(mut existing: Circuit, incoming: Circuit) -> Circuit {
    existing.access_points.extend(incoming.access_points);
    extend_unique(&mut existing.spoke_bindings, incoming.spoke_bindings, binding_key);
    existing
}

fn merge_domain(mut existing: SwitchingDomain, incoming: SwitchingDomain) -> SwitchingDomain {
    existing.access_points.extend(incoming.access_points);
    extend_unique(&mut existing.spoke_bindings, incoming.spoke_bindings, binding_key);
    extend_unique(&mut existing.mesh_bindings, incoming.mesh_bindings, binding_key);
    existing.fdb_table_size = existing.fdb_table_size.or(incoming.fdb_table_size);
    existing
}

fn merge_routing(mut existing: RoutingContext, incoming: RoutingContext) -> RoutingContext {
    existing.autonomous_system = existing.autonomous_system.or(incoming.autonomous_system);
    existing.route_distinguisher =
        first_named(existing.route_distinguisher, incoming.route_distinguisher);
    existing.vrf_target = first_named(existing.vrf_target, incoming.vrf_target);
    existing.ecmp = existing.ecmp.or(incoming.ecmp);
    merge_interfaces(&mut existing.interfaces, incoming.interfaces);
    existing.bgp = merge_bgp(existing.bgp, incoming.bgp);
    existing.ospf = match (existing.ospf, incoming.ospf) {
        (Some(a), Some(b)) => Some(merge_ospf(a, b)),
        (a, b) => a.or(b),
    };
    extend_unique(&mut existing.static_routes, incoming.static_routes, |route| route.clone());
    existing
}

/// Merge interfaces by name; unseen names are appended in order.
pub fn merge_interfaces(existing: &mut Vec<RoutedInterface>, incoming: Vec<RoutedInterface>) {
    for iface in incoming {
        match existing
            .iter_mut()
            .find(|known| known.interface_name == iface.interface_name)
        {
            Some(known) => {
                let current = mem::take(known);
                *known = merge_interface(current, iface);
            }
            None => existing.push(iface),
        }
    }
}

/// Merge two records of the same interface, keeping the first non-empty values.
pub fn merge_interface(existing: RoutedInterface, incoming: RoutedInterface) -> RoutedInterface {
    RoutedInterface {
        interface_name: existing.interface_name,
        description: first_named(existing.description, incoming.description),
        ip_address: first_named(existing.ip_address, incoming.ip_address),
        port_id: first_named(existing.port_id, incoming.port_id),
        sap_id: first_named(existing.sap_id, incoming.sap_id),
        mtu: existing.mtu.or(incoming.mtu),
        vrrp_group_id: existing.vrrp_group_id.or(incoming.vrrp_group_id),
        vrrp_backup_ip: first_named(existing.vrrp_backup_ip, incoming.vrrp_backup_ip),
        vrrp_priority: existing.vrrp_priority.or(incoming.vrrp_priority),
        bound_domain: first_named(existing.bound_domain, incoming.bound_domain),
        spoke_binding_id: first_named(existing.spoke_binding_id, incoming.spoke_binding_id),
        ingress_qos: existing.ingress_qos.or(incoming.ingress_qos),
        egress_qos: existing.egress_qos.or(incoming.egress_qos),
        port_description: first_named(existing.port_description, incoming.port_description),
        port_ethernet: existing.port_ethernet.or(incoming.port_ethernet),
        admin_state: existing.admin_state,
    }
}

fn merge_bgp(mut existing: Bgp, incoming: Bgp) -> Bgp {
    existing.router_id = first_named(existing.router_id, incoming.router_id);
    existing.split_horizon |= incoming.split_horizon;
    for group in incoming.groups {
        match existing
            .groups
            .iter_mut()
            .find(|known| known.group_name == group.group_name)
        {
            Some(known) => merge_group(known, group),
            None => existing.groups.push(group),
        }
    }
    extend_unique(&mut existing.neighbors, incoming.neighbors, |n| n.neighbor_ip.clone());
    existing
}

fn merge_group(existing: &mut BgpGroup, incoming: BgpGroup) {
    existing.peer_as = existing.peer_as.or(incoming.peer_as);
    extend_unique(&mut existing.neighbors, incoming.neighbors, |n| n.neighbor_ip.clone());
}

fn merge_ospf(mut existing: Ospf, incoming: Ospf) -> Ospf {
    for area in incoming.areas {
        match existing
            .areas
            .iter_mut()
            .find(|known| known.area_id == area.area_id)
        {
            Some(known) => merge_area(known, area),
            None => existing.areas.push(area),
        }
    }
    existing
}

fn merge_area(existing: &mut OspfArea, incoming: OspfArea) {
    extend_unique(&mut existing.interfaces, incoming.interfaces, |iface| {
        iface.interface_name.clone()
    });
}

fn binding_key(binding: &PointBinding) -> (u32, u32) {
    (binding.sdp_id, binding.vc_id)
}

/// Append items of `incoming` whose key is not yet present.
fn extend_unique<T, K, F>(existing: &mut Vec<T>, incoming: Vec<T>, key: F)
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen: HashSet<K> = existing.iter().map(&key).collect();
    for item in incoming {
        if seen.insert(key(&item)) {
            existing.push(item);
        }
    }
}

fn first_text(existing: String, incoming: String) -> String {
    if existing.is_empty() { incoming } else { existing }
}

fn first_named(existing: Option<String>, incoming: Option<String>) -> Option<String> {
    existing
        .filter(|value| !value.is_empty())
        .or(incoming.filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessPoint, AdminState, BgpNeighbor, StaticRoute};

    fn epipe(description: &str, saps: &[&str], spokes: &[(u32, u32)]) -> Service {
        Service {
            service_id: 1001,
            customer_id: 1,
            service_name: None,
            description: description.to_string(),
            admin_state: AdminState::Up,
            service_mtu: None,
            detail: ServiceDetail::PointToPointCircuit(Circuit {
                access_points: saps
                    .iter()
                    .map(|sap| AccessPoint {
                        sap_id: sap.to_string(),
                        port_id: sap.split(':').next().unwrap_or_default().to_string(),
                        vlan_id: 0,
                        description: String::new(),
                        admin_state: AdminState::Up,
                        ingress_qos: None,
                        egress_qos: None,
                        llf: false,
                        port_description: None,
                        port_ethernet: None,
                    })
                    .collect(),
                spoke_bindings: spokes
                    .iter()
                    .map(|&(sdp_id, vc_id)| PointBinding {
                        sdp_id,
                        vc_id,
                        description: String::new(),
                    })
                    .collect(),
            }),
        }
    }

    #[test]
    fn first_description_wins_and_saps_concatenate() {
        let merged = reconcile(vec![
            epipe("First", &["1/1/1:100"], &[(12, 1001)]),
            epipe("", &["1/1/2:100"], &[(12, 1001), (13, 1001)]),
            epipe("Third", &[], &[]),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].description, "First");
        let saps = merged[0]
            .access_points()
            .iter()
            .map(|ap| ap.sap_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(saps, vec!["1/1/1:100", "1/1/2:100"]);
        let ServiceDetail::PointToPointCircuit(circuit) = &merged[0].detail else {
            panic!("expected a circuit");
        };
        assert_eq!(circuit.spoke_bindings.len(), 2);
    }

    #[test]
    fn empty_first_description_takes_later_value() {
        let merged = reconcile(vec![epipe("", &[], &[]), epipe("Later", &[], &[])]);
        assert_eq!(merged[0].description, "Later");
    }

    #[test]
    fn reconcile_is_idempotent() {
        let once = reconcile(vec![
            epipe("a", &["1/1/1:1"], &[(1, 1)]),
            epipe("b", &["1/1/1:2"], &[(1, 1)]),
        ]);
        let twice = reconcile(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn later_occurrence_decides_admin_state_and_customer() {
        let skeleton = Service {
            customer_id: 1,
            admin_state: AdminState::Down,
            ..epipe("", &[], &[])
        };
        let full = Service {
            customer_id: 7,
            admin_state: AdminState::Up,
            ..epipe("Full", &["1/1/1:100"], &[])
        };

        let merged = reconcile(vec![skeleton, full]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].admin_state, AdminState::Up);
        assert_eq!(merged[0].customer_id, 7);
        assert_eq!(merged[0].description, "Full");
    }

    fn neighbor(ip: &str, group: Option<&str>) -> BgpNeighbor {
        BgpNeighbor {
            neighbor_ip: ip.to_string(),
            peer_as: Some(65001),
            group: group.map(str::to_string),
        }
    }

    fn bgp_context() -> RoutingContext {
        RoutingContext {
            bgp: Bgp {
                router_id: Some("10.0.0.1".to_string()),
                split_horizon: false,
                groups: vec![BgpGroup {
                    group_name: "ce".to_string(),
                    peer_as: Some(65001),
                    neighbors: vec![neighbor("192.0.2.1", Some("ce"))],
                }],
                neighbors: vec![
                    neighbor("192.0.2.1", Some("ce")),
                    neighbor("198.51.100.1", None),
                ],
            },
            ..RoutingContext::default()
        }
    }

    #[test]
    fn bgp_neighbors_deduplicate_by_address() {
        let mut incoming = bgp_context();
        incoming.bgp.neighbors.push(neighbor("203.0.113.9", None));

        let merged = merge_routing(bgp_context(), incoming);
        let addresses = merged
            .bgp
            .neighbors
            .iter()
            .map(|n| n.neighbor_ip.as_str())
            .collect::<Vec<_>>();
        assert_eq!(addresses, vec!["192.0.2.1", "198.51.100.1", "203.0.113.9"]);
        assert_eq!(merged.bgp.groups.len(), 1);
        assert_eq!(merged.bgp.groups[0].neighbors.len(), 1);
    }

    #[test]
    fn interfaces_merge_by_name() {
        let mut interfaces = vec![RoutedInterface {
            interface_name: "to-ce".to_string(),
            ip_address: Some("10.0.0.1/30".to_string()),
            ..RoutedInterface::default()
        }];
        merge_interfaces(
            &mut interfaces,
            vec![
                RoutedInterface {
                    interface_name: "to-ce".to_string(),
                    ip_address: Some("10.9.9.9/30".to_string()),
                    port_id: Some("1/1/3".to_string()),
                    ..RoutedInterface::default()
                },
                RoutedInterface {
                    interface_name: "loop".to_string(),
                    ..RoutedInterface::default()
                },
            ],
        );

        assert_eq!(interfaces.len(), 2);
        assert_eq!(interfaces[0].ip_address.as_deref(), Some("10.0.0.1/30"));
        assert_eq!(interfaces[0].port_id.as_deref(), Some("1/1/3"));
    }

    #[test]
    fn static_routes_deduplicate_on_merge() {
        let route = StaticRoute {
            prefix: "0.0.0.0/0".to_string(),
            next_hop: "10.0.0.1".to_string(),
        };
        let existing = RoutingContext {
            static_routes: vec![route.clone()],
            ..RoutingContext::default()
        };
        let incoming = RoutingContext {
            static_routes: vec![route.clone()],
            ..RoutingContext::default()
        };
        assert_eq!(merge_routing(existing, incoming).static_routes, vec![route]);
    }
}

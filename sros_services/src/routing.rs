use sros_ir::Block;

use crate::extract::{admin_state, description, qos_reference};
use crate::model::{
    Bgp, BgpGroup, BgpNeighbor, Ospf, OspfArea, OspfInterface, RoutedInterface,
};
use crate::patterns::{
    BGP_GROUP, BGP_NEIGHBOR, BOUND_DOMAIN, INTERFACE_OPEN, INTERFACE_SPOKE, IP_ADDRESS, MTU,
    OSPF_AREA, OSPF_INTERFACE, OSPF_INTERFACE_TYPE, OSPF_OPEN, PEER_AS, PORT, ROUTER_ID, SAP_OPEN,
    VRRP, VRRP_BACKUP, VRRP_PRIORITY, capture, capture_u32,
};
use crate::qos::QosDirection;

/// Build a routed interface from its block.
pub fn routed_interface(name: &str, block: &Block<'_>) -> RoutedInterface {
    let text = block.text();
    let sap_id = capture(&SAP_OPEN, &text).map(str::to_string);
    let port_id = sap_id
        .clone()
        .or_else(|| capture(&PORT, &text).map(str::to_string));

    RoutedInterface {
        interface_name: name.to_string(),
        description: description(&block.own_text()),
        ip_address: capture(&IP_ADDRESS, &text).map(str::to_string),
        port_id,
        sap_id,
        mtu: capture_u32(&MTU, &text),
        vrrp_group_id: capture_u32(&VRRP, &text),
        vrrp_backup_ip: capture(&VRRP_BACKUP, &text).map(str::to_string),
        vrrp_priority: capture_u32(&VRRP_PRIORITY, &text),
        bound_domain: capture(&BOUND_DOMAIN, &text).map(str::to_string),
        spoke_binding_id: capture(&INTERFACE_SPOKE, &text).map(str::to_string),
        ingress_qos: qos_reference(&text, QosDirection::Ingress),
        egress_qos: qos_reference(&text, QosDirection::Egress),
        port_description: None,
        port_ethernet: None,
        admin_state: admin_state(&text),
    }
}

/// `interface "<name>" create` blocks in the body of a service.
///
/// Each matched interface is consumed whole, so nested `interface` lines
/// (for example under a protocol section) are not reported twice.
pub fn service_interfaces(block: &Block<'_>) -> Vec<RoutedInterface> {
    let mut interfaces = Vec::new();
    let mut next = block.start + 1;

    for (idx, line) in block.body() {
        if idx < next || line.kind.is_trivia() {
            continue;
        }
        let Some(caps) = INTERFACE_OPEN.captures(&line.raw) else {
            continue;
        };
        if caps.get(2).is_none() {
            continue;
        }
        let Some(iface) = block.child_block(idx) else {
            continue;
        };
        interfaces.push(routed_interface(&caps[1], &iface));
        next = iface.end + 1;
    }

    interfaces
}

/// First nested block whose trimmed opener satisfies `matches`.
pub fn find_section<'a>(block: &Block<'a>, matches: impl Fn(&str) -> bool) -> Option<Block<'a>> {
    block
        .body()
        .filter(|(_, line)| !line.kind.is_trivia() && matches(line.trimmed()))
        .find_map(|(idx, _)| block.child_block(idx))
}

/// BGP section of a routing context; an empty [`Bgp`] when absent.
pub fn bgp(block: &Block<'_>) -> Bgp {
    let mut bgp = Bgp::default();
    let Some(section) = find_section(block, |line| line.eq_ignore_ascii_case("bgp")) else {
        return bgp;
    };
    bgp.router_id = capture(&ROUTER_ID, &section.own_text()).map(str::to_string);

    let mut next = section.start + 1;
    for (idx, line) in section.body() {
        if idx < next || line.kind.is_trivia() {
            continue;
        }
        let trimmed = line.trimmed();

        if trimmed.eq_ignore_ascii_case("split-horizon") {
            bgp.split_horizon = true;
        } else if let Some(name) = capture(&BGP_GROUP, trimmed) {
            let Some(group_block) = section.child_block(idx) else {
                continue;
            };
            let group = bgp_group(name, &group_block);
            for neighbor in &group.neighbors {
                push_neighbor(&mut bgp.neighbors, neighbor.clone());
            }
            bgp.groups.push(group);
            next = group_block.end + 1;
        } else if let Some(ip) = capture(&BGP_NEIGHBOR, trimmed) {
            let neighbor_block = section.child_block(idx);
            push_neighbor(
                &mut bgp.neighbors,
                BgpNeighbor {
                    neighbor_ip: ip.to_string(),
                    peer_as: neighbor_block.as_ref().and_then(peer_as),
                    group: None,
                },
            );
            if let Some(neighbor_block) = neighbor_block {
                next = neighbor_block.end + 1;
            }
        }
    }

    bgp
}

fn bgp_group(name: &str, block: &Block<'_>) -> BgpGroup {
    let group_as = block
        .own_lines()
        .into_iter()
        .skip(1)
        .find_map(|line| capture_u32(&PEER_AS, line.trimmed()));
    let mut group = BgpGroup {
        group_name: name.to_string(),
        peer_as: group_as,
        neighbors: Vec::new(),
    };

    let mut next = block.start + 1;
    for (idx, line) in block.body() {
        if idx < next || line.kind.is_trivia() {
            continue;
        }
        let Some(ip) = capture(&BGP_NEIGHBOR, line.trimmed()) else {
            continue;
        };
        let neighbor_block = block.child_block(idx);
        push_neighbor(
            &mut group.neighbors,
            BgpNeighbor {
                neighbor_ip: ip.to_string(),
                peer_as: neighbor_block.as_ref().and_then(peer_as).or(group_as),
                group: Some(name.to_string()),
            },
        );
        if let Some(neighbor_block) = neighbor_block {
            next = neighbor_block.end + 1;
        }
    }

    group
}

fn peer_as(block: &Block<'_>) -> Option<u32> {
    block
        .body()
        .find_map(|(_, line)| capture_u32(&PEER_AS, line.trimmed()))
}

fn push_neighbor(neighbors: &mut Vec<BgpNeighbor>, neighbor: BgpNeighbor) {
    if neighbors
        .iter()
        .all(|existing| existing.neighbor_ip != neighbor.neighbor_ip)
    {
        neighbors.push(neighbor);
    }
}

/// OSPF section of a routing context, when present.
pub fn ospf(block: &Block<'_>) -> Option<Ospf> {
    let section = find_section(block, |line| OSPF_OPEN.is_match(line))?;
    let mut ospf = Ospf {
        admin_state: admin_state(&section.own_text()),
        areas: Vec::new(),
    };

    let mut next = section.start + 1;
    for (idx, line) in section.body() {
        if idx < next || line.kind.is_trivia() {
            continue;
        }
        let Some(area_id) = capture(&OSPF_AREA, line.trimmed()) else {
            continue;
        };
        let Some(area_block) = section.child_block(idx) else {
            ospf.areas.push(OspfArea {
                area_id: area_id.to_string(),
                interfaces: Vec::new(),
            });
            continue;
        };
        ospf.areas.push(OspfArea {
            area_id: area_id.to_string(),
            interfaces: ospf_interfaces(&area_block),
        });
        next = area_block.end + 1;
    }

    Some(ospf)
}

fn ospf_interfaces(area: &Block<'_>) -> Vec<OspfInterface> {
    let mut interfaces = Vec::new();
    let mut next = area.start + 1;

    for (idx, line) in area.body() {
        if idx < next || line.kind.is_trivia() {
            continue;
        }
        let Some(name) = capture(&OSPF_INTERFACE, line.trimmed()) else {
            continue;
        };
        let interface = match area.child_block(idx) {
            Some(iface) => {
                next = iface.end + 1;
                let text = iface.text();
                OspfInterface {
                    interface_name: name.to_string(),
                    interface_type: capture(&OSPF_INTERFACE_TYPE, &text).map(str::to_string),
                    admin_state: admin_state(&text),
                }
            }
            None => OspfInterface {
                interface_name: name.to_string(),
                interface_type: None,
                admin_state: Default::default(),
            },
        };
        interfaces.push(interface);
    }

    interfaces
}

use serde::{Deserialize, Serialize};
use sros_ir::ScanFinding;

/// Reserved name of the synthetic base-router record.
pub const BASE_ROUTER_NAME: &str = "Base Router";

/// Description attached to the synthetic base-router record.
pub const BASE_ROUTER_DESCRIPTION: &str = "Global Base Routing Table";

/// Hostname reported when the configuration does not name the system.
pub const UNKNOWN_HOSTNAME: &str = "Unknown";

/// Parsed model of one configuration text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    pub hostname: String,
    pub system_ip: String,
    pub services: Vec<Service>,
    pub sdps: Vec<SdpBinding>,
    pub metadata: DocumentMetadata,
}

impl ConfigurationDocument {
    /// Service with the given identity key.
    pub fn service(&self, service_type: ServiceType, service_id: u32) -> Option<&Service> {
        self.services
            .iter()
            .find(|service| service.key() == (service_type, service_id))
    }

    /// The synthetic base-router record, when one was emitted.
    pub fn base_router(&self) -> Option<&Service> {
        self.service(ServiceType::BaseRouter, 0)
    }

    /// Number of routed interfaces across all services.
    pub fn interface_count(&self) -> usize {
        self.services
            .iter()
            .filter_map(Service::routing)
            .map(|routing| routing.interfaces.len())
            .sum()
    }
}

/// Size counters and scanner findings for a parsed text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub line_count: usize,
    pub original_bytes: usize,
    pub findings: Vec<ScanFinding>,
}

/// Service kind; together with the numeric id it forms the identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    PointToPointCircuit,
    MultipointDomain,
    RoutingInstance,
    InternetEnhanced,
    BaseRouter,
}

impl ServiceType {
    /// Map a configuration keyword (`epipe`, `vpls`, `vprn`, `ies`) to its kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "epipe" => Some(Self::PointToPointCircuit),
            "vpls" => Some(Self::MultipointDomain),
            "vprn" => Some(Self::RoutingInstance),
            "ies" => Some(Self::InternetEnhanced),
            _ => None,
        }
    }

    /// Configuration keyword for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::PointToPointCircuit => "epipe",
            Self::MultipointDomain => "vpls",
            Self::RoutingInstance => "vprn",
            Self::InternetEnhanced => "ies",
            Self::BaseRouter => "router",
        }
    }
}

/// Identity of a service within one document.
pub type ServiceKey = (ServiceType, u32);

/// Administrative state derived from `shutdown` / `no shutdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    #[default]
    Up,
    Down,
}

/// One logical service after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub service_id: u32,
    pub customer_id: u32,
    pub service_name: Option<String>,
    pub description: String,
    pub admin_state: AdminState,
    pub service_mtu: Option<u32>,
    #[serde(flatten)]
    pub detail: ServiceDetail,
}

impl Service {
    pub fn service_type(&self) -> ServiceType {
        match self.detail {
            ServiceDetail::PointToPointCircuit(_) => ServiceType::PointToPointCircuit,
            ServiceDetail::MultipointDomain(_) => ServiceType::MultipointDomain,
            ServiceDetail::RoutingInstance(_) => ServiceType::RoutingInstance,
            ServiceDetail::InternetEnhanced(_) => ServiceType::InternetEnhanced,
            ServiceDetail::BaseRouter(_) => ServiceType::BaseRouter,
        }
    }

    pub fn key(&self) -> ServiceKey {
        (self.service_type(), self.service_id)
    }

    /// Access points of a circuit or switching domain; empty for routed kinds.
    pub fn access_points(&self) -> &[AccessPoint] {
        match &self.detail {
            ServiceDetail::PointToPointCircuit(circuit) => &circuit.access_points,
            ServiceDetail::MultipointDomain(domain) => &domain.access_points,
            _ => &[],
        }
    }

    pub fn access_points_mut(&mut self) -> Option<&mut Vec<AccessPoint>> {
        match &mut self.detail {
            ServiceDetail::PointToPointCircuit(circuit) => Some(&mut circuit.access_points),
            ServiceDetail::MultipointDomain(domain) => Some(&mut domain.access_points),
            _ => None,
        }
    }

    /// Routing body of a routing instance, internet-enhanced service or base router.
    pub fn routing(&self) -> Option<&RoutingContext> {
        match &self.detail {
            ServiceDetail::RoutingInstance(routing)
            | ServiceDetail::InternetEnhanced(routing)
            | ServiceDetail::BaseRouter(routing) => Some(routing),
            _ => None,
        }
    }

    pub fn routing_mut(&mut self) -> Option<&mut RoutingContext> {
        match &mut self.detail {
            ServiceDetail::RoutingInstance(routing)
            | ServiceDetail::InternetEnhanced(routing)
            | ServiceDetail::BaseRouter(routing) => Some(routing),
            _ => None,
        }
    }
}

/// Variant-specific service body, tagged by `service_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service_type", rename_all = "kebab-case")]
pub enum ServiceDetail {
    PointToPointCircuit(Circuit),
    MultipointDomain(SwitchingDomain),
    RoutingInstance(RoutingContext),
    InternetEnhanced(RoutingContext),
    BaseRouter(RoutingContext),
}

/// Point-to-point circuit body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Circuit {
    pub access_points: Vec<AccessPoint>,
    pub spoke_bindings: Vec<PointBinding>,
}

/// Multipoint switching-domain body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwitchingDomain {
    pub access_points: Vec<AccessPoint>,
    pub spoke_bindings: Vec<PointBinding>,
    pub mesh_bindings: Vec<MeshBinding>,
    pub fdb_table_size: Option<u32>,
}

/// Spoke-style pseudowire binding `<sdp_id>:<vc_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBinding {
    pub sdp_id: u32,
    pub vc_id: u32,
    pub description: String,
}

/// Mesh bindings carry the same fields as spoke bindings.
pub type MeshBinding = PointBinding;

/// Service access point (`sap <port>[:<vlan>]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub sap_id: String,
    pub port_id: String,
    pub vlan_id: u32,
    pub description: String,
    pub admin_state: AdminState,
    pub ingress_qos: Option<QosReference>,
    pub egress_qos: Option<QosReference>,
    pub llf: bool,
    /// Description of the physical port, attached after parsing.
    pub port_description: Option<String>,
    pub port_ethernet: Option<PortEthernet>,
}

/// QoS policy reference with the rate resolved from a policy table, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosReference {
    pub policy_id: u32,
    pub rate_kbps: Option<u64>,
    pub rate_max: bool,
}

impl QosReference {
    pub fn new(policy_id: u32) -> Self {
        Self {
            policy_id,
            rate_kbps: None,
            rate_max: false,
        }
    }

    /// Short rate label; falls back to the bare policy id when no rate is known.
    pub fn rate_label(&self) -> String {
        match (self.rate_kbps, self.rate_max) {
            (Some(kbps), _) if kbps >= 1_000_000 && kbps % 1_000_000 == 0 => {
                format!("{}G", kbps / 1_000_000)
            }
            (Some(kbps), _) if kbps >= 1_000 && kbps % 1_000 == 0 => format!("{}M", kbps / 1_000),
            (Some(kbps), _) => format!("{kbps}K"),
            (None, true) => "max".to_string(),
            (None, false) => format!("qos-{}", self.policy_id),
        }
    }
}

/// Routing body shared by routing instances and the base router.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoutingContext {
    pub autonomous_system: Option<u32>,
    pub route_distinguisher: Option<String>,
    pub vrf_target: Option<String>,
    pub ecmp: Option<u32>,
    pub interfaces: Vec<RoutedInterface>,
    pub bgp: Bgp,
    pub ospf: Option<Ospf>,
    pub static_routes: Vec<StaticRoute>,
}

impl RoutingContext {
    /// Flat neighbor list covering grouped and ungrouped neighbors.
    pub fn bgp_neighbors(&self) -> &[BgpNeighbor] {
        &self.bgp.neighbors
    }

    pub fn interface(&self, name: &str) -> Option<&RoutedInterface> {
        self.interfaces
            .iter()
            .find(|iface| iface.interface_name == name)
    }
}

/// Layer-3 interface of a routing context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoutedInterface {
    pub interface_name: String,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    /// Physical port, or the SAP id when bound through a SAP.
    pub port_id: Option<String>,
    pub sap_id: Option<String>,
    pub mtu: Option<u32>,
    pub vrrp_group_id: Option<u32>,
    pub vrrp_backup_ip: Option<String>,
    pub vrrp_priority: Option<u32>,
    /// Switching domain bound to the interface (routed VPLS).
    pub bound_domain: Option<String>,
    pub spoke_binding_id: Option<String>,
    pub ingress_qos: Option<QosReference>,
    pub egress_qos: Option<QosReference>,
    pub port_description: Option<String>,
    pub port_ethernet: Option<PortEthernet>,
    pub admin_state: AdminState,
}

/// BGP configuration of a routing context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bgp {
    pub router_id: Option<String>,
    pub split_horizon: bool,
    pub groups: Vec<BgpGroup>,
    /// Every neighbor, grouped or not, in declaration order.
    pub neighbors: Vec<BgpNeighbor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpGroup {
    pub group_name: String,
    pub peer_as: Option<u32>,
    pub neighbors: Vec<BgpNeighbor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpNeighbor {
    pub neighbor_ip: String,
    /// Neighbor-level peer AS, or the group default when the neighbor has none.
    pub peer_as: Option<u32>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ospf {
    pub admin_state: AdminState,
    pub areas: Vec<OspfArea>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfArea {
    pub area_id: String,
    pub interfaces: Vec<OspfInterface>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfInterface {
    pub interface_name: String,
    pub interface_type: Option<String>,
    pub admin_state: AdminState,
}

/// Static route; `(prefix, next_hop)` is its natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaticRoute {
    pub prefix: String,
    pub next_hop: String,
}

/// Transport tunnel definition (`sdp <id> mpls|gre create`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdpBinding {
    pub sdp_id: u32,
    pub far_end: String,
    pub lsp_name: Option<String>,
    pub delivery: DeliveryType,
    pub admin_state: AdminState,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Mpls,
    Gre,
}

/// Ethernet settings of a physical port.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortEthernet {
    pub mode: Option<String>,
    pub encap_type: Option<String>,
    pub mtu: Option<u32>,
    pub speed: Option<String>,
    pub autonegotiate: Option<String>,
    pub network_queue_policy: Option<String>,
    pub lldp_admin_status: Option<String>,
}

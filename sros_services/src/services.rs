use sros_ir::{Block, BlockClose, Line, ScanFinding, extract_block};
use tracing::debug;

use crate::access::{access_points, mesh_bindings, spoke_bindings};
use crate::extract::{admin_state, description, static_routes};
use crate::model::{
    Circuit, RoutingContext, Service, ServiceDetail, ServiceType, SwitchingDomain,
};
use crate::patterns::{
    AUTONOMOUS_SYSTEM, ECMP, FDB_TABLE_SIZE, ROUTE_DISTINGUISHER, SERVICE_HEADER, SERVICE_MTU,
    SERVICE_NAME, VRF_TARGET, VRF_TARGET_ANY, capture, capture_u32,
};
use crate::routing::{bgp, ospf, service_interfaces};

/// One textual occurrence of a service header and its block.
#[derive(Debug, Clone)]
pub struct ServiceOccurrence<'a> {
    pub service_type: ServiceType,
    pub service_id: u32,
    pub customer_id: u32,
    /// `name "..."` given on the header line.
    pub name_hint: Option<String>,
    pub block: Block<'a>,
}

impl ServiceOccurrence<'_> {
    /// Note for blocks that did not end on their own `exit`.
    pub fn close_finding(&self) -> Option<ScanFinding> {
        let reason = match self.block.close {
            BlockClose::Exit => return None,
            BlockClose::Implicit => "closed by a less indented line",
            BlockClose::EndOfInput => "still open at end of input",
        };
        Some(ScanFinding {
            code: "implicit-close".to_string(),
            message: format!(
                "{} {} block {reason}",
                self.service_type.keyword(),
                self.service_id
            ),
            span: self.block.opener().span.clone(),
        })
    }

    /// Parse the block into a single-occurrence service record.
    pub fn parse(&self) -> Service {
        let name_hint = self.name_hint.as_deref();
        match self.service_type {
            ServiceType::PointToPointCircuit => {
                parse_point_to_point(self.service_id, self.customer_id, &self.block, name_hint)
            }
            ServiceType::MultipointDomain => {
                parse_multipoint(self.service_id, self.customer_id, &self.block, name_hint)
            }
            ServiceType::RoutingInstance
            | ServiceType::InternetEnhanced
            | ServiceType::BaseRouter => parse_routed(
                self.service_type,
                self.service_id,
                self.customer_id,
                &self.block,
                name_hint,
            ),
        }
    }
}

/// Every service header in `lines`, in source order.
///
/// A header's block is skipped after it is located, so a header never nests
/// inside another service block.
pub fn locate_services(lines: &[Line]) -> Vec<ServiceOccurrence<'_>> {
    let mut occurrences = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        let header = (!line.kind.is_trivia())
            .then(|| SERVICE_HEADER.captures(line.trimmed()))
            .flatten();
        let Some(caps) = header else {
            idx += 1;
            continue;
        };
        let (Some(service_type), Ok(service_id), Ok(customer_id)) = (
            ServiceType::from_keyword(&caps[1]),
            caps[2].parse::<u32>(),
            caps[4].parse::<u32>(),
        ) else {
            idx += 1;
            continue;
        };
        let Some(block) = extract_block(lines, idx) else {
            idx += 1;
            continue;
        };

        debug!(
            kind = service_type.keyword(),
            service_id,
            start = block.start,
            end = block.end,
            "service occurrence"
        );
        occurrences.push(ServiceOccurrence {
            service_type,
            service_id,
            customer_id,
            name_hint: caps.get(3).map(|m| m.as_str().to_string()),
            block,
        });
        idx = block.end + 1;
    }

    occurrences
}

/// Parse a point-to-point circuit (`epipe`) block.
pub fn parse_point_to_point(
    service_id: u32,
    customer_id: u32,
    block: &Block<'_>,
    name_hint: Option<&str>,
) -> Service {
    let text = block.text();
    let detail = ServiceDetail::PointToPointCircuit(Circuit {
        access_points: access_points(&text),
        spoke_bindings: spoke_bindings(&text),
    });
    service_record(service_id, customer_id, block, &text, name_hint, detail)
}

/// Parse a multipoint switching-domain (`vpls`) block.
pub fn parse_multipoint(
    service_id: u32,
    customer_id: u32,
    block: &Block<'_>,
    name_hint: Option<&str>,
) -> Service {
    let text = block.text();
    let detail = ServiceDetail::MultipointDomain(SwitchingDomain {
        access_points: access_points(&text),
        spoke_bindings: spoke_bindings(&text),
        mesh_bindings: mesh_bindings(&text),
        fdb_table_size: capture_u32(&FDB_TABLE_SIZE, &block.own_text()),
    });
    service_record(service_id, customer_id, block, &text, name_hint, detail)
}

/// Parse a routing instance (`vprn`) or internet-enhanced (`ies`) block.
pub fn parse_routed(
    service_type: ServiceType,
    service_id: u32,
    customer_id: u32,
    block: &Block<'_>,
    name_hint: Option<&str>,
) -> Service {
    let text = block.text();
    let routing = routing_context(block);
    let detail = match service_type {
        ServiceType::InternetEnhanced => ServiceDetail::InternetEnhanced(routing),
        ServiceType::BaseRouter => ServiceDetail::BaseRouter(routing),
        _ => ServiceDetail::RoutingInstance(routing),
    };
    service_record(service_id, customer_id, block, &text, name_hint, detail)
}

/// Routing body of a service block.
pub fn routing_context(block: &Block<'_>) -> RoutingContext {
    let own = block.own_text();
    RoutingContext {
        autonomous_system: capture_u32(&AUTONOMOUS_SYSTEM, &own),
        route_distinguisher: capture(&ROUTE_DISTINGUISHER, &own).map(str::to_string),
        vrf_target: capture(&VRF_TARGET, &own)
            .or_else(|| capture(&VRF_TARGET_ANY, &own))
            .map(str::to_string),
        ecmp: capture_u32(&ECMP, &own),
        interfaces: service_interfaces(block),
        bgp: bgp(block),
        ospf: ospf(block),
        static_routes: static_routes(block.lines()),
    }
}

fn service_record(
    service_id: u32,
    customer_id: u32,
    block: &Block<'_>,
    text: &str,
    name_hint: Option<&str>,
    detail: ServiceDetail,
) -> Service {
    let own = block.own_text();
    let service_name = capture(&SERVICE_NAME, &own)
        .or(name_hint)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Service {
        service_id,
        customer_id,
        service_name,
        description: description(&own).unwrap_or_default(),
        admin_state: admin_state(text),
        service_mtu: capture_u32(&SERVICE_MTU, &own),
        detail,
    }
}

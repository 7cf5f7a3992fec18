//! Service and interface reconciliation for SR-OS style configuration text.
//!
//! This crate turns a configuration text into a [`ConfigurationDocument`]:
//! - service blocks are located with the indentation-aware block extractor
//!   from `sros_ir` and parsed into typed records
//! - repeated occurrences of one service are folded into one record
//! - interfaces and static routes outside every service form a synthetic
//!   base-router record
//!
//! Primary entrypoints:
//! - [`parse_configuration`]
//! - [`parse_with_options`]
//! - [`parse_bytes`]
//! - [`format_markdown_summary`]
//!
//! # Example
//!
//! ```rust
//! use sros_services::{ServiceType, parse_configuration};
//!
//! let config = "epipe 1001 customer 5 create
//!     description \"Test Circuit\"
//!     sap 1/1/1:100 create
//!     exit
//! exit
//! ";
//! let document = parse_configuration(config);
//! let epipe = document
//!     .service(ServiceType::PointToPointCircuit, 1001)
//!     .expect("epipe");
//! assert_eq!(epipe.description, "Test Circuit");
//! assert_eq!(epipe.access_points()[0].vlan_id, 100);
//! ```

mod access;
mod base_router;
mod error;
mod extract;
mod model;
mod options;
mod patterns;
mod ports;
mod qos;
mod reconcile;
mod report;
mod routing;
mod sdp;
mod services;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use sros_dialect_classic::scan_classic;
use sros_ir::{Line, ScannedConfig, extract_block};
use tracing::debug;

pub use access::{access_points, mesh_bindings, spoke_bindings};
pub use base_router::base_router;
pub use error::ParseError;
pub use extract::{admin_state, decompose_sap_id, description, qos_reference, static_routes};
pub use model::*;
pub use options::ParseOptions;
pub use ports::{PortInfo, port_table};
pub use qos::{NoQosPolicies, PolicyRate, QosDirection, QosPolicyLookup, QosPolicyTable};
pub use reconcile::{merge_interface, merge_interfaces, merge_services, reconcile};
pub use report::format_markdown_summary;
pub use routing::{bgp, ospf, routed_interface, service_interfaces};
pub use sdp::sdp_bindings;
pub use services::{
    ServiceOccurrence, locate_services, parse_multipoint, parse_point_to_point, parse_routed,
    routing_context,
};

use crate::patterns::{INTERFACE_OPEN, SYSTEM_ADDRESS, SYSTEM_NAME, capture};

/// Parse configuration text with default options.
pub fn parse_configuration(input: &str) -> ConfigurationDocument {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse configuration text; QoS rates come from the text's own policy definitions.
pub fn parse_with_options(input: &str, options: &ParseOptions) -> ConfigurationDocument {
    let scanned = scan_classic(input);
    if options.resolve_qos_rates {
        let table = QosPolicyTable::from_lines(&scanned.lines);
        build_document(&scanned, options, &table)
    } else {
        build_document(&scanned, options, &NoQosPolicies)
    }
}

/// Parse configuration text resolving QoS rates through `lookup`.
///
/// Use this when policy definitions live outside the parsed text.
pub fn parse_with_lookup<L>(input: &str, options: &ParseOptions, lookup: &L) -> ConfigurationDocument
where
    L: QosPolicyLookup + ?Sized,
{
    build_document(&scan_classic(input), options, lookup)
}

/// Parse raw bytes; fails only when they are not UTF-8 text.
///
/// A leading byte-order mark is ignored.
pub fn parse_bytes(
    bytes: &[u8],
    options: &ParseOptions,
) -> Result<ConfigurationDocument, ParseError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let input = std::str::from_utf8(bytes).map_err(|err| ParseError::NotText {
        valid_up_to: err.valid_up_to(),
    })?;
    Ok(parse_with_options(input, options))
}

fn build_document<L>(
    scanned: &ScannedConfig,
    options: &ParseOptions,
    lookup: &L,
) -> ConfigurationDocument
where
    L: QosPolicyLookup + ?Sized,
{
    let lines = &scanned.lines;
    let mut findings = scanned.metadata.findings.clone();

    let occurrences = locate_services(lines);
    findings.extend(occurrences.iter().filter_map(ServiceOccurrence::close_finding));
    let mut services = reconcile(occurrences.iter().map(ServiceOccurrence::parse));

    if options.include_base_router {
        let claimed = occurrences.iter().map(|occ| occ.block).collect::<Vec<_>>();
        services.extend(base_router(lines, &claimed));
    }

    let ports = if options.attach_port_details {
        port_table(lines)
    } else {
        HashMap::new()
    };
    for service in &mut services {
        enrich_service(service, &ports, lookup, options.resolve_qos_rates);
    }

    if options.drop_admin_down_services {
        services.retain(|service| service.admin_state == AdminState::Up);
    }

    let document = ConfigurationDocument {
        hostname: hostname(lines).unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string()),
        system_ip: system_ip(lines).unwrap_or_default(),
        services,
        sdps: sdp_bindings(lines),
        metadata: DocumentMetadata {
            line_count: scanned.metadata.line_count,
            original_bytes: scanned.metadata.original_bytes,
            findings,
        },
    };
    debug!(
        hostname = %document.hostname,
        services = document.services.len(),
        sdps = document.sdps.len(),
        "parsed configuration"
    );
    document
}

fn enrich_service<L>(
    service: &mut Service,
    ports: &HashMap<String, PortInfo>,
    lookup: &L,
    resolve_rates: bool,
) where
    L: QosPolicyLookup + ?Sized,
{
    if let Some(access_points) = service.access_points_mut() {
        for ap in access_points {
            if let Some(port) = ports.get(&ap.port_id) {
                ap.port_description = port.description.clone();
                ap.port_ethernet = port.ethernet.clone();
            }
            if resolve_rates {
                resolve_pair(&mut ap.ingress_qos, &mut ap.egress_qos, lookup);
            }
        }
    }

    if let Some(routing) = service.routing_mut() {
        for iface in &mut routing.interfaces {
            let port_key = iface
                .port_id
                .as_deref()
                .map(|port| port.split(':').next().unwrap_or(port));
            if let Some(port) = port_key.and_then(|key| ports.get(key)) {
                iface.port_description = port.description.clone();
                iface.port_ethernet = port.ethernet.clone();
            }
            if resolve_rates {
                resolve_pair(&mut iface.ingress_qos, &mut iface.egress_qos, lookup);
            }
        }
    }
}

fn resolve_pair<L>(ingress: &mut Option<QosReference>, egress: &mut Option<QosReference>, lookup: &L)
where
    L: QosPolicyLookup + ?Sized,
{
    if let Some(reference) = ingress {
        lookup.resolve(QosDirection::Ingress, reference);
    }
    if let Some(reference) = egress {
        lookup.resolve(QosDirection::Egress, reference);
    }
}

/// `name` inside the first `system` block.
fn hostname(lines: &[Line]) -> Option<String> {
    let idx = lines
        .iter()
        .position(|line| line.trimmed().eq_ignore_ascii_case("system"))?;
    let block = extract_block(lines, idx)?;
    capture(&SYSTEM_NAME, &block.own_text()).map(|name| name.trim().to_string())
}

/// Address of the first `interface "system"` block.
fn system_ip(lines: &[Line]) -> Option<String> {
    lines.iter().enumerate().find_map(|(idx, line)| {
        let caps = INTERFACE_OPEN.captures(&line.raw)?;
        if &caps[1] != "system" {
            return None;
        }
        let block = extract_block(lines, idx)?;
        capture(&SYSTEM_ADDRESS, &block.text()).map(str::to_string)
    })
}

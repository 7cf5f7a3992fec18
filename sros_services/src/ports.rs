use std::collections::HashMap;

use sros_ir::{Block, Line, LineKind, extract_block};

use crate::extract::description;
use crate::model::PortEthernet;
use crate::patterns::{PORT_OPEN, capture};

/// Descriptive details of one physical port.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortInfo {
    pub description: Option<String>,
    pub ethernet: Option<PortEthernet>,
}

/// Port details keyed by port id (`1/1/1`).
///
/// Only `port <id>` lines that open a block are read, so `port` attributes of
/// interfaces and LAG members never shadow the port definition. Repeated
/// definitions fill in fields the earlier one left empty.
pub fn port_table(lines: &[Line]) -> HashMap<String, PortInfo> {
    let mut ports: HashMap<String, PortInfo> = HashMap::new();

    for (idx, line) in lines.iter().enumerate() {
        if line.kind != LineKind::Opener {
            continue;
        }
        let Some(port_id) = capture(&PORT_OPEN, line.trimmed()) else {
            continue;
        };
        let Some(block) = extract_block(lines, idx) else {
            continue;
        };

        let description = description(&block.own_text());
        let child_indent = block.child_indent();
        let ethernet = block
            .body()
            .find(|(_, child)| {
                Some(child.indent) == child_indent
                    && child.trimmed().eq_ignore_ascii_case("ethernet")
            })
            .and_then(|(child_idx, _)| block.child_block(child_idx))
            .map(|section| port_ethernet(&section));
        if description.is_none() && ethernet.is_none() {
            continue;
        }

        let entry = ports.entry(port_id.to_string()).or_default();
        if entry.description.is_none() {
            entry.description = description;
        }
        if entry.ethernet.is_none() {
            entry.ethernet = ethernet;
        }
    }

    ports
}

fn port_ethernet(section: &Block<'_>) -> PortEthernet {
    let mut ethernet = PortEthernet::default();

    for (_, line) in section.body() {
        let Some(parts) = &line.parsed else {
            continue;
        };
        if line.kind.is_trivia() {
            continue;
        }
        let Some(value) = parts.arg_unquoted(0) else {
            continue;
        };
        let slot = match parts.head.as_str() {
            "mode" => &mut ethernet.mode,
            "encap-type" => &mut ethernet.encap_type,
            "speed" => &mut ethernet.speed,
            "autonegotiate" => &mut ethernet.autonegotiate,
            "queue-policy" => &mut ethernet.network_queue_policy,
            "admin-status" => &mut ethernet.lldp_admin_status,
            "mtu" => {
                if ethernet.mtu.is_none() {
                    ethernet.mtu = value.parse().ok();
                }
                continue;
            }
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    ethernet
}

//! Access points and pseudowire bindings inside a service body.
//!
//! These sub-blocks are delimited by lookahead rather than indentation: a
//! section runs from its `create` keyword up to the next `sap`, `spoke-sdp`
//! or `mesh-sdp` token, or up to the block's trailing `exit`, or to the end
//! of the text when neither follows.

use regex::{Captures, Regex};

use crate::extract::{admin_state, decompose_sap_id, description, qos_reference};
use crate::model::{AccessPoint, PointBinding};
use crate::patterns::{ACCESS_SIBLING, LLF, MESH_OPEN, SAP_OPEN, SPOKE_OPEN, TRAILING_EXIT};
use crate::qos::QosDirection;

/// Access points declared in `text`, in source order.
pub fn access_points(text: &str) -> Vec<AccessPoint> {
    delimited_sections(&SAP_OPEN, text)
        .into_iter()
        .map(|(caps, content)| {
            let sap_id = caps[1].to_string();
            let (port_id, vlan_id) = decompose_sap_id(&sap_id);
            AccessPoint {
                sap_id,
                port_id,
                vlan_id,
                description: description(content).unwrap_or_default(),
                admin_state: admin_state(content),
                ingress_qos: qos_reference(content, QosDirection::Ingress),
                egress_qos: qos_reference(content, QosDirection::Egress),
                llf: LLF.is_match(content),
                port_description: None,
                port_ethernet: None,
            }
        })
        .collect()
}

/// `spoke-sdp <sdp>:<vc> create` bindings declared in `text`.
pub fn spoke_bindings(text: &str) -> Vec<PointBinding> {
    bindings(&SPOKE_OPEN, text)
}

/// `mesh-sdp <sdp>:<vc> create` bindings declared in `text`.
pub fn mesh_bindings(text: &str) -> Vec<PointBinding> {
    bindings(&MESH_OPEN, text)
}

fn bindings(open: &Regex, text: &str) -> Vec<PointBinding> {
    delimited_sections(open, text)
        .into_iter()
        .filter_map(|(caps, content)| {
            Some(PointBinding {
                sdp_id: caps[1].parse().ok()?,
                vc_id: caps[2].parse().ok()?,
                description: description(content).unwrap_or_default(),
            })
        })
        .collect()
}

fn delimited_sections<'t>(open: &Regex, text: &'t str) -> Vec<(Captures<'t>, &'t str)> {
    let mut sections = Vec::new();
    let mut pos = 0;

    while let Some(caps) = open.captures_at(text, pos) {
        let Some(header) = caps.get(0) else {
            break;
        };
        let content_start = header.end();
        let content_end = section_end(text, content_start);
        sections.push((caps, &text[content_start..content_end]));
        pos = content_end;
    }

    sections
}

fn section_end(text: &str, from: usize) -> usize {
    let sibling = ACCESS_SIBLING.find_at(text, from).map(|m| m.start());
    let trailing = TRAILING_EXIT.find_at(text, from).map(|m| m.start());
    sibling.into_iter().chain(trailing).min().unwrap_or(text.len())
}

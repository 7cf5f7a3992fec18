use sros_ir::{Line, extract_block};

use crate::extract::{admin_state, description};
use crate::model::{DeliveryType, SdpBinding};
use crate::patterns::{FAR_END, LSP_NAME, SDP_OPEN, capture};

/// Transport tunnels declared under `service` sections.
///
/// Tunnels are keyed by id; when an id is declared again the earlier record
/// keeps its values and only takes fields it was missing.
pub fn sdp_bindings(lines: &[Line]) -> Vec<SdpBinding> {
    let mut sdps: Vec<SdpBinding> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if !line.trimmed().eq_ignore_ascii_case("service") {
            continue;
        }
        let Some(section) = extract_block(lines, idx) else {
            continue;
        };

        let mut next = section.start + 1;
        for (sdp_idx, sdp_line) in section.body() {
            if sdp_idx < next || sdp_line.kind.is_trivia() {
                continue;
            }
            let Some(caps) = SDP_OPEN.captures(&sdp_line.raw) else {
                continue;
            };
            let Ok(sdp_id) = caps[1].parse::<u32>() else {
                continue;
            };
            let Some(block) = section.child_block(sdp_idx) else {
                continue;
            };
            next = block.end + 1;

            let text = block.text();
            let delivery = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
                Some(kind) if kind == "mpls" => DeliveryType::Mpls,
                _ => DeliveryType::Gre,
            };
            let parsed = SdpBinding {
                sdp_id,
                far_end: capture(&FAR_END, &text).unwrap_or_default().to_string(),
                lsp_name: capture(&LSP_NAME, &text).map(str::to_string),
                delivery,
                admin_state: admin_state(&text),
                description: description(&block.own_text()).unwrap_or_default(),
            };

            match sdps.iter_mut().find(|sdp| sdp.sdp_id == sdp_id) {
                Some(existing) => {
                    if existing.far_end.is_empty() {
                        existing.far_end = parsed.far_end;
                    }
                    if existing.description.is_empty() {
                        existing.description = parsed.description;
                    }
                    if existing.lsp_name.is_none() {
                        existing.lsp_name = parsed.lsp_name;
                    }
                }
                None => sdps.push(parsed),
            }
        }
    }

    sdps
}

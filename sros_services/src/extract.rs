use std::collections::HashSet;

use sros_ir::{Line, LineKind};

use crate::model::{AdminState, QosReference, StaticRoute};
use crate::patterns::{
    DESCRIPTION, EGRESS_QOS, INGRESS_QOS, NEXT_HOP, NO_SHUTDOWN, SHUTDOWN, STATIC_ROUTE_ENTRY,
    STATIC_ROUTE_LINE, capture, capture_u32,
};
use crate::qos::QosDirection;

/// First quoted `description "..."` in `text`.
pub fn description(text: &str) -> Option<String> {
    capture(&DESCRIPTION, text).map(str::to_string)
}

/// Administrative state of a block.
///
/// A block is down when it contains a `shutdown` token and no `no shutdown`
/// anywhere; everything else is up.
pub fn admin_state(text: &str) -> AdminState {
    if SHUTDOWN.is_match(text) && !NO_SHUTDOWN.is_match(text) {
        AdminState::Down
    } else {
        AdminState::Up
    }
}

/// QoS policy referenced as `ingress qos <id>` or `egress qos <id>`.
pub fn qos_reference(text: &str, direction: QosDirection) -> Option<QosReference> {
    let pattern = match direction {
        QosDirection::Ingress => &INGRESS_QOS,
        QosDirection::Egress => &EGRESS_QOS,
    };
    capture_u32(pattern, text).map(QosReference::new)
}

/// Split a SAP id into port and VLAN.
///
/// `1/1/1:100` gives `("1/1/1", 100)`; QinQ ids keep only the outer tag and
/// ids without a numeric tag (`1/1/2`, `lag-1:*`) give VLAN 0.
pub fn decompose_sap_id(sap_id: &str) -> (String, u32) {
    match sap_id.split_once(':') {
        Some((port, tags)) => {
            let digits: String = tags.chars().take_while(char::is_ascii_digit).collect();
            (port.to_string(), digits.parse().unwrap_or(0))
        }
        None => (sap_id.to_string(), 0),
    }
}

/// Static routes declared in `lines`, deduplicated in first-seen order.
///
/// Both the single-line form (`static-route <prefix> next-hop <ip>`) and the
/// entry form (`static-route-entry <prefix>` with nested `next-hop` lines)
/// are recognized. An entry stays open until an `exit` at its own
/// indentation or a line indented less than it.
pub fn static_routes<'a>(lines: impl IntoIterator<Item = &'a Line>) -> Vec<StaticRoute> {
    let mut routes = Vec::new();
    let mut seen = HashSet::new();
    let mut entry: Option<(String, usize)> = None;

    for line in lines {
        if line.kind.is_trivia() {
            continue;
        }
        let raw = line.raw.as_str();

        if let Some(caps) = STATIC_ROUTE_LINE.captures(raw) {
            push_route(&mut routes, &mut seen, &caps[1], &caps[2]);
            continue;
        }
        if let Some(prefix) = capture(&STATIC_ROUTE_ENTRY, raw) {
            entry = Some((prefix.to_string(), line.indent));
            continue;
        }

        let Some((prefix, entry_indent)) = &entry else {
            continue;
        };
        if line.indent < *entry_indent
            || (line.kind == LineKind::Close && line.indent == *entry_indent)
        {
            entry = None;
            continue;
        }
        if let Some(next_hop) = capture(&NEXT_HOP, raw) {
            let prefix = prefix.clone();
            push_route(&mut routes, &mut seen, &prefix, next_hop);
        }
    }

    routes
}

fn push_route(
    routes: &mut Vec<StaticRoute>,
    seen: &mut HashSet<StaticRoute>,
    prefix: &str,
    next_hop: &str,
) {
    let route = StaticRoute {
        prefix: prefix.to_string(),
        next_hop: next_hop.to_string(),
    };
    if seen.insert(route.clone()) {
        routes.push(route);
    }
}

#[cfg(test)]
mod tests {
    use sros_dialect_classic::scan_classic;

    use super::*;

    #[test]
    fn admin_state_prefers_no_shutdown() {
        assert_eq!(admin_state("sap 1/1/1 create\n    shutdown\nexit"), AdminState::Down);
        assert_eq!(
            admin_state("shutdown\n    no shutdown"),
            AdminState::Up,
            "any explicit no shutdown keeps the block up"
        );
        assert_eq!(admin_state("description \"x\""), AdminState::Up);
    }

    #[test]
    fn decomposes_sap_ids() {
        assert_eq!(decompose_sap_id("1/1/1:100"), ("1/1/1".to_string(), 100));
        assert_eq!(decompose_sap_id("1/1/1:100.200"), ("1/1/1".to_string(), 100));
        assert_eq!(decompose_sap_id("lag-1:*"), ("lag-1".to_string(), 0));
        assert_eq!(decompose_sap_id("1/1/2"), ("1/1/2".to_string(), 0));
    }

    #[test]
    fn extracts_qos_by_direction() {
        let text = "sap 1/1/1:10 create\n    ingress\n        qos 20\n    exit\n    egress\n        qos 30\n    exit";
        assert_eq!(
            qos_reference(text, QosDirection::Ingress).map(|q| q.policy_id),
            Some(20)
        );
        assert_eq!(
            qos_reference(text, QosDirection::Egress).map(|q| q.policy_id),
            Some(30)
        );
    }

    #[test]
    fn both_static_route_forms_yield_the_same_entry() {
        let one_line = scan_classic("static-route 10.0.0.0/24 next-hop 192.168.1.1\n");
        let entry = scan_classic(
            "static-route-entry 10.0.0.0/24\n    next-hop 192.168.1.1\n        no shutdown\n    exit\nexit\n",
        );
        let expected = vec![StaticRoute {
            prefix: "10.0.0.0/24".to_string(),
            next_hop: "192.168.1.1".to_string(),
        }];
        assert_eq!(static_routes(&one_line.lines), expected);
        assert_eq!(static_routes(&entry.lines), expected);
    }

    #[test]
    fn entry_closes_before_unrelated_next_hop() {
        let scanned = scan_classic(
            "static-route-entry 10.0.0.0/24\n    next-hop 1.1.1.1\n    exit\nexit\nnext-hop 2.2.2.2\n",
        );
        let routes = static_routes(&scanned.lines);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].next_hop, "1.1.1.1");
    }
}

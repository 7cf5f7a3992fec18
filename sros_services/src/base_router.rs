//! Interfaces and routes that no explicit service block claims.

use sros_ir::{Block, Line, extract_block, opens_block};
use tracing::debug;

use crate::extract::static_routes;
use crate::model::{
    AdminState, BASE_ROUTER_DESCRIPTION, BASE_ROUTER_NAME, RoutedInterface, RoutingContext,
    Service, ServiceDetail,
};
use crate::patterns::INTERFACE_OPEN;
use crate::reconcile::merge_interfaces;
use crate::routing::routed_interface;

/// Build the synthetic base-router record.
///
/// `claimed` holds the blocks of every explicit service. An interface line
/// strictly inside one of them belongs to that service; every other
/// `interface "<name>"` line is a base-router interface. Static routes are
/// read from the line runs outside all claimed blocks. Returns `None` when
/// neither interfaces nor routes were found.
pub fn base_router(lines: &[Line], claimed: &[Block<'_>]) -> Option<Service> {
    let routing = RoutingContext {
        interfaces: base_interfaces(lines, claimed),
        static_routes: static_routes(unclaimed_lines(lines, claimed)),
        ..RoutingContext::default()
    };
    if routing.interfaces.is_empty() && routing.static_routes.is_empty() {
        return None;
    }
    debug!(
        interfaces = routing.interfaces.len(),
        static_routes = routing.static_routes.len(),
        "base router"
    );

    Some(Service {
        service_id: 0,
        customer_id: 0,
        service_name: Some(BASE_ROUTER_NAME.to_string()),
        description: BASE_ROUTER_DESCRIPTION.to_string(),
        admin_state: AdminState::Up,
        service_mtu: None,
        detail: ServiceDetail::BaseRouter(routing),
    })
}

fn base_interfaces(lines: &[Line], claimed: &[Block<'_>]) -> Vec<RoutedInterface> {
    let mut interfaces = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        let caps = (!line.kind.is_trivia())
            .then(|| INTERFACE_OPEN.captures(&line.raw))
            .flatten();
        let Some(caps) = caps else {
            idx += 1;
            continue;
        };
        if claimed.iter().any(|block| block.strictly_contains(idx)) {
            idx += 1;
            continue;
        }

        let block = opens_block(lines, idx)
            .then(|| extract_block(lines, idx))
            .flatten();
        let iface = match &block {
            Some(block) => routed_interface(&caps[1], block),
            None => RoutedInterface {
                interface_name: caps[1].to_string(),
                ..RoutedInterface::default()
            },
        };
        merge_interfaces(&mut interfaces, vec![iface]);
        idx = block.map_or(idx + 1, |block| block.end + 1);
    }

    interfaces
}

fn unclaimed_lines<'a>(
    lines: &'a [Line],
    claimed: &'a [Block<'_>],
) -> impl Iterator<Item = &'a Line> + 'a {
    lines.iter().enumerate().filter_map(move |(idx, line)| {
        let inside = claimed
            .iter()
            .any(|block| (block.start..=block.end).contains(&idx));
        (!inside).then_some(line)
    })
}

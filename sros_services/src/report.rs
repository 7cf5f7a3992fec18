use crate::model::{ConfigurationDocument, Service, ServiceDetail};

/// Format a markdown summary of a parsed configuration.
pub fn format_markdown_summary(document: &ConfigurationDocument, label: &str) -> String {
    let mut out = String::new();
    out.push_str("# Service Summary\n\n");
    out.push_str(&format!("- Source: `{label}`\n"));
    out.push_str(&format!("- Hostname: {}\n", document.hostname));
    if !document.system_ip.is_empty() {
        out.push_str(&format!("- System IP: {}\n", document.system_ip));
    }
    out.push('\n');

    out.push_str("## Stats\n\n");
    out.push_str(&format!("- Services: {}\n", document.services.len()));
    out.push_str(&format!("- Routed interfaces: {}\n", document.interface_count()));
    out.push_str(&format!("- SDPs: {}\n\n", document.sdps.len()));

    out.push_str("## Services\n\n");
    if document.services.is_empty() {
        out.push_str("No services found.\n");
    } else {
        for (idx, service) in document.services.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", idx + 1, describe_service(service)));
        }
    }

    if !document.metadata.findings.is_empty() {
        out.push_str("\n## Findings\n\n");
        for finding in &document.metadata.findings {
            out.push_str(&format!(
                "- line {} [{}]: {}\n",
                finding.span.line, finding.code, finding.message
            ));
        }
    }

    out
}

fn describe_service(service: &Service) -> String {
    let name = service
        .service_name
        .as_deref()
        .map(|name| format!(" \"{name}\""))
        .unwrap_or_default();
    let body = match &service.detail {
        ServiceDetail::PointToPointCircuit(circuit) => format!(
            "{} access point(s), {} spoke binding(s)",
            circuit.access_points.len(),
            circuit.spoke_bindings.len()
        ),
        ServiceDetail::MultipointDomain(domain) => format!(
            "{} access point(s), {} spoke / {} mesh binding(s)",
            domain.access_points.len(),
            domain.spoke_bindings.len(),
            domain.mesh_bindings.len()
        ),
        ServiceDetail::RoutingInstance(routing)
        | ServiceDetail::InternetEnhanced(routing)
        | ServiceDetail::BaseRouter(routing) => format!(
            "{} interface(s), {} BGP neighbor(s), {} static route(s)",
            routing.interfaces.len(),
            routing.bgp_neighbors().len(),
            routing.static_routes.len()
        ),
    };
    format!(
        "{} {}{} ({:?}): {body}",
        service.service_type().keyword(),
        service.service_id,
        name,
        service.admin_state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_configuration;

    #[test]
    fn summary_counts_grouped_and_flat_neighbors() {
        let doc = parse_configuration(
            "vprn 5 customer 1 create
    bgp
        group \"ce\"
            neighbor 10.0.0.2
            exit
        exit
        neighbor 10.0.0.6
        exit
    exit
    no shutdown
exit
",
        );
        let summary = format_markdown_summary(&doc, "pe.cfg");

        assert!(summary.contains("- Source: `pe.cfg`"));
        assert!(summary.contains("1. vprn 5 (Up): 0 interface(s), 2 BGP neighbor(s)"));
    }
}

use super::{
    AdminState, DeliveryType, NoQosPolicies, ParseError, ParseOptions, PolicyRate, QosDirection,
    QosPolicyTable, ServiceDetail, ServiceType, UNKNOWN_HOSTNAME, parse_bytes,
    parse_configuration, parse_with_lookup, parse_with_options,
};

const FULL: &str = "# TiMOS-B-20.10.R3 both/x86_64
configure
    echo \"System Configuration\"
    system
        name \"pe1-lab\"
    exit
    port 1/1/1
        description \"to-cpe-a\"
        ethernet
            mode access
            encap-type dot1q
        exit
        no shutdown
    exit
    qos
        sap-ingress 10 create
            queue 1 create
                rate 50000
            exit
        exit
        sap-egress 20 create
            queue 1 create
                rate max
            exit
        exit
    exit
    router Base
        interface \"system\"
            address 10.0.0.1/32
            no shutdown
        exit
        interface \"to-p1\"
            address 192.168.1.1/30
            port 1/1/1
        exit
        static-route-entry 0.0.0.0/0
            next-hop 192.168.1.2
                no shutdown
            exit
        exit
    exit
    service
        customer 1 create
        exit
        sdp 12 mpls create
            far-end 10.0.0.2
            lsp \"to-pe2\"
            no shutdown
        exit
        epipe 1001 customer 1 create
            description \"first half\"
            sap 1/1/1:100 create
                ingress
                    qos 10
                exit
                egress
                    qos 20
                exit
            exit
        exit
        vprn 200 name \"blue\" customer 1 create
            route-distinguisher 65000:200
            interface \"lo0\" create
                address 172.16.0.1/32
            exit
            interface \"to-ce\" create
                sap 1/1/1:300 create
                    ingress
                        qos 10
                    exit
                exit
            exit
            no shutdown
        exit
        epipe 1001 customer 1 create
            description \"second half\"
            spoke-sdp 12:1001 create
                no shutdown
            exit
            no shutdown
        exit
        vpls 300 customer 1 create
            shutdown
        exit
    exit
exit
";

#[test]
fn extracts_hostname_and_system_ip() {
    let doc = parse_configuration(FULL);
    assert_eq!(doc.hostname, "pe1-lab");
    assert_eq!(doc.system_ip, "10.0.0.1");
}

#[test]
fn defaults_when_system_is_missing() {
    let doc = parse_configuration("");
    assert_eq!(doc.hostname, UNKNOWN_HOSTNAME);
    assert_eq!(doc.system_ip, "");
    assert!(doc.services.is_empty());
    assert!(doc.sdps.is_empty());
}

#[test]
fn reconciles_split_service_occurrences() {
    let doc = parse_configuration(FULL);
    let epipes = doc
        .services
        .iter()
        .filter(|s| s.service_type() == ServiceType::PointToPointCircuit)
        .count();
    assert_eq!(epipes, 1);

    let epipe = doc
        .service(ServiceType::PointToPointCircuit, 1001)
        .expect("epipe 1001");
    assert_eq!(epipe.description, "first half");
    let ServiceDetail::PointToPointCircuit(circuit) = &epipe.detail else {
        panic!("expected a circuit");
    };
    assert_eq!(circuit.access_points.len(), 1);
    assert_eq!(circuit.spoke_bindings.len(), 1);
}

#[test]
fn attaches_port_details_and_qos_rates() {
    let doc = parse_configuration(FULL);
    let epipe = doc
        .service(ServiceType::PointToPointCircuit, 1001)
        .expect("epipe 1001");
    let sap = &epipe.access_points()[0];
    assert_eq!(sap.description, "");
    assert_eq!(sap.port_description.as_deref(), Some("to-cpe-a"));
    assert_eq!(
        sap.port_ethernet.as_ref().and_then(|e| e.encap_type.as_deref()),
        Some("dot1q")
    );
    assert_eq!(sap.ingress_qos.as_ref().map(|q| q.rate_label()), Some("50M".to_string()));
    assert_eq!(sap.egress_qos.as_ref().map(|q| q.rate_max), Some(true));

    let vprn = doc
        .service(ServiceType::RoutingInstance, 200)
        .expect("vprn 200");
    let ce = vprn
        .routing()
        .and_then(|r| r.interface("to-ce"))
        .expect("to-ce");
    assert_eq!(ce.port_description.as_deref(), Some("to-cpe-a"));
    assert_eq!(ce.ingress_qos.as_ref().and_then(|q| q.rate_kbps), Some(50_000));
}

#[test]
fn base_router_holds_only_unclaimed_interfaces() {
    let doc = parse_configuration(FULL);
    let base = doc.base_router().expect("base router");
    let routing = base.routing().expect("routing body");
    assert!(routing.interface("system").is_some());
    assert!(routing.interface("to-p1").is_some());
    assert!(routing.interface("lo0").is_none());
    assert_eq!(routing.static_routes.len(), 1);

    let vprn = doc
        .service(ServiceType::RoutingInstance, 200)
        .expect("vprn 200");
    assert_eq!(vprn.service_name.as_deref(), Some("blue"));
    assert!(vprn.routing().and_then(|r| r.interface("lo0")).is_some());
}

#[test]
fn reads_sdps_from_service_section() {
    let doc = parse_configuration(FULL);
    assert_eq!(doc.sdps.len(), 1);
    assert_eq!(doc.sdps[0].far_end, "10.0.0.2");
    assert_eq!(doc.sdps[0].delivery, DeliveryType::Mpls);
}

#[test]
fn options_switch_off_optional_passes() {
    let options = ParseOptions::default()
        .with_base_router(false)
        .with_port_details(false)
        .with_qos_rates(false)
        .with_admin_down_dropped(true);
    let doc = parse_with_options(FULL, &options);

    assert!(doc.base_router().is_none());
    assert!(doc.service(ServiceType::MultipointDomain, 300).is_none());
    let sap = &doc
        .service(ServiceType::PointToPointCircuit, 1001)
        .expect("epipe 1001")
        .access_points()[0];
    assert!(sap.port_description.is_none());
    assert_eq!(sap.ingress_qos.as_ref().map(|q| q.rate_label()), Some("qos-10".to_string()));
}

#[test]
fn admin_down_services_are_kept_by_default() {
    let doc = parse_configuration(FULL);
    let vpls = doc
        .service(ServiceType::MultipointDomain, 300)
        .expect("vpls 300");
    assert_eq!(vpls.admin_state, AdminState::Down);
}

const SKELETON_THEN_FULL: &str = "configure
    service
        vpls 100 customer 1 create
            stp
                shutdown
            exit
        exit
        vpls 100 customer 2 create
            description \"access domain\"
            sap 1/1/1:100 create
            exit
            no shutdown
        exit
    exit
exit
";

#[test]
fn full_definition_overrides_skeleton_admin_state() {
    let doc = parse_configuration(SKELETON_THEN_FULL);
    let vpls = doc
        .service(ServiceType::MultipointDomain, 100)
        .expect("vpls 100");
    assert_eq!(vpls.admin_state, AdminState::Up);
    assert_eq!(vpls.customer_id, 2);
    assert_eq!(vpls.access_points().len(), 1);

    let options = ParseOptions::default().with_admin_down_dropped(true);
    let doc = parse_with_options(SKELETON_THEN_FULL, &options);
    assert!(doc.service(ServiceType::MultipointDomain, 100).is_some());
}

#[test]
fn external_lookup_supplies_rates() {
    let mut table = QosPolicyTable::default();
    table.insert(
        QosDirection::Ingress,
        10,
        PolicyRate {
            rate_kbps: Some(2_000_000),
            rate_max: false,
        },
    );
    let doc = parse_with_lookup(FULL, &ParseOptions::default(), &table);
    let sap = &doc
        .service(ServiceType::PointToPointCircuit, 1001)
        .expect("epipe 1001")
        .access_points()[0];
    assert_eq!(sap.ingress_qos.as_ref().map(|q| q.rate_label()), Some("2G".to_string()));

    let doc = parse_with_lookup(FULL, &ParseOptions::default(), &NoQosPolicies);
    let sap = &doc
        .service(ServiceType::PointToPointCircuit, 1001)
        .expect("epipe 1001")
        .access_points()[0];
    assert_eq!(sap.ingress_qos.as_ref().and_then(|q| q.rate_kbps), None);
}

#[test]
fn rejects_non_text_bytes() {
    let err = parse_bytes(&[b'a', 0xff, 0xfe], &ParseOptions::default()).expect_err("not text");
    assert_eq!(err, ParseError::NotText { valid_up_to: 1 });

    let doc = parse_bytes(b"\xEF\xBB\xBFsystem\n    name \"bom\"\nexit\n", &ParseOptions::default())
        .expect("utf-8 with bom");
    assert_eq!(doc.hostname, "bom");
}

#[test]
fn records_implicit_close_findings() {
    let doc = parse_configuration("epipe 7 customer 1 create\n    description \"open\"\n");
    assert!(
        doc.metadata
            .findings
            .iter()
            .any(|finding| finding.code == "implicit-close")
    );
    assert_eq!(
        doc.service(ServiceType::PointToPointCircuit, 7)
            .map(|s| s.description.as_str()),
        Some("open")
    );
}

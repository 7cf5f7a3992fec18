use proptest::prelude::*;
use sros_services::parse_configuration;

#[derive(Debug, Clone)]
struct GeneratedService {
    kind: &'static str,
    id: u32,
    description: Option<&'static str>,
    vlan: u32,
    route_octet: u8,
}

fn service_strategy() -> impl Strategy<Value = GeneratedService> {
    (
        prop::sample::select(vec!["epipe", "vpls", "vprn"]),
        1u32..5,
        prop::option::of(prop::sample::select(vec!["alpha", "beta", "gamma"])),
        1u32..5,
        0u8..4,
    )
        .prop_map(|(kind, id, description, vlan, route_octet)| GeneratedService {
            kind,
            id,
            description,
            vlan,
            route_octet,
        })
}

fn render(generated: &[GeneratedService]) -> String {
    let mut out = String::new();
    for entry in generated {
        out.push_str(&format!("{} {} customer 1 create\n", entry.kind, entry.id));
        if let Some(description) = entry.description {
            out.push_str(&format!("    description \"{description}\"\n"));
        }
        if entry.kind == "vprn" {
            out.push_str(&format!(
                "    static-route 10.{}.0.0/24 next-hop 192.0.2.1\n",
                entry.route_octet
            ));
            out.push_str(&format!(
                "    bgp\n        group \"ce\"\n            peer-as 65001\n            neighbor 10.{0}.0.2\n            exit\n        exit\n        neighbor 10.{0}.9.9\n        exit\n    exit\n",
                entry.route_octet
            ));
        } else {
            out.push_str(&format!("    sap 1/1/1:{} create\n    exit\n", entry.vlan));
        }
        out.push_str("exit\n");
    }
    out
}

fn noise_strategy() -> impl Strategy<Value = String> {
    let token = prop::sample::select(vec![
        "epipe 1 customer 1 create",
        "vprn 2 customer 1 create",
        "interface \"x\" create",
        "interface \"y\"",
        "sap 1/1/1:5 create",
        "static-route-entry 10.0.0.0/8",
        "next-hop 1.1.1.1",
        "bgp",
        "neighbor 1.2.3.4",
        "exit",
        "shutdown",
        "# comment",
        "",
    ]);
    prop::collection::vec((0usize..4, token), 0..40).prop_map(|lines| {
        lines
            .into_iter()
            .map(|(depth, token)| format!("{}{token}", "    ".repeat(depth)))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

proptest! {
    #[test]
    fn concatenated_input_reconciles_to_the_same_services(
        generated in prop::collection::vec(service_strategy(), 1..8)
    ) {
        let text = render(&generated);
        let once = parse_configuration(&text);
        let twice = parse_configuration(&format!("{text}{text}"));

        let keys_once = once.services.iter().map(|s| s.key()).collect::<Vec<_>>();
        let keys_twice = twice.services.iter().map(|s| s.key()).collect::<Vec<_>>();
        prop_assert_eq!(keys_once, keys_twice);

        for (a, b) in once.services.iter().zip(&twice.services) {
            prop_assert_eq!(&a.description, &b.description);
            prop_assert_eq!(a.admin_state, b.admin_state);
            prop_assert_eq!(b.access_points().len(), 2 * a.access_points().len());
            prop_assert_eq!(
                a.routing().map(|r| &r.static_routes),
                b.routing().map(|r| &r.static_routes)
            );
            prop_assert_eq!(
                a.routing().map(|r| r.bgp_neighbors()),
                b.routing().map(|r| r.bgp_neighbors())
            );
            prop_assert_eq!(
                a.routing().map(|r| &r.bgp.groups),
                b.routing().map(|r| &r.bgp.groups)
            );
        }
    }

    #[test]
    fn parsing_is_deterministic(input in noise_strategy()) {
        prop_assert_eq!(parse_configuration(&input), parse_configuration(&input));
    }
}

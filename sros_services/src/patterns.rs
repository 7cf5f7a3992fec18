use std::sync::LazyLock;

use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid built-in pattern {pattern:?}: {err}"))
}

macro_rules! patterns {
    ($($name:ident = $pattern:expr;)+) => {
        $(pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| compile($pattern));)+
    };
}

patterns! {
    // Service headers and scalars.
    SERVICE_HEADER = r#"(?i)^(epipe|vpls|vprn|ies)\s+(\d+)(?:\s+name\s+"([^"]+)")?\s+customer\s+(\d+).*\s+create\b"#;
    DESCRIPTION = r#"(?i)description\s+"([^"]+)""#;
    SERVICE_NAME = r#"(?i)service-name\s+"([^"]+)""#;
    SERVICE_MTU = r"(?i)service-mtu\s+(\d+)";
    FDB_TABLE_SIZE = r"(?i)fdb-table-size\s+(\d+)";
    SHUTDOWN = r"(?i)\bshutdown\b";
    NO_SHUTDOWN = r"(?i)\bno\s+shutdown\b";
    AUTONOMOUS_SYSTEM = r"(?i)autonomous-system\s+(\d+)";
    ROUTE_DISTINGUISHER = r"(?i)route-distinguisher\s+([\d:.]+)";
    VRF_TARGET = r"(?i)vrf-target\s+(?:(?:export|import)\s+)?(?:target:)?([\d:.]+)";
    VRF_TARGET_ANY = r"(?i)vrf-target\s+(\S+)";
    ECMP = r"(?im)^\s*ecmp\s+(\d+)";

    // Access points and pseudowire bindings.
    SAP_OPEN = r"(?i)\bsap[ \t]+([\w/-]+(?::(?:\d+|\*)(?:\.(?:\d+|\*))?)?)(?:[ \t][^\n]*?)?[ \t]create\b";
    SPOKE_OPEN = r"(?i)\bspoke-sdp[ \t]+(\d+):(\d+)(?:[ \t][^\n]*?)?[ \t]create\b";
    MESH_OPEN = r"(?i)\bmesh-sdp[ \t]+(\d+):(\d+)(?:[ \t][^\n]*?)?[ \t]create\b";
    ACCESS_SIBLING = r"(?i)\s+(?:sap|spoke-sdp|mesh-sdp)\b";
    TRAILING_EXIT = r"(?i)\s+exit\s*\z";
    INGRESS_QOS = r"(?i)ingress\s+qos\s+(\d+)";
    EGRESS_QOS = r"(?i)egress\s+qos\s+(\d+)";
    LLF = r"(?is)ethernet\s.*?\bllf\b";

    // Routed interfaces.
    INTERFACE_OPEN = r#"(?i)^\s*interface\s+"([^"]+)"(\s+create)?"#;
    IP_ADDRESS = r"(?im)^\s*address\s+(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}(?:/\d{1,2})?)";
    PORT = r"(?im)^\s*port\s+([\w/-]+(?::[\w.*]+)?)";
    MTU = r"(?im)^\s*(?:ip-)?mtu\s+(\d+)";
    BOUND_DOMAIN = r#"(?i)vpls\s+"([^"]+)""#;
    INTERFACE_SPOKE = r"(?i)spoke-sdp\s+(\d+:\d+)";
    VRRP = r"(?i)vrrp\s+(\d+)";
    VRRP_BACKUP = r"(?i)backup\s+([\d.]+)";
    VRRP_PRIORITY = r"(?i)priority\s+(\d+)";

    // BGP and OSPF.
    ROUTER_ID = r"(?i)router-id\s+([\d.]+)";
    BGP_GROUP = r#"(?i)^group\s+"([^"]+)""#;
    BGP_NEIGHBOR = r"(?i)^neighbor\s+([0-9A-Fa-f.:]+)";
    PEER_AS = r"(?i)^peer-as\s+(\d+)";
    OSPF_OPEN = r"(?i)^ospf(?:\s+\d+)?$";
    OSPF_AREA = r"(?i)^area\s+([\d.]+)";
    OSPF_INTERFACE = r#"(?i)^interface\s+"([^"]+)""#;
    OSPF_INTERFACE_TYPE = r"(?i)interface-type\s+([\w-]+)";

    // Static routes.
    STATIC_ROUTE_LINE = r"(?i)static-route\s+([\d./]+)\s+next-hop\s+([\d.]+)";
    STATIC_ROUTE_ENTRY = r"(?i)static-route-entry\s+([\d./]+)";
    NEXT_HOP = r"(?i)next-hop\s+([\d.]+)";

    // Top-level sections.
    SYSTEM_NAME = r#"(?im)^\s*name\s+"?([^"\r\n]+?)"?\s*$"#;
    SYSTEM_ADDRESS = r"(?i)address\s+(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})";
    SDP_OPEN = r"(?i)^\s*sdp\s+(\d+)(?:\s+(mpls|gre))?(?:\s[^\n]*?)?\s+create\b";
    FAR_END = r"(?i)far-end\s+([\d.]+)";
    LSP_NAME = r#"(?i)lsp\s+"([^"]+)""#;
    PORT_OPEN = r"(?i)^port\s+([\w/-]+)$";
    QOS_POLICY_OPEN = r#"(?i)^\s*sap-(ingress|egress)\s+(\d+)(?:\s+name\s+"[^"]*")?\s+create\b"#;
    RATE = r"(?i)^rate\s+(.*)$";
    PIR = r"(?i)pir\s+(\d+)";
    LEADING_NUMBER = r"^(\d+)";
}

/// First capture group of `re` in `text`.
pub(crate) fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First capture group of `re` in `text`, parsed as a number.
pub(crate) fn capture_u32(re: &Regex, text: &str) -> Option<u32> {
    capture(re, text).and_then(|value| value.parse().ok())
}

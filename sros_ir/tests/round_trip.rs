use sros_ir::{DialectHint, scan_generic};

#[test]
fn round_trip_classic_snippet() {
    let input = "# TiMOS-B-20.10.R1\nconfigure\n    system\n        name \"pe1\"\n    exit\n\nexit all\n";

    let scanned = scan_generic(input);
    assert_eq!(scanned.render(), input);
    assert_eq!(scanned.metadata.line_count, 7);
}

#[test]
fn round_trip_without_trailing_newline() {
    let input = "configure\n    port 1/1/1\n    exit";

    let scanned = scan_generic(input);
    assert_eq!(scanned.render(), input);
    assert_eq!(scanned.metadata.line_count, 3);
}

#[test]
fn round_trip_mixed_line_endings() {
    let input = "configure\r\n    service\n        customer 1 create\r\n        exit";

    let scanned = scan_generic(input);
    assert_eq!(scanned.render(), input);
    assert_eq!(scanned.lines[0].line_ending, "\r\n");
    assert_eq!(scanned.lines[0].raw, "configure");
}

#[test]
fn records_finding_for_mixed_leading_whitespace() {
    let scanned = scan_generic("port 1/1/1\n \t description \"mixed\"\n");
    assert!(
        scanned
            .metadata
            .findings
            .iter()
            .any(|f| f.code == "mixed-leading-whitespace")
    );
}

#[test]
fn metadata_sets_generic_dialect_hint() {
    let scanned = scan_generic("configure\n");
    assert_eq!(scanned.metadata.dialect_hint, DialectHint::Generic);
}

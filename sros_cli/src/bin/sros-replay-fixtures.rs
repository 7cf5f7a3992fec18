use std::fs;
use std::path::Path;

use serde::Deserialize;
use sros_services::{ConfigurationDocument, parse_configuration};

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    config: String,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    hostname: String,
    system_ip: String,
    service_keys: Vec<String>,
    access_points: usize,
    interfaces: usize,
    sdps: usize,
    finding_codes: Vec<String>,
}

fn service_keys(document: &ConfigurationDocument) -> Vec<String> {
    document
        .services
        .iter()
        .map(|service| format!("{}:{}", service.service_type().keyword(), service.service_id))
        .collect()
}

fn check<T>(fixture: &str, field: &str, expected: &T, actual: &T) -> Result<(), String>
where
    T: PartialEq + std::fmt::Debug,
{
    if expected == actual {
        Ok(())
    } else {
        Err(format!(
            "fixture {fixture}: {field} mismatch: expected {expected:?}, got {actual:?}"
        ))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let fixtures_dir = repo_root.join("fixtures");

    let mut entries = fs::read_dir(&fixtures_dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.path());

    let mut checked = 0usize;
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let raw = fs::read_to_string(&path)?;
        let fixture: Fixture = serde_json::from_str(&raw)?;
        let text = fs::read_to_string(fixtures_dir.join(&fixture.config))?;
        let document = parse_configuration(&text);
        let expected = &fixture.expected;
        let name = fixture.name.as_str();

        check(name, "hostname", &expected.hostname, &document.hostname)?;
        check(name, "system_ip", &expected.system_ip, &document.system_ip)?;
        check(
            name,
            "service_keys",
            &expected.service_keys,
            &service_keys(&document),
        )?;
        let access_points = document
            .services
            .iter()
            .map(|service| service.access_points().len())
            .sum::<usize>();
        check(name, "access_points", &expected.access_points, &access_points)?;
        check(
            name,
            "interfaces",
            &expected.interfaces,
            &document.interface_count(),
        )?;
        check(name, "sdps", &expected.sdps, &document.sdps.len())?;
        let finding_codes = document
            .metadata
            .findings
            .iter()
            .map(|f| f.code.clone())
            .collect::<Vec<_>>();
        check(name, "finding_codes", &expected.finding_codes, &finding_codes)?;

        checked += 1;
    }

    println!("replayed {checked} fixture(s)");
    Ok(())
}

//! Integration tests for the CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use insta::assert_debug_snapshot;
use tempfile::TempDir;

use onco_cli::commands::{
    MapOptions, load_config, resolve_rows_path, run_lookup, run_map, run_normalize,
};
use onco_mapping::MappingConfig;

const EXTRACT: &str = "\
accession_identifier,tumor_identifier,diagnosis_date,icd10_code,icd10_version,body_side_code,diagnosis_certainty_code
\"\tA/2025/1234\",1,2024-07-01,C00.0,10 2022 GM,L,2
B/24/7,2,2024-02-30,C34.1,10 2022 GM,Q,1
C25/5,3,2023-01-01,C61,10 2022 GM,T,2
C/2025/5.1,4,2023-01-01,C61,10 2022 GM,T,2
";

const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ADT_GEKID Schema_Version="2.2.3">
  <Menge_Patient>
    <Patient>
      <Menge_Meldung>
        <Meldung Meldung_ID="A25/1234"/>
        <Meldung Meldung_ID="B/2024/000007"/>
      </Menge_Meldung>
    </Patient>
    <Patient/>
  </Menge_Patient>
</ADT_GEKID>
"#;

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn options(dir: &TempDir) -> MapOptions {
    MapOptions {
        rows: write_fixture(dir, "extract.csv", EXTRACT),
        input: write_fixture(dir, "report.xml", REPORT),
        ..MapOptions::default()
    }
}

#[test]
fn normalize_reports_canonical_or_invalid() {
    let ids = vec!["A/2025/1234".to_string(), "garbage".to_string()];
    assert_debug_snapshot!(run_normalize(&ids), @r#"
    [
        NormalizedId {
            raw: "A/2025/1234",
            canonical: Some(
                "A/2025/001234",
            ),
        },
        NormalizedId {
            raw: "garbage",
            canonical: None,
        },
    ]
    "#);
}

#[test]
fn lookup_finds_unique_rows_only() {
    let dir = TempDir::new().unwrap();
    let rows = write_fixture(&dir, "extract.csv", EXTRACT);

    let found = run_lookup(&rows, "A/25/1234").unwrap();
    let record = found.record.unwrap();
    assert_eq!(record.identifier.as_str(), "A/2025/001234");
    assert_eq!(record.tumor_identifier, "1");
    assert_eq!(found.stats.rows, 4);
    assert_eq!(found.stats.kept, 2);
    assert_eq!(found.stats.ambiguous_rows, 2);

    let ambiguous = run_lookup(&rows, "C/2025/000005").unwrap();
    assert!(ambiguous.record.is_none());
}

#[test]
fn lookup_with_missing_extract_fails() {
    let dir = TempDir::new().unwrap();
    let err = run_lookup(&dir.path().join("absent.csv"), "A/2025/1").unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}

#[test]
fn map_enriches_and_returns_payload() {
    let dir = TempDir::new().unwrap();
    let outcome = run_map(&options(&dir)).unwrap();
    let result = &outcome.result;
    assert_eq!(result.key.len(), 64);
    assert_eq!(result.enrichment.hits, 2);
    assert!(!result.has_warning());

    let xml = String::from_utf8(outcome.payload).unwrap();
    assert!(xml.contains("<Diagnosedatum>01.07.2024</Diagnosedatum>"));
    // 2024-02-30 is not a calendar date, the unknown side code becomes U.
    assert!(xml.contains("<Primaertumor_ICD_Code>C34.1</Primaertumor_ICD_Code>"));
    assert!(xml.contains("<Seitenlokalisation>U</Seitenlokalisation>"));
    assert_eq!(xml.matches("<Diagnosedatum>").count(), 1);
}

#[test]
fn map_honors_ignore_unmappable() {
    let dir = TempDir::new().unwrap();
    let outcome = run_map(&MapOptions {
        ignore_unmappable: true,
        ..options(&dir)
    })
    .unwrap();
    assert_eq!(outcome.result.patients_in, 2);
    assert_eq!(outcome.result.patients_out, 1);
    assert!(outcome.result.has_warning());
}

#[test]
fn map_with_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = write_fixture(
        &dir,
        "config.toml",
        "ignore_unmappable = true\nrefresh_interval_secs = 3600\n[retention]\nmax_entries = 1\n",
    );
    let config = load_config(Some(&config_path)).unwrap();
    let outcome = run_map(&MapOptions {
        config,
        ..options(&dir)
    })
    .unwrap();
    assert!(outcome.result.has_warning());
}

#[test]
fn map_rejects_non_report_input() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "other.xml", "<Other/>");
    let err = run_map(&MapOptions {
        input,
        ..options(&dir)
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("unexpected root element"));
}

#[test]
fn defaults_without_config_file() {
    assert_eq!(load_config(None).unwrap(), MappingConfig::default());
    let explicit = Path::new("rows.csv");
    assert_eq!(resolve_rows_path(Some(explicit)).unwrap(), explicit);
}

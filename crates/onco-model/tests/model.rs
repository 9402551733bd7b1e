//! Tests for onco-model types.

use onco_model::{AccessionNumber, BodySide, CanonicalIdentifier, DiagnosisRecord, normalize};
use proptest::prelude::*;

#[test]
fn spellings_normalize_to_same_canonical_value() {
    let cases = [
        "A25/001234",
        "A25/1234",
        "A25/1234.100",
        "A/25/001234",
        "A/25/1234",
        "A/25/1234.100",
        "A/2025/001234",
        "A/2025/1234",
        "A/2025/1234.100",
        " A25/1234.100",
        "\tA25/1234.100",
    ];
    let expected = normalize("A/2025/001234");
    for raw in cases {
        assert_eq!(normalize(raw), expected, "spelling {raw:?}");
    }
}

#[test]
fn invalid_equals_nothing() {
    let invalid = normalize("not an accession number");
    assert!(!invalid.is_valid());
    assert_ne!(invalid, normalize("not an accession number"));
    assert_ne!(invalid, normalize("A/2025/001234"));
    assert!(invalid.canonical().is_none());
}

#[test]
fn strict_parse_reports_raw_value() {
    let err = "X/1/2".parse::<CanonicalIdentifier>().unwrap_err();
    assert!(err.to_string().contains("X/1/2"));
    let id: CanonicalIdentifier = "B24/77".parse().unwrap();
    assert_eq!(id.as_str(), "B/2024/000077");
}

#[test]
fn display_marks_invalid_values() {
    assert_eq!(normalize("A/25/1").to_string(), "A/2025/000001");
    assert_eq!(normalize("??").to_string(), "invalid(??)");
}

#[test]
fn empty_diagnosis_detection() {
    let mut diagnosis = DiagnosisRecord::new();
    assert!(diagnosis.is_empty());
    diagnosis.icd10_code = Some("   ".to_string());
    assert!(diagnosis.is_empty());
    diagnosis.body_side = Some(BodySide::Unknown);
    assert!(!diagnosis.is_empty());
}

fn spelling(letter: char, year: u8, number: u32, suffix: Option<u16>, form: u8) -> String {
    let suffix = suffix.map(|s| format!(".{s}")).unwrap_or_default();
    match form % 3 {
        0 => format!("{letter}/20{year:02}/{number}{suffix}"),
        1 => format!("{letter}/{year:02}/{number}{suffix}"),
        _ => format!("{letter}{year:02}/{number}{suffix}"),
    }
}

proptest! {
    #[test]
    fn every_spelling_matches_four_digit_form(
        letter in proptest::char::range('A', 'Z'),
        year in 0u8..100,
        number in 0u32..1_000_000,
        suffix in proptest::option::of(0u16..1000),
        form in 0u8..3,
    ) {
        let raw = spelling(letter, year, number, suffix, form);
        let reference = format!("{letter}/20{year:02}/{number:06}");
        let normalized = normalize(&raw);
        prop_assert!(normalized.is_valid());
        prop_assert_eq!(
            normalized.canonical().map(CanonicalIdentifier::as_str),
            Some(reference.as_str())
        );
    }

    #[test]
    fn normalize_is_idempotent(raw in "[A-Z]{1}/?[0-9]{2,4}/[0-9]{1,8}(\\.[0-9]{1,3})?") {
        if let AccessionNumber::Valid(first) = normalize(&raw) {
            let second = normalize(first.as_str());
            prop_assert_eq!(second.canonical(), Some(&first));
        }
    }
}

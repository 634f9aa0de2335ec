//! Generator Tests
//!
//! Golden-style assertions on the text of generated units.

use std::path::Path;

use valgen::codegen::template::GENERATED_MARKER;
use valgen::{
    generate, load_records, parse_schemas, Checksum, DriftReport, MessageCatalog, ParseOptions, RuleKind,
    ValgenConfig, ValgenError,
};

fn fixtures_path() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").leak()
}

fn accounts() -> Vec<valgen::RecordDescriptor> {
    load_records(&fixtures_path().join("accounts.json")).unwrap()
}

// =============================================================================
// Deduplication
// =============================================================================

#[test]
fn test_each_validator_emitted_once() {
    let unit = generate(&accounts(), &ValgenConfig::default()).unwrap();

    // u32 and u64 fields share one unsigned validator; strings count characters
    assert_eq!(
        unit.validators,
        vec![
            "vg_required_u64",
            "vg_min_u64",
            "vg_required_string",
            "vg_max_u64",
            "vg_different",
            "vg_between_f64",
        ]
    );
    for name in &unit.validators {
        assert_eq!(
            unit.source.matches(&format!("fn {}(", name)).count(),
            1,
            "{} emitted more than once",
            name
        );
    }
}

#[test]
fn test_schema_per_record() {
    let unit = generate(&accounts(), &ValgenConfig::default()).unwrap();
    let account = unit.source.find("pub struct AccountSchema {").unwrap();
    let transfer = unit.source.find("pub struct TransferSchema {").unwrap();
    assert!(account < transfer);
    assert!(unit.source.contains("pub fn new(record: &Transfer) -> Self {"));
    assert!(unit.source.contains("value: record.r#type.to_string(),"));
}

// =============================================================================
// Determinism and provenance
// =============================================================================

#[test]
fn test_output_is_byte_identical_across_runs() {
    let records = accounts();
    let first = generate(&records, &ValgenConfig::default()).unwrap();
    let second = generate(&records, &ValgenConfig::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_header_records_input_checksum() {
    let records = accounts();
    let unit = generate(&records, &ValgenConfig::default()).unwrap();
    assert!(unit.source.starts_with(GENERATED_MARKER));
    assert_eq!(Checksum::from_header(&unit.source), Some(Checksum::of_records(&records).unwrap()));
}

#[test]
fn test_drift_after_annotation_change() {
    let records = accounts();
    let before = generate(&records, &ValgenConfig::default()).unwrap();

    let mut changed = records.clone();
    changed[1].fields[2].tag = "max=280".to_string();
    let after = generate(&changed, &ValgenConfig::default()).unwrap();

    assert!(DriftReport::compare(&before.source, &before.source).is_clean());
    let report = DriftReport::compare(&before.source, &after.source);
    assert!(!report.is_clean());
    assert!(report.input_changed());
    assert!(report.diff.contains("cond: 280,"));
}

// =============================================================================
// Locales
// =============================================================================

#[test]
fn test_locale_selects_message_table() {
    let mut config = ValgenConfig::default();
    config.generator.locale = "fr".to_string();
    let unit = generate(&accounts(), &config).unwrap();
    assert!(unit.source.contains("\"required\" => \"Le champ :field est obligatoire.\","));
    assert!(!unit.source.contains("The :field field is required."));
}

#[test]
fn test_catalog_overlay_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("messages.json");
    std::fs::write(&path, r#"{"en": {"required": "Please provide :field."}}"#).unwrap();

    let mut config = ValgenConfig::default();
    config.catalog.paths.push(path);
    let unit = generate(&accounts(), &config).unwrap();
    assert!(unit.source.contains("\"required\" => \"Please provide :field.\","));

    let catalog = MessageCatalog::with_files(&config.catalog.paths).unwrap();
    assert_eq!(catalog.render("en", "required", "Owner", "", "", ""), "Please provide Owner.");
}

// =============================================================================
// Failure propagation
// =============================================================================

#[test]
fn test_malformed_token_aborts_generation() {
    let mut records = accounts();
    records[1].fields[0].tag = "required;min=one".to_string();

    let err = generate(&records, &ValgenConfig::default()).unwrap_err();
    match err {
        ValgenError::InvalidRuleFormat { record, field, token, .. } => {
            assert_eq!(record, "Transfer");
            assert_eq!(field, "from");
            assert_eq!(token, "min=one");
        }
        other => panic!("Expected InvalidRuleFormat, got {:?}", other),
    }
}

#[test]
fn test_duplicate_record_aborts_generation() {
    let mut records = accounts();
    records.push(records[0].clone());

    match generate(&records, &ValgenConfig::default()) {
        Err(ValgenError::InvalidDescriptors(reason)) => assert!(reason.contains("duplicate record `Account`")),
        other => panic!("Expected InvalidDescriptors, got {:?}", other.map(|unit| unit.validators)),
    }
}

#[test]
fn test_non_identifier_field_aborts_generation() {
    let mut records = accounts();
    records[1].fields[0].name = "from-account".to_string();

    let err = generate(&records, &ValgenConfig::default()).unwrap_err();
    assert!(matches!(err, ValgenError::InvalidDescriptors(_)), "{:?}", err);
}

#[test]
fn test_lenient_operands_keep_generating() {
    let mut records = accounts();
    records[1].fields[0].tag = "required;min=one".to_string();

    let mut config = ValgenConfig::default();
    config.parser.lenient_numeric_operands = true;
    let unit = generate(&records, &config).unwrap();
    assert!(unit.source.contains("cond: 0,"));
}

#[test]
fn test_parsed_schema_shape() {
    let schemas = parse_schemas(&accounts(), &ParseOptions::default()).unwrap();
    assert_eq!(schemas.len(), 2);

    let kinds: Vec<RuleKind> = schemas[0].rules.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RuleKind::Presence,
            RuleKind::ValueConstraint,
            RuleKind::Presence,
            RuleKind::ValueConstraint,
            RuleKind::Conditional,
            RuleKind::Range,
        ]
    );
    let names: Vec<&str> = schemas[0].validators.iter().map(String::as_str).collect();
    assert_eq!(names, vec!["between", "different", "max", "min", "required"]);
}

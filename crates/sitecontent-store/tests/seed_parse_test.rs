// Integration tests for seed parsing

use std::path::PathBuf;

use sitecontent_core::model::{FieldValue, SectionId};
use sitecontent_core::ExErrorKind;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_parse_site_seed() {
    // Given: A seed covering every collection
    let path = fixtures_dir().join("seed_site.yaml");

    // When: We parse it
    let result = sitecontent_store::seed::parse_seed_file(&path);

    // Then: Parsing succeeds with sections in identifier order
    assert!(result.is_ok(), "Should parse site seed: {:?}", result.err());
    let seed = result.unwrap();
    assert_eq!(seed.schema_version, 0);
    let sections: Vec<SectionId> = seed.sections.iter().map(|s| s.section).collect();
    assert_eq!(
        sections,
        vec![
            SectionId::Hero,
            SectionId::Stats,
            SectionId::Mission,
            SectionId::Contact
        ]
    );
    assert_eq!(
        seed.sections[1].fields.get("women_skilled"),
        Some(&FieldValue::Integer(2500))
    );
}

#[test]
fn test_reject_alias_conflict() {
    // Given: A seed writing the hero collection through hero and cta
    let path = fixtures_dir().join("seed_alias_conflict.yaml");

    // When: We parse it
    let err = sitecontent_store::seed::parse_seed_file(&path).unwrap_err();

    // Then: The shared collection is reported
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert!(err.message().contains("website_hero"), "{}", err);
}

#[test]
fn test_reject_unknown_section() {
    let path = fixtures_dir().join("seed_unknown_section.yaml");

    let err = sitecontent_store::seed::parse_seed_file(&path).unwrap_err();

    assert!(err.message().contains("gallery"), "{}", err);
}

#[test]
fn test_reject_schema_invalid_field() {
    let path = fixtures_dir().join("seed_bad_field.yaml");

    let err = sitecontent_store::seed::parse_seed_file(&path).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert!(err.message().contains("villages"), "{}", err);
}

#[test]
fn test_reject_invalid_schema_version() {
    let path = fixtures_dir().join("seed_invalid_schema_version.yaml");

    let err = sitecontent_store::seed::parse_seed_file(&path).unwrap_err();

    assert!(err.to_string().contains("schema_version"));
}

#[test]
fn test_missing_file_is_reported() {
    let path = fixtures_dir().join("does_not_exist.yaml");

    let err = sitecontent_store::seed::parse_seed_file(&path).unwrap_err();

    assert!(err.message().contains("Failed to read seed file"));
}

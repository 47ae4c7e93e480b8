//! Seed parser with validation
//!
//! Parses YAML and validates schema version, section identifiers, field
//! schemas and that no two entries share a collection.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use sitecontent_core::model::{validate_fields, FieldKind, FieldMap, FieldValue, SectionId};

use crate::errors::{seed_validation, Result};
use crate::seed::format_v0::{Seed, SeedSection, SeedV0};

/// Parse a seed file from a path
pub fn parse_seed_file(path: &Path) -> Result<Seed> {
    let content = fs::read_to_string(path)
        .map_err(|e| seed_validation(&format!("Failed to read seed file: {}", e)))?;

    parse_seed_str(&content)
}

/// Parse a seed from a string
pub fn parse_seed_str(content: &str) -> Result<Seed> {
    let raw: SeedV0 = serde_yaml::from_str(content)
        .map_err(|e| seed_validation(&format!("YAML parse error: {}", e)))?;

    validate_seed(raw)
}

/// Convert one YAML scalar. An unquoted whole number written for a text
/// column (`phone: 5551234`) is kept as its decimal text.
fn yaml_scalar(
    section: &str,
    field: &str,
    kind: Option<FieldKind>,
    value: &serde_yaml::Value,
) -> Result<FieldValue> {
    match value {
        serde_yaml::Value::Null => Ok(FieldValue::Null),
        serde_yaml::Value::String(s) => Ok(FieldValue::Text(s.clone())),
        serde_yaml::Value::Number(n) => {
            let whole = n.as_i64().ok_or_else(|| {
                seed_validation(&format!(
                    "Field {}.{} must be a whole number, got {}",
                    section, field, n
                ))
            })?;
            match kind {
                Some(FieldKind::Text) => Ok(FieldValue::Text(whole.to_string())),
                _ => Ok(FieldValue::Integer(whole)),
            }
        }
        _ => Err(seed_validation(&format!(
            "Field {}.{} must be a string, integer or null",
            section, field
        ))),
    }
}

/// Validate a parsed seed
fn validate_seed(raw: SeedV0) -> Result<Seed> {
    if raw.schema_version != 0 {
        return Err(seed_validation(&format!(
            "Unsupported schema_version: {}. Expected 0",
            raw.schema_version
        )));
    }

    let mut sections = Vec::with_capacity(raw.sections.len());
    let mut claimed: HashMap<&'static str, SectionId> = HashMap::new();

    for (name, values) in &raw.sections {
        let section: SectionId = name
            .parse()
            .map_err(|_| seed_validation(&format!("Unknown section '{}'", name)))?;

        let collection = section.collection();
        if let Some(previous) = claimed.insert(collection.table(), section) {
            return Err(seed_validation(&format!(
                "Sections '{}' and '{}' both write {}",
                previous,
                section,
                collection.table()
            )));
        }

        let mut fields = FieldMap::new();
        for (field, value) in values {
            let kind = collection.column(field).map(|c| c.kind);
            fields.insert(field.clone(), yaml_scalar(name, field, kind, value)?);
        }
        let fields = validate_fields(collection, &fields)
            .map_err(|e| seed_validation(&format!("Section '{}': {}", name, e.message())))?;

        sections.push(SeedSection { section, fields });
    }

    sections.sort_by_key(|s| s.section);

    Ok(Seed {
        schema_version: raw.schema_version,
        sections,
    })
}

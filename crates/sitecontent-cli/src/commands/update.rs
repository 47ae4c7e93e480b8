//! Update command
//!
//! Usage: sitecontent update <SECTION> --set FIELD=VALUE... | --file FIELDS.json

use anyhow::{anyhow, bail, Context};
use clap::Args;
use std::path::{Path, PathBuf};

use sitecontent_core::model::Collection;
use sitecontent_core::{FieldMap, FieldValue, SectionId, SiteConfig};

use crate::backend::Backend;
use crate::commands::print_fields;

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Section identifier: hero, stats, mission, contact or cta
    pub section: String,

    /// Field assignment; repeat for several fields
    #[arg(long = "set", value_name = "FIELD=VALUE", conflicts_with = "file")]
    pub set: Vec<String>,

    /// JSON object of field values
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Parse `FIELD=VALUE` pairs against the collection's declared columns
///
/// Integer columns take whole numbers only; a typo here should fail rather
/// than write zero.
fn parse_assignments(collection: Collection, assignments: &[String]) -> anyhow::Result<FieldMap> {
    let mut fields = FieldMap::new();
    for assignment in assignments {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected FIELD=VALUE, got '{}'", assignment))?;
        let name = name.trim();
        let column = collection
            .column(name)
            .ok_or_else(|| anyhow!("Unknown field '{}' for {}", name, collection))?;
        let value = FieldValue::parse_as(column.kind, raw).ok_or_else(|| {
            anyhow!(
                "Field '{}' expects {}, got '{}'",
                name,
                column.kind.as_str(),
                raw
            )
        })?;
        fields.insert(name.to_string(), value);
    }
    Ok(fields)
}

fn read_fields_file(path: &Path) -> anyhow::Result<FieldMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON object", path.display()))?;

    object
        .iter()
        .map(|(name, value)| {
            FieldValue::from_json(value)
                .map(|v| (name.clone(), v))
                .ok_or_else(|| anyhow!("Field '{}' must be a string, integer or null", name))
        })
        .collect()
}

pub async fn execute(args: UpdateArgs, config: &SiteConfig) -> anyhow::Result<()> {
    let section: SectionId = args.section.parse()?;
    let fields = match &args.file {
        Some(path) => read_fields_file(path)?,
        None => parse_assignments(section.collection(), &args.set)?,
    };
    if fields.is_empty() {
        bail!("Nothing to update: pass --set FIELD=VALUE or --file PATH");
    }

    let backend = Backend::open(config)?;
    let accessor = backend.accessor(section);
    let record = accessor.update(fields).await?;

    println!("✓ Updated {} ({})", section, section.collection());
    print_fields(&record.fields);
    Ok(())
}

//! Fetch command
//!
//! Usage: sitecontent fetch <SECTION> [--json]

use clap::Args;
use serde_json::json;

use sitecontent_core::{SectionId, SectionRecord, SiteConfig};

use crate::backend::Backend;
use crate::commands::print_fields;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Section identifier: hero, stats, mission, contact or cta
    pub section: String,

    /// Print the record and resolved content as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: FetchArgs, config: &SiteConfig) -> anyhow::Result<()> {
    let section: SectionId = args.section.parse()?;
    let backend = Backend::open(config)?;
    let accessor = backend.accessor(section);

    let record = accessor.fetch().await?;
    let resolved = accessor.resolved();

    if args.json {
        let out = json!({
            "section": section.as_str(),
            "collection": section.collection().table(),
            "record": record.as_ref().map(SectionRecord::to_row),
            "resolved": resolved,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match &record {
        Some(record) => {
            println!("{} ({}):", section, section.collection());
            print_fields(&record.fields);
        }
        None => println!("{}: no record", section),
    }
    println!("resolved:");
    print_fields(&resolved.to_fields());

    Ok(())
}

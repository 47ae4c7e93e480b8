//! Seed import command
//!
//! Usage: sitecontent seed import <PATH>

use clap::{Args, Subcommand};
use std::path::PathBuf;

use sitecontent_core::SiteConfig;
use sitecontent_store::seed::import_seed_file;

use crate::backend::Backend;

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Import a seed file, or every seed in a directory, into the store
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to seed YAML file or directory
    pub path: PathBuf,
}

pub async fn execute(args: SeedArgs, config: &SiteConfig) -> anyhow::Result<()> {
    match args.command {
        SeedCommand::Import(import_args) => execute_import(import_args, config).await,
    }
}

async fn execute_import(args: ImportArgs, config: &SiteConfig) -> anyhow::Result<()> {
    let seed_files = if args.path.is_dir() {
        // Sorted for determinism
        let mut files: Vec<PathBuf> = std::fs::read_dir(&args.path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    } else {
        vec![args.path]
    };

    let backend = Backend::open(config)?;
    for seed_file in seed_files {
        println!("Importing {}...", seed_file.display());
        let report = import_seed_file(
            &seed_file,
            backend.store.clone(),
            backend.sessions.clone(),
            backend.consistency,
        )
        .await?;
        println!(
            "✓ Imported {} sections (digest: {})",
            report.sections.len(),
            report.digest
        );
    }
    Ok(())
}

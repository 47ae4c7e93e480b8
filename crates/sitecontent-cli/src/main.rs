//! Site content CLI
//!
//! Command-line interface for the website's editable sections

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sitecontent_core::logging_facility;
use sitecontent_core::SiteConfig;

mod backend;
mod commands;

#[derive(Debug, Parser)]
#[command(name = "sitecontent")]
#[command(about = "Site content - read and edit the website's sections", long_about = None)]
struct Cli {
    /// TOML configuration file; a missing file means defaults plus environment
    #[arg(long, global = true, default_value = "sitecontent.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch one section and show its record and resolved content
    Fetch(commands::fetch::FetchArgs),
    /// Write fields to one section
    Update(commands::update::UpdateArgs),
    /// Fetch every section concurrently and summarise
    Refresh,
    /// Apply SQLite migrations
    Migrate,
    /// Seed import operations
    Seed(commands::seed::SeedArgs),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SiteConfig::load(Some(cli.config.as_path()))?;
    logging_facility::init(config.logging.profile);

    match cli.command {
        Commands::Fetch(args) => commands::fetch::execute(args, &config).await,
        Commands::Update(args) => commands::update::execute(args, &config).await,
        Commands::Refresh => commands::refresh::execute(&config).await,
        Commands::Migrate => commands::migrate::execute(&config),
        Commands::Seed(args) => commands::seed::execute(args, &config).await,
    }
}

#[tokio::main]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

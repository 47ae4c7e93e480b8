//! Migrate command

use anyhow::bail;

use sitecontent_core::{BackendConfig, SiteConfig};
use sitecontent_store::{db, migrations};

pub fn execute(config: &SiteConfig) -> anyhow::Result<()> {
    let BackendConfig::Sqlite { path } = &config.backend else {
        bail!("migrate applies to the sqlite backend only; the REST schema is managed by the host");
    };

    let mut conn = db::open(path)?;
    db::configure(&conn)?;
    let applied = migrations::apply_migrations(&mut conn)?;

    if applied.is_empty() {
        println!("Schema is up to date ({})", path.display());
    }
    for id in applied {
        println!("✓ Applied {}", id);
    }
    Ok(())
}

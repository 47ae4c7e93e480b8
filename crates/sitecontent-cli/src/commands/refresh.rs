//! Refresh command: load every section the way the admin panel does

use anyhow::bail;

use sitecontent_core::model::Collection;
use sitecontent_core::{ContentManager, SiteConfig};

use crate::backend::Backend;

pub async fn execute(config: &SiteConfig) -> anyhow::Result<()> {
    let backend = Backend::open(config)?;
    let mut manager = ContentManager::new(backend.store, backend.sessions)
        .with_consistency(backend.consistency);
    manager.mount().await;

    let mut failed = 0;
    for collection in Collection::ALL {
        let mirror = manager.accessor(collection).snapshot();
        match (&mirror.error, &mirror.content) {
            (Some(message), _) => {
                failed += 1;
                println!("✗ {}: {}", collection, message);
            }
            (None, Some(record)) => {
                println!("✓ {}: {} fields", collection, record.fields.len())
            }
            (None, None) => println!("- {}: no record", collection),
        }
    }

    if failed > 0 {
        bail!("{} of {} sections failed to load", failed, Collection::ALL.len());
    }
    Ok(())
}

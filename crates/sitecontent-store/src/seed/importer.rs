//! Seed importer orchestration
//!
//! Writes each seed section through a [`ContentAccessor`], so imports go
//! through the same session check, validation and upsert as edits.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use sitecontent_core::model::SectionId;
use sitecontent_core::{log_op_end, log_op_error, log_op_start};
use sitecontent_core::{Consistency, ContentAccessor, ContentStore, SessionProvider};

use crate::errors::Result;
use crate::seed::{compute_seed_digest, parse_seed_file, Seed};

const OP_SEED_IMPORT: &str = "seed_import";

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub digest: String,
    pub sections: Vec<SectionId>,
}

/// Import a seed file
///
/// # Errors
///
/// Seed validation failures, or the first failed write.
pub async fn import_seed_file(
    path: &Path,
    store: Arc<dyn ContentStore>,
    sessions: Arc<dyn SessionProvider>,
    consistency: Consistency,
) -> Result<ImportReport> {
    let seed = parse_seed_file(path)?;
    import_seed(&seed, store, sessions, consistency).await
}

/// Import a validated seed, one upsert per section
///
/// Sections are written in identifier order and the import stops at the
/// first failure. Sections written before it stay written. Each write
/// uses `consistency`, as an edit through the same accessor would.
///
/// # Errors
///
/// `Unauthorised` without a session, or the store's failure.
pub async fn import_seed(
    seed: &Seed,
    store: Arc<dyn ContentStore>,
    sessions: Arc<dyn SessionProvider>,
    consistency: Consistency,
) -> Result<ImportReport> {
    let started = Instant::now();
    let digest = compute_seed_digest(seed)?;
    log_op_start!(
        OP_SEED_IMPORT,
        seed_digest = digest.as_str(),
        section_count = seed.sections.len() as u64
    );

    let mut written = Vec::with_capacity(seed.sections.len());
    for entry in &seed.sections {
        let accessor = ContentAccessor::new(entry.section, store.clone(), sessions.clone())
            .with_consistency(consistency);
        if let Err(err) = accessor.update(entry.fields.clone()).await {
            log_op_error!(
                OP_SEED_IMPORT,
                err,
                duration_ms = started.elapsed().as_millis() as u64,
                section = entry.section.as_str()
            );
            return Err(err);
        }
        written.push(entry.section);
    }

    log_op_end!(
        OP_SEED_IMPORT,
        duration_ms = started.elapsed().as_millis() as u64,
        seed_digest = digest.as_str()
    );
    Ok(ImportReport {
        digest,
        sections: written,
    })
}

//! Seed digest canonicalization
//!
//! The digest covers section identifiers and field values only, so
//! reordering or reformatting a seed file does not change it.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use sitecontent_core::model::FieldMap;

use crate::errors::Result;
use crate::seed::format_v0::Seed;

/// Compute the SHA256 digest of a seed's canonical JSON form
pub fn compute_seed_digest(seed: &Seed) -> Result<String> {
    let canonical: BTreeMap<&str, &FieldMap> = seed
        .sections
        .iter()
        .map(|s| (s.section.as_str(), &s.fields))
        .collect();
    let json = serde_json::to_string(&canonical)?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}

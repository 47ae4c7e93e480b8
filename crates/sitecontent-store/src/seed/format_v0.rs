//! Seed Format v0 schema
//!
//! ```yaml
//! schema_version: 0
//! sections:
//!   hero:
//!     title: "Reviving the Soul of Bharat"
//!   stats:
//!     villages: 120
//! ```
//!
//! A bare whole number under a text column, such as `phone: 5551234`, is
//! stored as its digits. Fractional numbers are rejected everywhere.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sitecontent_core::model::{FieldMap, SectionId};

/// Top-level seed file structure as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Field values keyed by section identifier, then column name
    #[serde(default)]
    pub sections: BTreeMap<String, BTreeMap<String, serde_yaml::Value>>,
}

/// One section of a validated seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSection {
    pub section: SectionId,
    pub fields: FieldMap,
}

/// A seed whose sections and fields passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub schema_version: u32,
    /// In section identifier order
    pub sections: Vec<SeedSection>,
}

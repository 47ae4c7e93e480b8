//! Seed import system
//!
//! Provides:
//! - Seed Format v0 schema
//! - YAML parser with validation against the section schemas
//! - Digest canonicalization
//! - Importer that writes through authenticated accessors

pub mod digest;
pub mod format_v0;
pub mod importer;
pub mod parser;

pub use digest::compute_seed_digest;
pub use format_v0::{Seed, SeedSection, SeedV0};
pub use importer::{import_seed, import_seed_file, ImportReport};
pub use parser::{parse_seed_file, parse_seed_str};

//! Site Content Store - backends for the content accessor
//!
//! Provides:
//! - SQLite store with an embedded migrations framework
//! - PostgREST-compatible REST store and session provider
//! - Backend selection from [`SiteConfig`](sitecontent_core::SiteConfig)
//! - Seed Format v0 parser and importer

pub mod backend;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod rest;
pub mod seed;
pub mod sqlite;

// Re-export key types
pub use backend::{open_store, session_provider};
pub use errors::Result;
pub use rest::{RestConfig, RestContentStore, RestSessionProvider};
pub use sqlite::SqliteContentStore;

//! Site Content Core - typed access to the website's editable sections
//!
//! This crate provides:
//! - Section identifiers routed to single-row collections, with declared columns
//! - A generic [`ContentAccessor`] with fetch, upsert and a local mirror
//! - The [`ContentStore`] and [`SessionProvider`] seams, plus in-memory impls
//! - Landing page and admin content manager consumers
//! - Structured errors, logging and configuration shared by the other crates

pub mod accessor;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod manager;
pub mod model;
pub mod page;
pub mod session;
pub mod store;

pub use sitecontent_core_types as core_types;

// Re-export commonly used types
pub use accessor::{Consistency, ContentAccessor, Mirror, MirrorHandle};
pub use config::{BackendConfig, SiteConfig};
pub use errors::{ContentError, ExError, ExErrorKind, Result};
pub use manager::{ContentManager, Notification, NotificationLevel};
pub use model::{Collection, FieldMap, FieldValue, SectionContent, SectionId, SectionRecord};
pub use page::{LandingPage, LandingView};
pub use session::{AnonymousSession, Session, SessionProvider, StaticSession};
pub use store::{ContentStore, MemoryStore};

//! Backend selection from configuration

use std::sync::Arc;

use sitecontent_core::config::{BackendConfig, SiteConfig};
use sitecontent_core::{AnonymousSession, ContentStore, SessionProvider, StaticSession};

use crate::errors::Result;
use crate::rest::{RestConfig, RestContentStore, RestSessionProvider};
use crate::sqlite::SqliteContentStore;

fn rest_config(url: &str, api_key: &str, timeout_secs: u64) -> RestConfig {
    RestConfig::new(url, api_key).with_timeout_secs(timeout_secs)
}

/// Open the configured content store
///
/// # Errors
///
/// SQLite open or migration failures, or an HTTP client that cannot be built.
pub fn open_store(config: &BackendConfig) -> Result<Arc<dyn ContentStore>> {
    match config {
        BackendConfig::Sqlite { path } => {
            tracing::debug!(path = %path.display(), "opening sqlite content store");
            Ok(Arc::new(SqliteContentStore::open(path)?))
        }
        BackendConfig::Rest {
            url,
            api_key,
            timeout_secs,
        } => {
            tracing::debug!(url = url.as_str(), "using rest content store");
            Ok(Arc::new(RestContentStore::new(rest_config(
                url,
                api_key.expose(),
                *timeout_secs,
            ))?))
        }
    }
}

/// Session provider for the configured credentials
///
/// A configured user id is trusted as is. Otherwise a REST backend checks
/// the access token with its identity endpoint. A SQLite backend has no
/// identity provider, so without a user id nobody is signed in.
///
/// # Errors
///
/// An HTTP client that cannot be built.
pub fn session_provider(config: &SiteConfig) -> Result<Arc<dyn SessionProvider>> {
    if let Some(session) = config.session.static_session() {
        return Ok(Arc::new(StaticSession::new(session)));
    }

    match (&config.backend, &config.session.access_token) {
        (
            BackendConfig::Rest {
                url,
                api_key,
                timeout_secs,
            },
            Some(token),
        ) => Ok(Arc::new(RestSessionProvider::new(
            rest_config(url, api_key.expose(), *timeout_secs),
            Some(token.clone()),
        )?)),
        _ => Ok(Arc::new(AnonymousSession)),
    }
}

//! Site configuration
//!
//! Loaded from a TOML file, then overridden from the environment. The CLI
//! loads `.env` before calling [`SiteConfig::load`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

use sitecontent_core_types::Sensitive;

use crate::accessor::Consistency;
use crate::errors::{ContentError, ExError, ExErrorKind, Result};
use crate::logging_facility::Profile;
use crate::session::Session;

pub const ENV_BACKEND_URL: &str = "SITECONTENT_BACKEND_URL";
pub const ENV_API_KEY: &str = "SITECONTENT_API_KEY";
pub const ENV_DB_PATH: &str = "SITECONTENT_DB_PATH";
pub const ENV_ACCESS_TOKEN: &str = "SITECONTENT_ACCESS_TOKEN";
pub const ENV_USER_ID: &str = "SITECONTENT_USER_ID";
pub const ENV_LOG_PROFILE: &str = "SITECONTENT_LOG_PROFILE";

pub const DEFAULT_DB_PATH: &str = ".sitecontent/content.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

/// Where section records live
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// PostgREST-compatible hosted backend
    Rest {
        url: String,
        #[serde(deserialize_with = "deserialize_sensitive")]
        api_key: Sensitive<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// Local SQLite database
    Sqlite {
        #[serde(default = "default_db_path")]
        path: PathBuf,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Sqlite {
            path: default_db_path(),
        }
    }
}

fn deserialize_sensitive<'de, D>(deserializer: D) -> std::result::Result<Sensitive<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(Sensitive::new)
}

fn deserialize_optional_sensitive<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Sensitive<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|v| v.map(Sensitive::new))
}

/// Credentials of the signed-in editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    #[serde(default, deserialize_with = "deserialize_optional_sensitive")]
    pub access_token: Option<Sensitive<String>>,
    /// When set, the token is trusted without asking the identity provider
    #[serde(default)]
    pub user_id: Option<String>,
}

impl SessionConfig {
    /// Session trusted from configuration alone, if both parts are present
    pub fn static_session(&self) -> Option<Session> {
        match (&self.user_id, &self.access_token) {
            (Some(user_id), Some(token)) => Some(Session::new(user_id.clone(), token.expose().clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub profile: Profile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AccessorConfig {
    #[serde(default)]
    pub consistency: Consistency,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub accessor: AccessorConfig,
}

impl SiteConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// `Config` if the document does not match the expected shape.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ContentError::InvalidConfig {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Read a TOML file; a missing path yields the defaults
    ///
    /// # Errors
    ///
    /// `Io` if the file exists but cannot be read, `Config` if it does not
    /// parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("config_load")
                .with_message(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// File (if any) plus process environment
    ///
    /// # Errors
    ///
    /// As [`from_file`](Self::from_file) and
    /// [`apply_overrides`](Self::apply_overrides).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment in production)
    ///
    /// A backend URL switches the backend to REST; it then needs an API key
    /// from the file or the environment.
    ///
    /// # Errors
    ///
    /// `Config` for an unknown log profile or a REST backend without a key.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_BACKEND_URL);
        let api_key = lookup(ENV_API_KEY).map(Sensitive::new);

        match (&mut self.backend, url) {
            (BackendConfig::Rest { url, api_key: key, .. }, new_url) => {
                if let Some(new_url) = new_url {
                    *url = new_url;
                }
                if let Some(new_key) = api_key {
                    *key = new_key;
                }
            }
            (BackendConfig::Sqlite { .. }, Some(new_url)) => {
                let key = api_key.ok_or_else(|| ContentError::InvalidConfig {
                    reason: format!("{} is set but {} is missing", ENV_BACKEND_URL, ENV_API_KEY),
                })?;
                self.backend = BackendConfig::Rest {
                    url: new_url,
                    api_key: key,
                    timeout_secs: DEFAULT_TIMEOUT_SECS,
                };
            }
            (BackendConfig::Sqlite { path }, None) => {
                if let Some(new_path) = lookup(ENV_DB_PATH) {
                    *path = PathBuf::from(new_path);
                }
            }
        }

        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            self.session.access_token = Some(Sensitive::new(token));
        }
        if let Some(user_id) = lookup(ENV_USER_ID) {
            self.session.user_id = Some(user_id);
        }
        if let Some(profile) = lookup(ENV_LOG_PROFILE) {
            self.logging.profile = profile.parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_local_sqlite() {
        let config = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                path: PathBuf::from(DEFAULT_DB_PATH)
            }
        );
        assert_eq!(config.accessor.consistency, Consistency::Optimistic);
        assert!(config.session.static_session().is_none());
    }

    #[test]
    fn test_parse_rest_backend() {
        let config = SiteConfig::from_toml_str(
            r#"
            [backend]
            kind = "rest"
            url = "https://project.example.co"
            api_key = "anon"

            [session]
            access_token = "jwt"
            user_id = "admin"

            [logging]
            profile = "production"

            [accessor]
            consistency = "read_after_write"
            "#,
        )
        .unwrap();

        match &config.backend {
            BackendConfig::Rest {
                url,
                api_key,
                timeout_secs,
            } => {
                assert_eq!(url, "https://project.example.co");
                assert_eq!(api_key.expose(), "anon");
                assert_eq!(*timeout_secs, DEFAULT_TIMEOUT_SECS);
            }
            other => panic!("expected rest backend, got {:?}", other),
        }
        assert_eq!(config.logging.profile, Profile::Production);
        assert_eq!(config.accessor.consistency, Consistency::ReadAfterWrite);
        assert_eq!(config.session.static_session().unwrap().user_id, "admin");
        assert!(!format!("{:?}", config).contains("anon\""));
    }

    #[test]
    fn test_unknown_backend_kind_is_config_error() {
        let err = SiteConfig::from_toml_str("[backend]\nkind = \"redis\"").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_env_url_switches_to_rest() {
        let mut config = SiteConfig::default();
        config
            .apply_overrides(env(&[
                (ENV_BACKEND_URL, "http://localhost:54321"),
                (ENV_API_KEY, "anon"),
                (ENV_ACCESS_TOKEN, "jwt"),
            ]))
            .unwrap();
        assert!(matches!(config.backend, BackendConfig::Rest { .. }));
        assert_eq!(config.session.access_token.unwrap().expose(), "jwt");
    }

    #[test]
    fn test_env_url_without_key_is_rejected() {
        let mut config = SiteConfig::default();
        let err = config
            .apply_overrides(env(&[(ENV_BACKEND_URL, "http://localhost:54321")]))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_env_db_path_and_profile() {
        let mut config = SiteConfig::default();
        config
            .apply_overrides(env(&[(ENV_DB_PATH, "/tmp/site.db"), (ENV_LOG_PROFILE, "test")]))
            .unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                path: PathBuf::from("/tmp/site.db")
            }
        );
        assert_eq!(config.logging.profile, Profile::Test);
    }

    #[test]
    fn test_bad_profile_is_rejected() {
        let mut config = SiteConfig::default();
        assert!(config
            .apply_overrides(env(&[(ENV_LOG_PROFILE, "loud")]))
            .is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn test_from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitecontent.toml");
        std::fs::write(&path, "[backend]\nkind = \"sqlite\"\npath = \"data/site.db\"\n").unwrap();
        let config = SiteConfig::from_file(&path).unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                path: PathBuf::from("data/site.db")
            }
        );
    }
}

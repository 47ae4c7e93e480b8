//! HTTP client for a PostgREST-compatible backend
//!
//! Tables are read through `/rest/v1/{table}` and the signed-in user through
//! `/auth/v1/user`. Writes authenticate with the session's access token;
//! reads use the anon key.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use sitecontent_core::errors::{ContentError, ExError, ExErrorKind};
use sitecontent_core::model::{Collection, SectionRecord, KEY_COLUMN};
use sitecontent_core::{ContentStore, Session, SessionProvider};
use sitecontent_core_types::Sensitive;

use crate::errors::{from_reqwest, Result};

/// `Prefer` header value that turns a POST into an upsert
pub const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// Connection settings shared by the REST store and session provider
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: Sensitive<String>,
    pub timeout_secs: u64,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: Sensitive::new(api_key.into()),
            timeout_secs: sitecontent_core::config::DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn build_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| {
                ExError::new(ExErrorKind::Config)
                    .with_op("http_client")
                    .with_message(e.to_string())
            })
    }

    /// Attach `apikey` and a bearer token (the anon key when no token is given)
    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or_else(|| self.api_key.expose().as_str());
        request
            .header("apikey", self.api_key.expose().as_str())
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
    }
}

/// Error body returned by PostgREST
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Map a non-success status and its body to an error
fn status_error(status: StatusCode, body: &str) -> ExError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ExErrorKind::Forbidden,
        StatusCode::CONFLICT => ExErrorKind::ConstraintViolation,
        StatusCode::NOT_FOUND => ExErrorKind::NotFound,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ExErrorKind::Timeout,
        _ => ExErrorKind::ExternalService,
    };

    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    let message = match parsed.message {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("error")
        ),
    };

    if parsed.code.is_some() || parsed.details.is_some() || parsed.hint.is_some() {
        tracing::debug!(
            status = status.as_u16(),
            pg_code = parsed.code.as_deref().unwrap_or(""),
            details = parsed.details.as_deref().unwrap_or(""),
            hint = parsed.hint.as_deref().unwrap_or(""),
            "backend error body"
        );
    }

    ExError::new(kind).with_op("http").with_message(message)
}

/// Turn a response into its body, or an error for non-2xx statuses
async fn handle_response(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(from_reqwest)?;
    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    Ok(body)
}

/// Content store over a PostgREST `/rest/v1` endpoint
pub struct RestContentStore {
    config: RestConfig,
    client: Client,
}

impl RestContentStore {
    /// # Errors
    ///
    /// `Config` if the HTTP client cannot be built.
    pub fn new(config: RestConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self { config, client })
    }

    fn table_url(&self, collection: Collection) -> String {
        self.config.url(&format!("/rest/v1/{}", collection.table()))
    }
}

#[async_trait]
impl ContentStore for RestContentStore {
    async fn select_single(&self, collection: Collection) -> Result<Option<SectionRecord>> {
        let select: Vec<&str> = std::iter::once(KEY_COLUMN)
            .chain(collection.columns().iter().map(|c| c.name))
            .collect();
        let request = self
            .client
            .get(self.table_url(collection))
            .query(&[("select", select.join(","))])
            .header(header::ACCEPT, "application/json");

        let response = self
            .config
            .authorize(request, None)
            .send()
            .await
            .map_err(from_reqwest)?;
        let body = handle_response(response).await?;

        let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(&body)?;
        tracing::debug!(table = collection.table(), rows = rows.len(), "rest select");
        match rows.as_slice() {
            [] => Ok(None),
            [row] => SectionRecord::from_row(collection, row).map(Some),
            _ => Err(ContentError::MultipleRows {
                collection: collection.table().to_string(),
                count: rows.len(),
            }
            .into()),
        }
    }

    async fn upsert(
        &self,
        collection: Collection,
        record: &SectionRecord,
        session: &Session,
    ) -> Result<()> {
        let request = self
            .client
            .post(self.table_url(collection))
            .query(&[("on_conflict", KEY_COLUMN)])
            .header("Prefer", UPSERT_PREFER)
            .json(&record.to_row());

        let response = self
            .config
            .authorize(request, Some(session.access_token.expose().as_str()))
            .send()
            .await
            .map_err(from_reqwest)?;
        handle_response(response).await?;

        tracing::debug!(table = collection.table(), "rest upsert");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Session provider that asks `/auth/v1/user` who owns the access token
pub struct RestSessionProvider {
    config: RestConfig,
    client: Client,
    access_token: Option<Sensitive<String>>,
}

impl RestSessionProvider {
    /// # Errors
    ///
    /// `Config` if the HTTP client cannot be built.
    pub fn new(config: RestConfig, access_token: Option<Sensitive<String>>) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self {
            config,
            client,
            access_token,
        })
    }
}

#[async_trait]
impl SessionProvider for RestSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        let Some(token) = &self.access_token else {
            return Ok(None);
        };

        let request = self.client.get(self.config.url("/auth/v1/user"));
        let response = self
            .config
            .authorize(request, Some(token.expose().as_str()))
            .send()
            .await
            .map_err(from_reqwest)?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::debug!("access token rejected; no session");
                Ok(None)
            }
            _ => {
                let body = handle_response(response).await?;
                let user: AuthUser = serde_json::from_str(&body)?;
                let session = Session::new(user.id, token.expose().clone());
                Ok(Some(match user.email {
                    Some(email) => session.with_email(email),
                    None => session,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StatusCode::UNAUTHORIZED, ExErrorKind::Forbidden),
            (StatusCode::FORBIDDEN, ExErrorKind::Forbidden),
            (StatusCode::CONFLICT, ExErrorKind::ConstraintViolation),
            (StatusCode::NOT_FOUND, ExErrorKind::NotFound),
            (StatusCode::REQUEST_TIMEOUT, ExErrorKind::Timeout),
            (StatusCode::INTERNAL_SERVER_ERROR, ExErrorKind::ExternalService),
            (StatusCode::BAD_REQUEST, ExErrorKind::ExternalService),
        ];
        for (status, kind) in cases {
            assert_eq!(status_error(status, "").kind(), kind, "{}", status);
        }
    }

    #[test]
    fn test_message_from_postgrest_body() {
        let body = r#"{"code":"42501","message":"permission denied for table website_hero","details":null,"hint":null}"#;
        let err = status_error(StatusCode::FORBIDDEN, body);
        assert_eq!(err.message(), "permission denied for table website_hero");
    }

    #[test]
    fn test_message_falls_back_to_raw_body_then_status() {
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, "upstream down").message(),
            "upstream down"
        );
        assert_eq!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "").message(),
            "HTTP 503 Service Unavailable"
        );
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = RestConfig::new("http://localhost:54321/", "anon");
        assert_eq!(
            config.url("/rest/v1/website_hero"),
            "http://localhost:54321/rest/v1/website_hero"
        );
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = RestConfig::new("http://localhost", "super-secret-anon");
        assert!(!format!("{:?}", config).contains("super-secret-anon"));
    }
}

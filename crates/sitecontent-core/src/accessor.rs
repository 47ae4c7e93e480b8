//! Generic content accessor
//!
//! One [`ContentAccessor`] serves one section identifier. It reads the
//! section's record from a [`ContentStore`], writes replacements back with
//! a single upsert, and keeps a local [`Mirror`] of `{content, loading,
//! error}` for render code to read.
//!
//! Calls are independent: nothing de-duplicates or orders concurrent
//! fetches and updates, and the store resolves competing writes as
//! last-write-wins.

use serde::Deserialize;
use std::sync::{Arc, RwLock, Weak};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::Instrument;

use sitecontent_core_types::schema::{OP_FETCH, OP_UPDATE};
use sitecontent_core_types::RequestContext;

use crate::errors::{ContentError, ExError, ExErrorKind, Result};
use crate::model::{
    validate_fields, Collection, FieldMap, SectionContent, SectionId, SectionRecord,
};
use crate::session::SessionProvider;
use crate::store::ContentStore;
use crate::{log_op_end, log_op_error, log_op_start};

/// Mirror message for fetch failures the store did not describe
pub const FETCH_FAILED_MESSAGE: &str = "Unexpected error occurred";
/// Mirror message for update failures the store did not describe
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update content";

/// Client-held copy of the last known record state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mirror {
    pub content: Option<SectionRecord>,
    pub loading: bool,
    pub error: Option<String>,
}

/// What the mirror holds after a successful write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    /// The written payload, no extra round trip
    #[default]
    Optimistic,
    /// The store's row, read back after the upsert
    ReadAfterWrite,
}

/// Read-only view of an accessor's mirror for render code
#[derive(Debug, Clone)]
pub struct MirrorHandle {
    inner: Arc<RwLock<Mirror>>,
}

impl MirrorHandle {
    pub fn snapshot(&self) -> Mirror {
        self.inner.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().unwrap_or_else(|p| p.into_inner()).loading
    }
}

/// Read/write access to the record behind one section identifier
pub struct ContentAccessor {
    section: SectionId,
    store: Arc<dyn ContentStore>,
    sessions: Arc<dyn SessionProvider>,
    mirror: Arc<RwLock<Mirror>>,
    consistency: Consistency,
}

impl std::fmt::Debug for ContentAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAccessor")
            .field("section", &self.section)
            .field("consistency", &self.consistency)
            .field("mirror", &self.snapshot())
            .finish()
    }
}

impl ContentAccessor {
    pub fn new(
        section: SectionId,
        store: Arc<dyn ContentStore>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            section,
            store,
            sessions,
            mirror: Arc::new(RwLock::new(Mirror::default())),
            consistency: Consistency::default(),
        }
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn section(&self) -> SectionId {
        self.section
    }

    pub fn consistency(&self) -> Consistency {
        self.consistency
    }

    pub fn collection(&self) -> Collection {
        self.section.collection()
    }

    pub fn handle(&self) -> MirrorHandle {
        MirrorHandle {
            inner: self.mirror.clone(),
        }
    }

    pub fn snapshot(&self) -> Mirror {
        self.mirror.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn content(&self) -> Option<SectionRecord> {
        self.snapshot().content
    }

    pub fn is_loading(&self) -> bool {
        self.mirror.read().unwrap_or_else(|p| p.into_inner()).loading
    }

    pub fn error(&self) -> Option<String> {
        self.snapshot().error
    }

    /// Mirrored content resolved against the public page fallback
    pub fn resolved(&self) -> SectionContent {
        SectionContent::resolve(
            SectionContent::fallback(self.collection()),
            self.snapshot().content.as_ref(),
        )
    }

    /// Mirrored content resolved against empty form defaults
    pub fn form_values(&self) -> SectionContent {
        SectionContent::resolve(
            SectionContent::empty(self.collection()),
            self.snapshot().content.as_ref(),
        )
    }

    /// Fetch the section's record into the mirror
    ///
    /// A missing row is `Ok(None)`. On failure the mirror keeps its previous
    /// record and records the error message.
    ///
    /// # Errors
    ///
    /// Transport and store failures other than "no rows".
    pub async fn fetch(&self) -> Result<Option<SectionRecord>> {
        self.fetch_in(RequestContext::new()).await
    }

    /// Re-issue the fetch (explicit user refresh)
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn refetch(&self) -> Result<Option<SectionRecord>> {
        self.fetch().await
    }

    /// Fetch under an existing request context
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_in(&self, ctx: RequestContext) -> Result<Option<SectionRecord>> {
        set_loading(&self.mirror, true);
        let result = run_fetch(self.section, self.store.as_ref(), &ctx).await;
        apply_fetch(&self.mirror, &result);
        result
    }

    /// Fetch on the runtime without waiting for the result
    ///
    /// The task holds only a weak reference to the mirror: if every owner
    /// of the mirror is dropped before the round trip completes, the result
    /// is discarded.
    pub fn spawn_fetch(&self) -> JoinHandle<()> {
        set_loading(&self.mirror, true);
        let section = self.section;
        let store = self.store.clone();
        let mirror: Weak<RwLock<Mirror>> = Arc::downgrade(&self.mirror);
        let ctx = RequestContext::new();

        tokio::spawn(async move {
            let result = run_fetch(section, store.as_ref(), &ctx).await;
            match mirror.upgrade() {
                Some(mirror) => apply_fetch(&mirror, &result),
                None => tracing::debug!(
                    section = section.as_str(),
                    request_id = ctx.request_id.as_str(),
                    "accessor dropped before fetch completed; result discarded"
                ),
            }
        })
    }

    /// Write `new_fields` for this section with a single upsert
    ///
    /// Requires a current session; without one nothing is written. The
    /// `section_name` key is always the collection's canonical key.
    ///
    /// # Errors
    ///
    /// `Unauthorised` without a session, `InvalidInput` for fields outside
    /// the collection schema, or the store's failure.
    pub async fn update(&self, new_fields: FieldMap) -> Result<SectionRecord> {
        self.update_in(new_fields, RequestContext::new()).await
    }

    /// Write typed content; the variant must match this accessor's collection
    ///
    /// # Errors
    ///
    /// `InvalidInput` on a collection mismatch, otherwise as
    /// [`update`](Self::update).
    pub async fn update_content(&self, content: &SectionContent) -> Result<SectionRecord> {
        if content.collection() != self.collection() {
            return Err(ContentError::ContentMismatch {
                expected: self.collection().table().to_string(),
                actual: content.collection().table().to_string(),
            }
            .into());
        }
        self.update(content.to_fields()).await
    }

    /// Update under an existing request context
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub async fn update_in(&self, new_fields: FieldMap, ctx: RequestContext) -> Result<SectionRecord> {
        let span = op_span(OP_UPDATE, self.section, &ctx);
        async {
            let started = Instant::now();
            log_op_start!(
                OP_UPDATE,
                section = self.section.as_str(),
                field_count = new_fields.len() as u64
            );

            match self.write(new_fields, &ctx).await {
                Ok(record) => {
                    log_op_end!(
                        OP_UPDATE,
                        duration_ms = elapsed_ms(started),
                        section = self.section.as_str()
                    );
                    Ok(record)
                }
                Err(err) => {
                    let err = err
                        .with_op(OP_UPDATE)
                        .with_section(self.section.as_str())
                        .with_context(&ctx);
                    log_op_error!(
                        OP_UPDATE,
                        err,
                        duration_ms = elapsed_ms(started),
                        section = self.section.as_str()
                    );
                    set_error(&self.mirror, mirror_message(&err, UPDATE_FAILED_MESSAGE));
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn write(&self, new_fields: FieldMap, ctx: &RequestContext) -> Result<SectionRecord> {
        let session = match self.sessions.current_session().await {
            Ok(Some(session)) => session,
            Ok(None) => return Err(ContentError::AuthenticationRequired.into()),
            Err(err) => {
                tracing::warn!(
                    section = self.section.as_str(),
                    error = %err,
                    "session lookup failed; treating caller as signed out"
                );
                return Err(ExError::from(ContentError::AuthenticationRequired).with_source(err));
            }
        };

        let collection = self.collection();
        let fields = validate_fields(collection, &new_fields)?;
        let record = SectionRecord::new(self.section.record_key(), fields);

        self.store
            .upsert(collection, &record, &session)
            .await
            .map_err(|e| e.with_collection(collection.table()))?;

        let mirrored = match self.consistency {
            Consistency::Optimistic => record.clone(),
            Consistency::ReadAfterWrite => match run_fetch(self.section, self.store.as_ref(), ctx).await
            {
                Ok(Some(stored)) => stored,
                Ok(None) => record.clone(),
                Err(err) => {
                    tracing::warn!(
                        section = self.section.as_str(),
                        error = %err,
                        "read-after-write failed; mirroring written payload"
                    );
                    record.clone()
                }
            },
        };

        let mut mirror = self.mirror.write().unwrap_or_else(|p| p.into_inner());
        mirror.content = Some(mirrored);
        mirror.error = None;
        Ok(record)
    }
}

fn op_span(op: &'static str, section: SectionId, ctx: &RequestContext) -> tracing::Span {
    tracing::info_span!(
        "content_op",
        op = op,
        section = section.as_str(),
        collection = section.collection().table(),
        request_id = ctx.request_id.as_str(),
        trace_id = ctx.trace_str(),
    )
}

async fn run_fetch(
    section: SectionId,
    store: &dyn ContentStore,
    ctx: &RequestContext,
) -> Result<Option<SectionRecord>> {
    let span = op_span(OP_FETCH, section, ctx);
    async {
        let started = Instant::now();
        log_op_start!(OP_FETCH, section = section.as_str());

        match store.select_single(section.collection()).await {
            Ok(record) => {
                log_op_end!(
                    OP_FETCH,
                    duration_ms = elapsed_ms(started),
                    section = section.as_str(),
                    found = record.is_some()
                );
                Ok(record)
            }
            Err(err) => {
                let err = err
                    .with_op(OP_FETCH)
                    .with_section(section.as_str())
                    .with_collection(section.collection().table())
                    .with_context(ctx);
                log_op_error!(
                    OP_FETCH,
                    err,
                    duration_ms = elapsed_ms(started),
                    section = section.as_str()
                );
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}

fn set_loading(mirror: &RwLock<Mirror>, loading: bool) {
    mirror.write().unwrap_or_else(|p| p.into_inner()).loading = loading;
}

fn set_error(mirror: &RwLock<Mirror>, message: String) {
    mirror.write().unwrap_or_else(|p| p.into_inner()).error = Some(message);
}

fn apply_fetch(mirror: &RwLock<Mirror>, result: &Result<Option<SectionRecord>>) {
    let mut mirror = mirror.write().unwrap_or_else(|p| p.into_inner());
    match result {
        Ok(record) => {
            mirror.content = record.clone();
            mirror.error = None;
        }
        Err(err) => {
            mirror.error = Some(mirror_message(err, FETCH_FAILED_MESSAGE));
        }
    }
    mirror.loading = false;
}

/// Message stored in the mirror for a failed operation
fn mirror_message(err: &ExError, generic: &str) -> String {
    let described = err.kind().is_store_reported()
        || matches!(
            err.kind(),
            ExErrorKind::Unauthorised | ExErrorKind::InvalidInput
        );
    if described && !err.message().is_empty() {
        err.message().to_string()
    } else {
        generic.to_string()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

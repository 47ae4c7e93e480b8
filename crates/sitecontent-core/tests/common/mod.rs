use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Notify;

use sitecontent_core::{
    AnonymousSession, Collection, ContentAccessor, ContentStore, MemoryStore, Result, SectionId,
    SectionRecord, Session, SessionProvider, StaticSession,
};

/// Provider with an editor signed in
#[allow(dead_code)]
pub fn signed_in() -> Arc<dyn SessionProvider> {
    Arc::new(StaticSession::new(Session::new("editor-1", "test-token")))
}

#[allow(dead_code)]
pub fn signed_out() -> Arc<dyn SessionProvider> {
    Arc::new(AnonymousSession)
}

/// Accessor over a shared memory store
#[allow(dead_code)]
pub fn accessor(
    section: SectionId,
    store: &Arc<MemoryStore>,
    sessions: Arc<dyn SessionProvider>,
) -> ContentAccessor {
    ContentAccessor::new(section, store.clone(), sessions)
}

/// Store whose reads wait for [`GatedStore::release`]
///
/// Lets a test observe an accessor while a fetch is in flight.
#[allow(dead_code)]
pub struct GatedStore {
    pub inner: MemoryStore,
    gate: Notify,
}

#[allow(dead_code)]
impl GatedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            gate: Notify::new(),
        }
    }

    /// Let one pending (or the next) read through
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl ContentStore for GatedStore {
    async fn select_single(&self, collection: Collection) -> Result<Option<SectionRecord>> {
        self.gate.notified().await;
        self.inner.select_single(collection).await
    }

    async fn upsert(
        &self,
        collection: Collection,
        record: &SectionRecord,
        session: &Session,
    ) -> Result<()> {
        self.inner.upsert(collection, record, session).await
    }
}

//! Content store seam and the in-memory implementation
//!
//! A store holds one table per [`Collection`]; each table has at most one
//! row, keyed by `section_name`.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::errors::{ContentError, ExError, ExErrorKind, Result};
use crate::model::{Collection, SectionRecord};
use crate::session::Session;

/// Keyed remote store of section records
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// The collection's single record, or `None` if it has no row yet
    ///
    /// Only `section_name` and declared columns are returned.
    ///
    /// # Errors
    ///
    /// Transport or store failures. More than one row is a
    /// `ConstraintViolation`.
    async fn select_single(&self, collection: Collection) -> Result<Option<SectionRecord>>;

    /// Insert the record, or merge its fields into the row with the same
    /// `section_name`, as one atomic operation
    ///
    /// # Errors
    ///
    /// Constraint violations, permission denials and transport failures.
    async fn upsert(
        &self,
        collection: Collection,
        record: &SectionRecord,
        session: &Session,
    ) -> Result<()>;
}

/// `RwLock`-guarded in-memory store
///
/// Counts writes and can be told to fail, so accessor behaviour can be
/// checked without a backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Collection, BTreeMap<String, SectionRecord>>>,
    failure: RwLock<Option<ExError>>,
    writes: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `err` until [`clear_failure`](Self::clear_failure)
    pub fn fail_with(&self, err: ExError) {
        *self.failure.write().unwrap_or_else(|p| p.into_inner()) = Some(err);
    }

    pub fn clear_failure(&self) {
        *self.failure.write().unwrap_or_else(|p| p.into_inner()) = None;
    }

    /// Number of upserts that reached the table
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Insert a raw row, bypassing upsert (test setup)
    pub fn insert_raw(&self, collection: Collection, record: SectionRecord) {
        let mut tables = self.tables.write().unwrap_or_else(|p| p.into_inner());
        tables
            .entry(collection)
            .or_default()
            .insert(record.section_name.clone(), record);
    }

    /// Number of rows in a collection
    pub fn row_count(&self, collection: Collection) -> usize {
        let tables = self.tables.read().unwrap_or_else(|p| p.into_inner());
        tables.get(&collection).map(BTreeMap::len).unwrap_or(0)
    }

    fn check_failure(&self) -> Result<()> {
        match &*self.failure.read().unwrap_or_else(|p| p.into_inner()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn select_single(&self, collection: Collection) -> Result<Option<SectionRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let tables = self.tables.read().unwrap_or_else(|p| p.into_inner());
        let Some(rows) = tables.get(&collection) else {
            return Ok(None);
        };
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.values().next().cloned()),
            count => Err(ContentError::MultipleRows {
                collection: collection.table().to_string(),
                count,
            }
            .into()),
        }
    }

    async fn upsert(
        &self,
        collection: Collection,
        record: &SectionRecord,
        _session: &Session,
    ) -> Result<()> {
        self.check_failure()?;
        if record.section_name.is_empty() {
            return Err(ExError::new(ExErrorKind::ConstraintViolation)
                .with_collection(collection.table())
                .with_message("section_name must not be empty"));
        }

        let mut tables = self.tables.write().unwrap_or_else(|p| p.into_inner());
        let rows = tables.entry(collection).or_default();
        rows.entry(record.section_name.clone())
            .and_modify(|existing| {
                for (name, value) in &record.fields {
                    existing.fields.insert(name.clone(), value.clone());
                }
            })
            .or_insert_with(|| record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    fn session() -> Session {
        Session::new("user-1", "token")
    }

    #[tokio::test]
    async fn test_empty_collection_selects_none() {
        let store = MemoryStore::new();
        assert!(store.select_single(Collection::Hero).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_merges_into_existing_row() {
        let store = MemoryStore::new();
        let first = SectionRecord::new("hero", fields! { "title" => "A", "subtitle" => "S" });
        let second = SectionRecord::new("hero", fields! { "title" => "B" });
        store.upsert(Collection::Hero, &first, &session()).await.unwrap();
        store.upsert(Collection::Hero, &second, &session()).await.unwrap();

        let row = store.select_single(Collection::Hero).await.unwrap().unwrap();
        assert_eq!(row.text("title"), Some("B"));
        assert_eq!(row.text("subtitle"), Some("S"));
        assert_eq!(store.row_count(Collection::Hero), 1);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_two_rows_is_a_constraint_violation() {
        let store = MemoryStore::new();
        store.insert_raw(Collection::Hero, SectionRecord::new("hero", fields! {}));
        store.insert_raw(Collection::Hero, SectionRecord::new("cta", fields! {}));
        let err = store.select_single(Collection::Hero).await.unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    }

    #[tokio::test]
    async fn test_injected_failure_blocks_writes() {
        let store = MemoryStore::new();
        store.fail_with(ExError::new(ExErrorKind::ExternalService).with_message("down"));
        let record = SectionRecord::new("stats", fields! { "villages" => 1 });
        assert!(store.upsert(Collection::Stats, &record, &session()).await.is_err());
        assert_eq!(store.write_count(), 0);

        store.clear_failure();
        store.upsert(Collection::Stats, &record, &session()).await.unwrap();
        assert_eq!(store.write_count(), 1);
    }
}

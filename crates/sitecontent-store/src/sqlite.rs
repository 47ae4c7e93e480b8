//! SQLite-backed content store
//!
//! Statements are built from the declared column tables of each
//! [`Collection`], never from caller input. The connection sits behind a
//! mutex and all work runs on the blocking pool.

use async_trait::async_trait;
use rusqlite::types::{Value, ValueRef};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use sitecontent_core::errors::{ContentError, ExError, ExErrorKind};
use sitecontent_core::model::{Collection, FieldMap, FieldValue, SectionRecord, KEY_COLUMN};
use sitecontent_core::{ContentStore, Session};

use crate::db;
use crate::errors::{from_join, from_rusqlite, Result};
use crate::migrations::apply_migrations;

#[derive(Clone)]
pub struct SqliteContentStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteContentStore").finish_non_exhaustive()
    }
}

impl SqliteContentStore {
    /// Open (or create) a database file and bring its schema up to date
    ///
    /// # Errors
    ///
    /// IO errors creating the parent directory, SQLite errors, or a failed
    /// migration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut conn = db::open(path)?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Fresh in-memory database with the schema applied
    ///
    /// # Errors
    ///
    /// SQLite or migration failures.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        apply_migrations(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already migrated connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `f` with the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("sqlite")
                    .with_message("connection lock poisoned")
            })?;
            f(&mut guard)
        })
        .await
        .map_err(from_join)?
    }
}

fn select_sql(collection: Collection) -> String {
    let columns: Vec<&str> = std::iter::once(KEY_COLUMN)
        .chain(collection.columns().iter().map(|c| c.name))
        .collect();
    // Two rows are enough to detect a broken single-row invariant
    format!(
        "SELECT {} FROM {} ORDER BY id LIMIT 2",
        columns.join(", "),
        collection.table()
    )
}

fn upsert_sql(collection: Collection, names: &[&str]) -> String {
    let mut columns = vec![KEY_COLUMN];
    columns.extend_from_slice(names);
    columns.push("updated_at");

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let updates: Vec<String> = names
        .iter()
        .chain(std::iter::once(&"updated_at"))
        .map(|name| format!("{name} = excluded.{name}"))
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {}",
        collection.table(),
        columns.join(", "),
        placeholders.join(", "),
        KEY_COLUMN,
        updates.join(", ")
    )
}

fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(n) => Value::Integer(*n),
        FieldValue::Text(s) => Value::Text(s.clone()),
        FieldValue::Null => Value::Null,
    }
}

fn from_sql_value(collection: Collection, column: &str, value: ValueRef<'_>) -> Result<FieldValue> {
    match value {
        ValueRef::Null => Ok(FieldValue::Null),
        ValueRef::Integer(n) => Ok(FieldValue::Integer(n)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| FieldValue::Text(s.to_string()))
            .map_err(|e| {
                ExError::new(ExErrorKind::Serialization)
                    .with_collection(collection.table())
                    .with_message(format!("column '{}' is not UTF-8: {}", column, e))
            }),
        ValueRef::Real(_) | ValueRef::Blob(_) => Err(ExError::new(ExErrorKind::Serialization)
            .with_collection(collection.table())
            .with_message(format!("column '{}' holds a non-scalar value", column))),
    }
}

fn read_rows(conn: &Connection, collection: Collection) -> Result<Vec<SectionRecord>> {
    let mut stmt = conn
        .prepare(&select_sql(collection))
        .map_err(from_rusqlite)?;
    let mut rows = stmt.query([]).map_err(from_rusqlite)?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().map_err(from_rusqlite)? {
        let section_name: String = row.get(0).map_err(from_rusqlite)?;
        let mut fields = FieldMap::new();
        for (i, column) in collection.columns().iter().enumerate() {
            let raw = row.get_ref(i + 1).map_err(from_rusqlite)?;
            fields.insert(
                column.name.to_string(),
                from_sql_value(collection, column.name, raw)?,
            );
        }
        records.push(SectionRecord::new(section_name, fields));
    }
    Ok(records)
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn select_single(&self, collection: Collection) -> Result<Option<SectionRecord>> {
        let mut records = self
            .with_conn(move |conn| read_rows(conn, collection))
            .await
            .map_err(|e| e.with_collection(collection.table()))?;

        tracing::debug!(table = collection.table(), rows = records.len(), "sqlite select");
        match records.len() {
            0 => Ok(None),
            1 => Ok(records.pop()),
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
        session: &Session,
    ) -> Result<()> {
        if let Some(name) = record
            .fields
            .keys()
            .find(|name| collection.column(name).is_none())
        {
            return Err(ContentError::UnknownField {
                collection: collection.table().to_string(),
                field: name.clone(),
            }
            .into());
        }

        let names: Vec<&'static str> = collection
            .columns()
            .iter()
            .map(|c| c.name)
            .filter(|name| record.fields.contains_key(*name))
            .collect();
        let sql = upsert_sql(collection, &names);

        let mut params = Vec::with_capacity(names.len() + 2);
        params.push(Value::Text(record.section_name.clone()));
        params.extend(
            names
                .iter()
                .filter_map(|name| record.fields.get(*name))
                .map(to_sql_value),
        );
        params.push(Value::Text(chrono::Utc::now().to_rfc3339()));

        tracing::debug!(
            table = collection.table(),
            user_id = session.user_id.as_str(),
            field_count = names.len() as u64,
            "sqlite upsert"
        );

        self.with_conn(move |conn| {
            conn.execute(&sql, rusqlite::params_from_iter(params.iter()))
                .map(|_| ())
                .map_err(from_rusqlite)
        })
        .await
        .map_err(|e| e.with_collection(collection.table()))
    }
}

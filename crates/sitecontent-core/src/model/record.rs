use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{ContentError, ExError, ExErrorKind, Result};
use crate::model::section::{Collection, FieldKind, KEY_COLUMN};

/// Scalar value of one section field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Null,
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Convert a JSON scalar; floats, booleans and containers are rejected
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(FieldValue::Null),
            serde_json::Value::String(s) => Some(FieldValue::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(FieldValue::Integer),
            _ => None,
        }
    }

    /// Parse a user-supplied string against a column kind
    pub fn parse_as(kind: FieldKind, raw: &str) -> Option<Self> {
        match kind {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => raw.trim().parse::<i64>().ok().map(FieldValue::Integer),
        }
    }

    fn matches(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Null, _)
                | (FieldValue::Text(_), FieldKind::Text)
                | (FieldValue::Integer(_), FieldKind::Integer)
        )
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

/// Named field values of one section, ordered by name
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Build a [`FieldMap`] from `name => value` pairs
///
/// ```
/// use sitecontent_core::fields;
/// use sitecontent_core::model::FieldValue;
///
/// let f = fields! { "villages" => 120, "title" => "Hello" };
/// assert_eq!(f.get("villages"), Some(&FieldValue::Integer(120)));
/// ```
#[macro_export]
macro_rules! fields {
    () => { $crate::model::FieldMap::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::model::FieldMap::new();
        $( map.insert($name.to_string(), $crate::model::FieldValue::from($value)); )+
        map
    }};
}

/// The single configurable record of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub section_name: String,
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl SectionRecord {
    pub fn new(section_name: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            section_name: section_name.into(),
            fields,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_integer)
    }

    /// Build a record from a store row, keeping only declared columns
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the key is missing or a declared column
    /// holds a non-scalar value.
    pub fn from_row(
        collection: Collection,
        row: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self> {
        let section_name = row
            .get(KEY_COLUMN)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ExError::new(ExErrorKind::Serialization)
                    .with_collection(collection.table())
                    .with_message(format!("row is missing '{}'", KEY_COLUMN))
            })?;

        let mut fields = FieldMap::new();
        for column in collection.columns() {
            let Some(raw) = row.get(column.name) else {
                continue;
            };
            let value = FieldValue::from_json(raw).ok_or_else(|| {
                ExError::new(ExErrorKind::Serialization)
                    .with_collection(collection.table())
                    .with_message(format!("column '{}' is not a scalar: {}", column.name, raw))
            })?;
            fields.insert(column.name.to_string(), value);
        }

        Ok(Self::new(section_name, fields))
    }

    /// JSON object with the key and every field, as written to a store
    pub fn to_row(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut row = serde_json::Map::new();
        row.insert(
            KEY_COLUMN.to_string(),
            serde_json::Value::String(self.section_name.clone()),
        );
        for (name, value) in &self.fields {
            let json = match value {
                FieldValue::Integer(n) => serde_json::Value::from(*n),
                FieldValue::Text(s) => serde_json::Value::String(s.clone()),
                FieldValue::Null => serde_json::Value::Null,
            };
            row.insert(name.clone(), json);
        }
        row
    }
}

/// Check fields against the collection schema
///
/// A `section_name` entry is dropped; the caller re-adds the canonical key.
///
/// # Errors
///
/// Returns `InvalidInput` for undeclared columns or mismatched scalar types.
pub fn validate_fields(collection: Collection, fields: &FieldMap) -> Result<FieldMap> {
    let mut validated = FieldMap::new();
    for (name, value) in fields {
        if name == KEY_COLUMN {
            continue;
        }
        let column = collection
            .column(name)
            .ok_or_else(|| ContentError::UnknownField {
                collection: collection.table().to_string(),
                field: name.clone(),
            })?;
        if !value.matches(column.kind) {
            return Err(ContentError::FieldTypeMismatch {
                collection: collection.table().to_string(),
                field: name.clone(),
                expected: column.kind.as_str().to_string(),
            }
            .into());
        }
        validated.insert(name.clone(), value.clone());
    }
    Ok(validated)
}

//! Fetched rows and the shapes they can be returned in.

use std::collections::BTreeMap;
use std::sync::Arc;

use wings_core::SqlValue;

/// Shape of a row returned by `fetch`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Column name to value map.
    #[default]
    Assoc,
    /// Values in column order.
    Num,
    /// A [`Record`] addressable by name and by position.
    Object,
}

/// One fetched row.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Column name to value. A repeated column name keeps the last value.
    Assoc(BTreeMap<String, SqlValue>),
    /// Values in column order.
    Num(Vec<SqlValue>),
    /// Named and positional access.
    Object(Record),
}

impl Row {
    /// Returns the value of `column`, for the shapes that carry names.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        match self {
            Self::Assoc(map) => map.get(column),
            Self::Num(_) => None,
            Self::Object(record) => record.get(column),
        }
    }
}

/// A row with its column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Record {
    /// Creates a record. `values` is expected in `columns` order.
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Returns the value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Returns the value at position `index`.
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Converts the record into the requested shape.
    pub fn into_row(self, mode: FetchMode) -> Row {
        match mode {
            FetchMode::Assoc => {
                let columns = self.columns.iter().cloned();
                Row::Assoc(columns.zip(self.values).collect())
            }
            FetchMode::Num => Row::Num(self.values),
            FetchMode::Object => Row::Object(self),
        }
    }

    /// Renders the record as a JSON object, for typed deserialization.
    pub fn to_json(&self) -> serde_json::Value {
        self.iter()
            .map(|(column, value)| (column.to_string(), value_to_json(value)))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }
}

fn value_to_json(value: &SqlValue) -> serde_json::Value {
    match value {
        SqlValue::Null => serde_json::Value::Null,
        SqlValue::Bool(b) => serde_json::Value::Bool(*b),
        SqlValue::Int(n) => serde_json::Value::from(*n),
        SqlValue::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        SqlValue::Text(s) => serde_json::Value::String(s.clone()),
        SqlValue::Blob(bytes) => serde_json::Value::from(bytes.clone()),
    }
}

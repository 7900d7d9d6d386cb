//! Prepared statement scope.
//!
//! A scope is one prepared statement together with its bound parameters and,
//! once executed, its buffered result. A session keeps at most one scope and
//! replaces it on every operation.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::Arc;

use thiserror::Error;
use wings_core::{BoundParam, ParamType, SqlValue};

use crate::row::{FetchMode, Record, Row};

/// A placeholder of a prepared statement that has no bound value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no value bound for placeholder {0}")]
pub struct UnboundPlaceholder(pub String);

/// A prepared statement with bound parameters and buffered results.
#[derive(Debug, Clone)]
pub struct Scope {
    sql: String,
    compiled: String,
    placeholders: Vec<String>,
    columns: Arc<[String]>,
    params: Vec<BoundParam>,
    rows: VecDeque<Vec<SqlValue>>,
    row_count: u64,
    executed: bool,
}

impl Scope {
    /// Creates a scope for `sql` as the driver prepared it.
    ///
    /// `compiled` is the text the driver executes, `placeholders` the named
    /// parameters in the driver's positional order, and `columns` the result
    /// columns (empty for statements that return no rows).
    pub fn prepared(
        sql: impl Into<String>,
        compiled: impl Into<String>,
        placeholders: Vec<String>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            sql: sql.into(),
            compiled: compiled.into(),
            placeholders,
            columns: Arc::from(columns),
            params: Vec::new(),
            rows: VecDeque::new(),
            row_count: 0,
            executed: false,
        }
    }

    /// SQL text as the session built it.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// SQL text as the driver executes it.
    pub fn compiled_sql(&self) -> &str {
        &self.compiled
    }

    /// Result column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns `true` when the statement produces rows.
    pub fn returns_rows(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Bound parameters, in binding order.
    pub fn params(&self) -> &[BoundParam] {
        &self.params
    }

    /// Returns `true` once the statement has been executed.
    pub const fn is_executed(&self) -> bool {
        self.executed
    }

    /// Binds `value` to the placeholder `name` (`:field`), replacing any
    /// earlier binding of the same name.
    pub fn bind(&mut self, name: impl Into<String>, value: SqlValue, ty: ParamType) {
        let name = name.into();
        if let Some(existing) = self.params.iter_mut().find(|p| p.name == name) {
            existing.value = value;
            existing.ty = ty;
        } else {
            self.params.push(BoundParam { name, value, ty });
        }
    }

    /// Returns the bound values in the driver's positional order.
    ///
    /// # Errors
    ///
    /// [`UnboundPlaceholder`] for the first placeholder without a binding.
    pub fn positional_values(&self) -> Result<Vec<SqlValue>, UnboundPlaceholder> {
        self.placeholders
            .iter()
            .map(|name| {
                self.params
                    .iter()
                    .find(|p| &p.name == name)
                    .map(|p| p.value.clone())
                    .ok_or_else(|| UnboundPlaceholder(name.clone()))
            })
            .collect()
    }

    /// Stores the rows produced by execution. Each row is in column order.
    pub fn record_rows(&mut self, rows: Vec<Vec<SqlValue>>) {
        self.row_count = rows.len() as u64;
        self.rows = rows.into();
        self.executed = true;
    }

    /// Stores the affected-row count of a statement without a result set.
    pub fn record_affected(&mut self, affected: u64) {
        self.row_count = affected;
        self.rows.clear();
        self.executed = true;
    }

    /// Rows returned by a query, or rows affected by any other statement.
    pub const fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Advances the cursor, returning the next row in `mode`.
    pub fn fetch_row(&mut self, mode: FetchMode) -> Option<Row> {
        self.next_record().map(|record| record.into_row(mode))
    }

    /// Advances the cursor, returning the next row as a [`Record`].
    pub fn next_record(&mut self) -> Option<Record> {
        self.rows
            .pop_front()
            .map(|values| Record::new(Arc::clone(&self.columns), values))
    }

    /// Dumps the statement and its bound parameters for diagnostics.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "SQL: [{}] {}", self.sql.len(), self.sql);
        let _ = writeln!(out, "Params:  {}", self.params.len());
        for (position, param) in self.params.iter().enumerate() {
            let _ = writeln!(out, "Key: Name: [{}] {}", param.name.len(), param.name);
            let _ = writeln!(out, "paramno={position}");
            let _ = writeln!(out, "param_type={}", param.ty);
            let _ = writeln!(out, "value={}", param.value.to_text());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_scope() -> Scope {
        Scope::prepared(
            "SELECT `id`, `name` FROM `users`",
            "SELECT `id`, `name` FROM `users`",
            vec![],
            vec![String::from("id"), String::from("name")],
        )
    }

    fn insert_scope() -> Scope {
        Scope::prepared(
            "INSERT INTO `users` (`id`, `name`) VALUES (:id, :name)",
            "INSERT INTO `users` (`id`, `name`) VALUES (?1, ?2)",
            vec![String::from(":id"), String::from(":name")],
            vec![],
        )
    }

    #[test]
    fn test_bind_replaces_same_name() {
        let mut scope = insert_scope();
        scope.bind(":id", SqlValue::Int(1), ParamType::Integer);
        scope.bind(":id", SqlValue::Int(2), ParamType::Integer);
        assert_eq!(scope.params().len(), 1);
        assert_eq!(scope.params()[0].value, SqlValue::Int(2));
    }

    #[test]
    fn test_positional_values_follow_placeholders() {
        let mut scope = insert_scope();
        scope.bind(":name", SqlValue::Text(String::from("a")), ParamType::Text);
        scope.bind(":id", SqlValue::Int(1), ParamType::Integer);
        assert_eq!(
            scope.positional_values().unwrap(),
            vec![SqlValue::Int(1), SqlValue::Text(String::from("a"))]
        );
    }

    #[test]
    fn test_positional_values_report_missing_binding() {
        let mut scope = insert_scope();
        scope.bind(":id", SqlValue::Int(1), ParamType::Integer);
        let err = scope.positional_values().unwrap_err();
        assert_eq!(err, UnboundPlaceholder(String::from(":name")));
        assert_eq!(err.to_string(), "no value bound for placeholder :name");
    }

    #[test]
    fn test_cursor_advances_until_exhausted() {
        let mut scope = select_scope();
        assert!(scope.returns_rows());
        scope.record_rows(vec![
            vec![SqlValue::Int(1), SqlValue::Text(String::from("a"))],
            vec![SqlValue::Int(2), SqlValue::Text(String::from("b"))],
        ]);
        assert_eq!(scope.row_count(), 2);

        let first = scope.fetch_row(FetchMode::Object).unwrap();
        assert_eq!(first.get("name"), Some(&SqlValue::Text(String::from("a"))));
        let second = scope.fetch_row(FetchMode::Num).unwrap();
        assert_eq!(
            second,
            Row::Num(vec![SqlValue::Int(2), SqlValue::Text(String::from("b"))])
        );
        assert!(scope.fetch_row(FetchMode::Assoc).is_none());
        assert_eq!(scope.row_count(), 2);
    }

    #[test]
    fn test_record_affected() {
        let mut scope = insert_scope();
        assert!(!scope.is_executed());
        scope.record_affected(3);
        assert!(scope.is_executed());
        assert_eq!(scope.row_count(), 3);
        assert!(scope.fetch_row(FetchMode::Assoc).is_none());
    }

    #[test]
    fn test_dump_lists_params() {
        let mut scope = insert_scope();
        scope.bind(":id", SqlValue::Int(1), ParamType::Integer);
        scope.bind(":name", SqlValue::Text(String::from("a")), ParamType::Text);
        let dump = scope.dump();
        assert!(dump.starts_with("SQL: [54] INSERT INTO"), "{dump}");
        assert!(dump.contains("Params:  2"), "{dump}");
        assert!(dump.contains("Key: Name: [5] :name"), "{dump}");
        assert!(dump.contains("param_type=integer"), "{dump}");
        assert!(dump.contains("value=a"), "{dump}");
    }
}

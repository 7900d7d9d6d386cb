//! Complete statements for one table.

use super::fields::{insert_lists, sanitize, select_field_list, update_assignments, Data};
use crate::dialect::Dialect;
use crate::error::BuildError;
use crate::value::{ParamType, SqlValue, UnsupportedValuePolicy};

/// The kind of statement a [`BuiltStatement`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// SELECT
    Select,
    /// INSERT
    Insert,
    /// UPDATE
    Update,
    /// DELETE
    Delete,
    /// TRUNCATE (or the dialect's equivalent)
    Truncate,
}

/// A named parameter with its resolved value and type.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    /// Placeholder name including the leading colon (`:name`).
    pub name: String,
    /// Value to bind.
    pub value: SqlValue,
    /// Type the value is bound with.
    pub ty: ParamType,
}

/// SQL text plus its ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatement {
    /// What the statement does.
    pub kind: StatementKind,
    /// Final SQL text with `:name` placeholders.
    pub sql: String,
    /// Parameters in placeholder order.
    pub params: Vec<BoundParam>,
}

impl BuiltStatement {
    fn without_params(kind: StatementKind, sql: String) -> Self {
        Self {
            kind,
            sql,
            params: Vec::new(),
        }
    }
}

/// Options of a SELECT: projection, condition, limit and ordering.
///
/// # Example
///
/// ```rust
/// use wings_core::SelectQuery;
///
/// let query = SelectQuery::new(&["id", "name"])
///     .where_clause("active = 1")
///     .order_by("name ASC")
///     .limit(10);
/// assert_eq!(query.fields(), ["id", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    fields: Vec<String>,
    where_clause: Option<String>,
    limit: Option<u64>,
    order_by: Option<String>,
}

impl SelectQuery {
    /// Creates a query projecting `fields` (`*` when empty).
    #[must_use]
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|s| String::from(*s)).collect(),
            ..Self::default()
        }
    }

    /// Creates a query projecting every column.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Sets the raw WHERE condition. It is sanitized, then wrapped in
    /// parentheses.
    #[must_use]
    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    /// Limits the number of rows. Zero means no limit.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the raw ORDER BY text (e.g. `"name DESC"`).
    #[must_use]
    pub fn order_by(mut self, order: impl Into<String>) -> Self {
        self.order_by = Some(order.into());
        self
    }

    /// Returns the projected fields.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Builds statements for a single table in a single dialect.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    table: String,
    dialect: Dialect,
    policy: UnsupportedValuePolicy,
}

impl StatementBuilder {
    /// Creates a builder for `table`, rejecting unsupported values.
    #[must_use]
    pub fn new(table: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            table: table.into(),
            dialect,
            policy: UnsupportedValuePolicy::default(),
        }
    }

    /// Sets the policy for values without a binding type.
    #[must_use]
    pub const fn with_policy(mut self, policy: UnsupportedValuePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the bound table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn quoted_table(&self) -> String {
        self.dialect.quote_identifier(&self.table)
    }

    /// Builds `SELECT <fields> FROM <table> [WHERE (..)] [ORDER BY ..] [LIMIT ..]`.
    #[must_use]
    pub fn select(&self, query: &SelectQuery) -> BuiltStatement {
        let quote = self.dialect.identifier_quote();
        let mut sql = format!(
            "SELECT {} FROM {}",
            select_field_list(query.fields.as_slice(), quote),
            self.quoted_table()
        );

        if let Some(condition) = non_empty(query.where_clause.as_deref()) {
            sql.push_str(" WHERE (");
            sql.push_str(&condition);
            sql.push(')');
        }

        if let Some(order) = non_empty(query.order_by.as_deref()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        if let Some(limit) = query.limit.filter(|n| *n > 0) {
            sql.push(' ');
            sql.push_str(&self.dialect.limit_clause(limit));
        }

        BuiltStatement::without_params(StatementKind::Select, sql)
    }

    /// Builds `INSERT INTO <table> (<fields>) VALUES (<placeholders>)`.
    ///
    /// # Errors
    ///
    /// [`BuildError::InvalidInput`] for empty or unusable field names,
    /// [`BuildError::TypeInference`] for rejected values.
    pub fn insert(&self, data: &Data) -> Result<BuiltStatement, BuildError> {
        let lists = insert_lists(data, self.dialect.identifier_quote())?;
        let params = self.bind_all(data)?;
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quoted_table(),
            lists.fields,
            lists.placeholders
        );
        Ok(BuiltStatement {
            kind: StatementKind::Insert,
            sql,
            params,
        })
    }

    /// Builds `UPDATE <table> SET <assignments> WHERE <condition>`.
    ///
    /// A missing or blank condition becomes `1`: every row is updated.
    ///
    /// # Errors
    ///
    /// Same as [`StatementBuilder::insert`].
    pub fn update(
        &self,
        data: &Data,
        condition: Option<&str>,
    ) -> Result<BuiltStatement, BuildError> {
        let assignments = update_assignments(data, self.dialect.identifier_quote())?;
        let params = self.bind_all(data)?;
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {}",
            self.quoted_table(),
            condition_or_all(condition)
        );
        Ok(BuiltStatement {
            kind: StatementKind::Update,
            sql,
            params,
        })
    }

    /// Builds `DELETE FROM <table> WHERE <condition>`.
    ///
    /// A missing or blank condition becomes `1`: every row is deleted.
    #[must_use]
    pub fn delete(&self, condition: Option<&str>) -> BuiltStatement {
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            self.quoted_table(),
            condition_or_all(condition)
        );
        BuiltStatement::without_params(StatementKind::Delete, sql)
    }

    /// Builds the dialect's statement for emptying the table.
    #[must_use]
    pub fn truncate(&self) -> BuiltStatement {
        BuiltStatement::without_params(
            StatementKind::Truncate,
            self.dialect.truncate_sql(&self.table),
        )
    }

    fn bind_all(&self, data: &Data) -> Result<Vec<BoundParam>, BuildError> {
        data.iter()
            .map(|(field, value)| {
                let value = match value {
                    SqlValue::Text(text) => SqlValue::Text(sanitize(text)),
                    other => other.clone(),
                };
                let (value, ty) = self.policy.resolve(field, value)?;
                Ok(BoundParam {
                    name: format!(":{field}"),
                    value,
                    ty,
                })
            })
            .collect()
    }
}

fn non_empty(fragment: Option<&str>) -> Option<String> {
    fragment.map(sanitize).filter(|s| !s.is_empty())
}

fn condition_or_all(condition: Option<&str>) -> String {
    non_empty(condition).unwrap_or_else(|| String::from("1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ToSqlValue;

    fn users(dialect: Dialect) -> StatementBuilder {
        StatementBuilder::new("users", dialect)
    }

    fn data(pairs: Vec<(&str, SqlValue)>) -> Data {
        pairs
            .into_iter()
            .map(|(k, v)| (String::from(k), v))
            .collect()
    }

    #[test]
    fn test_select_all_columns() {
        let stmt = users(Dialect::MySql).select(&SelectQuery::all());
        assert_eq!(stmt.sql, "SELECT * FROM `users`");
        assert!(stmt.params.is_empty());
        assert_eq!(stmt.kind, StatementKind::Select);
    }

    #[test]
    fn test_select_with_every_clause() {
        let stmt = users(Dialect::Sqlite).select(
            &SelectQuery::new(&["name"])
                .where_clause("id = 1")
                .order_by("name DESC")
                .limit(1),
        );
        assert_eq!(
            stmt.sql,
            "SELECT `name` FROM `users` WHERE (id = 1) ORDER BY name DESC LIMIT 0,1"
        );
    }

    #[test]
    fn test_select_postgres_quoting_and_limit() {
        let stmt = users(Dialect::Postgres).select(&SelectQuery::new(&["id", "name"]).limit(5));
        assert_eq!(
            stmt.sql,
            "SELECT \"id\", \"name\" FROM \"users\" LIMIT 5 OFFSET 0"
        );
    }

    #[test]
    fn test_select_ignores_blank_clauses_and_zero_limit() {
        let query = SelectQuery::all().where_clause("   ").order_by("").limit(0);
        let stmt = users(Dialect::MySql).select(&query);
        assert_eq!(stmt.sql, "SELECT * FROM `users`");
    }

    #[test]
    fn test_insert_binds_in_sorted_order() {
        let stmt = users(Dialect::MySql)
            .insert(&data(vec![
                ("name", "a".to_sql_value()),
                ("id", 1_i64.to_sql_value()),
            ]))
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `users` (`id`, `name`) VALUES (:id, :name)"
        );
        let names: Vec<&str> = stmt.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, [":id", ":name"]);
        assert_eq!(stmt.params[0].ty, ParamType::Integer);
        assert_eq!(stmt.params[1].ty, ParamType::Text);
    }

    #[test]
    fn test_insert_sanitizes_text_values() {
        let stmt = users(Dialect::MySql)
            .insert(&data(vec![("name", r"  O\'Brien ".to_sql_value())]))
            .unwrap();
        assert_eq!(
            stmt.params[0].value,
            SqlValue::Text(String::from("O'Brien"))
        );
    }

    #[test]
    fn test_insert_rejects_float_by_default() {
        let err = users(Dialect::MySql)
            .insert(&data(vec![("price", 9.99_f64.to_sql_value())]))
            .unwrap_err();
        assert!(matches!(err, BuildError::TypeInference { kind: "float", .. }));
    }

    #[test]
    fn test_insert_coerces_float_when_configured() {
        let stmt = users(Dialect::MySql)
            .with_policy(UnsupportedValuePolicy::CoerceToText)
            .insert(&data(vec![("price", 9.5_f64.to_sql_value())]))
            .unwrap();
        assert_eq!(stmt.params[0].value, SqlValue::Text(String::from("9.5")));
        assert_eq!(stmt.params[0].ty, ParamType::Text);
    }

    #[test]
    fn test_update_defaults_to_every_row() {
        let builder = users(Dialect::MySql);
        let values = data(vec![("name", "b".to_sql_value())]);

        let stmt = builder.update(&values, None).unwrap();
        assert_eq!(stmt.sql, "UPDATE `users` SET `name` = :name WHERE 1");

        let stmt = builder.update(&values, Some("  ")).unwrap();
        assert!(stmt.sql.ends_with("WHERE 1"));
    }

    #[test]
    fn test_update_with_condition() {
        let stmt = users(Dialect::Postgres)
            .update(&data(vec![("name", "b".to_sql_value())]), Some("id = 1"))
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE \"users\" SET \"name\" = :name WHERE id = 1"
        );
        assert_eq!(stmt.params.len(), 1);
    }

    #[test]
    fn test_update_empty_is_invalid() {
        assert!(matches!(
            users(Dialect::MySql).update(&Data::new(), Some("id = 1")),
            Err(BuildError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_delete_defaults_to_every_row() {
        let stmt = users(Dialect::MySql).delete(None);
        assert_eq!(stmt.sql, "DELETE FROM `users` WHERE 1");
        assert!(stmt.sql.contains("WHERE 1"));
    }

    #[test]
    fn test_delete_with_condition() {
        let stmt = users(Dialect::Sqlite).delete(Some(" id = 1 "));
        assert_eq!(stmt.sql, "DELETE FROM `users` WHERE id = 1");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(
            users(Dialect::MySql).truncate().sql,
            "TRUNCATE TABLE `users`"
        );
        let stmt = users(Dialect::Sqlite).truncate();
        assert_eq!(stmt.sql, "DELETE FROM `users`");
    }
}

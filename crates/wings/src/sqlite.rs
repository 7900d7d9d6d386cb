//! SQLite connection backed by `sqlx`.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as _, ConnectOptions as _, Executor as _, Row as _, Sqlite};
use sqlx::{Statement as _, TypeInfo as _, ValueRef as _};
use tracing::debug;
use wings_core::SqlValue;

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::scope::Scope;

/// A single `SqliteConnection`.
///
/// SQLite has no named-parameter support in `sqlx`, so `:name` placeholders
/// are rewritten to numbered `?N` parameters at prepare time. A name used
/// more than once maps to the same number.
#[derive(Debug)]
pub struct SqliteDriver {
    conn: SqliteConnection,
    last_insert_id: i64,
}

impl SqliteDriver {
    /// Wraps an already open connection.
    pub const fn from_connection(conn: SqliteConnection) -> Self {
        Self {
            conn,
            last_insert_id: 0,
        }
    }
}

#[async_trait]
impl Connection for SqliteDriver {
    async fn connect(config: &ConnectionConfig) -> Result<Self, sqlx::Error> {
        if config.username.is_some() || config.password.is_some() {
            debug!(dsn = %config.dsn, "SQLite ignores connection credentials");
        }
        let conn = SqliteConnectOptions::from_str(&config.dsn)?
            .connect()
            .await?;
        Ok(Self::from_connection(conn))
    }

    fn driver_name(&self) -> &str {
        "sqlite"
    }

    async fn prepare(&mut self, sql: &str) -> Result<Scope, sqlx::Error> {
        let (compiled, placeholders) = compile_named(sql);
        let columns = {
            let statement = (&mut self.conn).prepare(compiled.as_str()).await?;
            statement
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect()
        };
        Ok(Scope::prepared(sql, compiled, placeholders, columns))
    }

    async fn execute(&mut self, scope: &mut Scope) -> Result<bool, sqlx::Error> {
        let values = scope
            .positional_values()
            .map_err(|err| sqlx::Error::Encode(err.into()))?;
        let sql = scope.compiled_sql().to_string();

        let mut query = sqlx::query(&sql);
        for value in values {
            query = bind_value(query, value);
        }

        if scope.returns_rows() {
            let rows = query.fetch_all(&mut self.conn).await?;
            let decoded = rows.iter().map(decode_row).collect::<Result<Vec<_>, _>>()?;
            scope.record_rows(decoded);
        } else {
            let result = query.execute(&mut self.conn).await?;
            self.last_insert_id = result.last_insert_rowid();
            scope.record_affected(result.rows_affected());
        }
        Ok(true)
    }

    fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    async fn begin(&mut self) -> Result<(), sqlx::Error> {
        sqlx::query("BEGIN").execute(&mut self.conn).await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), sqlx::Error> {
        sqlx::query("COMMIT").execute(&mut self.conn).await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), sqlx::Error> {
        sqlx::query("ROLLBACK").execute(&mut self.conn).await?;
        Ok(())
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        sqlx::Connection::close(self.conn).await
    }
}

/// Rewrites `:name` placeholders to `?N`, returning the new SQL and the
/// placeholder names in parameter order.
///
/// Quoted strings, quoted identifiers, comments and `::` casts are copied
/// unchanged.
pub fn compile_named(sql: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                out.push(c);
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                out.push(c);
                let mut previous = '\0';
                for inner in chars.by_ref() {
                    out.push(inner);
                    if previous == '*' && inner == '/' {
                        break;
                    }
                    previous = inner;
                }
            }
            ':' if chars.peek() == Some(&':') => {
                out.push_str("::");
                chars.next();
            }
            ':' if chars
                .peek()
                .is_some_and(|next| next.is_ascii_alphabetic() || *next == '_') =>
            {
                let mut name = String::from(":");
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let index = match names.iter().position(|n| *n == name) {
                    Some(index) => index,
                    None => {
                        names.push(name);
                        names.len() - 1
                    }
                };
                out.push('?');
                out.push_str(&(index + 1).to_string());
            }
            _ => out.push(c),
        }
    }

    (out, names)
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SqlValue,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

fn decode_row(row: &SqliteRow) -> Result<Vec<SqlValue>, sqlx::Error> {
    (0..row.len())
        .map(|index| decode_value(row, index))
        .collect()
}

fn decode_value(row: &SqliteRow, index: usize) -> Result<SqlValue, sqlx::Error> {
    let type_name = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(SqlValue::Null);
        }
        raw.type_info().name().to_string()
    };

    match type_name.as_str() {
        "INTEGER" => row.try_get::<i64, _>(index).map(SqlValue::Int),
        "REAL" => row.try_get::<f64, _>(index).map(SqlValue::Float),
        "BLOB" => row.try_get::<Vec<u8>, _>(index).map(SqlValue::Blob),
        _ => row.try_get::<String, _>(index).map(SqlValue::Text),
    }
}

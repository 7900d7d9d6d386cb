//! Table sessions.
//!
//! A [`Session`] owns one connection and is bound to one table. Every
//! operation builds its statement with [`StatementBuilder`], prepares and
//! executes it through the [`Connection`], and replaces the session's current
//! [`Scope`] with the result.
//!
//! Two failure channels are kept apart:
//!
//! - reads and accessors on a closed session return `None` or `false`, and a
//!   SELECT whose execution fails returns `Ok(None)`;
//! - writes on a closed session, build errors and driver failures return
//!   [`WingsError`].

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use wings_core::{
    sanitize, BoundParam, Data, Dialect, SelectQuery, StatementBuilder, ToSqlValue,
    UnsupportedValuePolicy,
};

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::{Operation, Result, WingsError};
use crate::row::{FetchMode, Row};
use crate::scope::Scope;
use crate::sqlite::SqliteDriver;

/// A connection bound to a single table.
///
/// # Example
///
/// ```rust,no_run
/// use wings::{ConnectionConfig, FetchMode, SelectQuery, Session};
///
/// # async fn example() -> wings::Result<()> {
/// let config = ConnectionConfig::new("sqlite://app.db?mode=rwc");
/// let mut users: Session = Session::open(&config, "users").await?;
///
/// users.insert([("id", 1_i64)]).await?;
/// if let Some(session) = users.select(&SelectQuery::new(&["id"]).limit(1)).await? {
///     let row = session.fetch(FetchMode::Assoc);
///     println!("{row:?}");
/// }
/// users.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session<C: Connection = SqliteDriver> {
    conn: Option<C>,
    builder: Option<StatementBuilder>,
    dialect: Dialect,
    scope: Option<Scope>,
    queries: u64,
    is_select: bool,
}

impl<C: Connection> Session<C> {
    /// Connects with `config` and binds the session to `table`.
    ///
    /// # Errors
    ///
    /// [`WingsError::Connection`] when the handshake fails.
    pub async fn open(config: &ConnectionConfig, table: impl Into<String>) -> Result<Self> {
        let conn = C::connect(config)
            .await
            .map_err(|source| WingsError::Connection {
                dsn: config.dsn.clone(),
                source,
            })?;
        Ok(Self::with_connection(conn, table, config.unsupported_values))
    }

    /// Binds an already open connection to `table`.
    pub fn with_connection(
        conn: C,
        table: impl Into<String>,
        policy: UnsupportedValuePolicy,
    ) -> Self {
        let dialect = Dialect::from_driver(conn.driver_name());
        let builder = StatementBuilder::new(table, dialect).with_policy(policy);
        info!(table = %builder.table(), dialect = %dialect, "Session opened");
        Self {
            conn: Some(conn),
            builder: Some(builder),
            dialect,
            scope: None,
            queries: 0,
            is_select: false,
        }
    }

    /// Returns the bound table, or `None` once closed.
    pub fn table(&self) -> Option<&str> {
        self.builder.as_ref().map(StatementBuilder::table)
    }

    /// Returns the dialect resolved when the session opened.
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns `true` until the session is closed.
    pub const fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Returns `true` right after a successful read.
    pub const fn is_select(&self) -> bool {
        self.is_select
    }

    /// Runs a SELECT and returns the session for chained fetches.
    ///
    /// Returns `Ok(None)` when the session is closed or the statement fails
    /// to execute.
    ///
    /// # Errors
    ///
    /// [`WingsError::Statement`] when the statement cannot be prepared.
    pub async fn select(&mut self, query: &SelectQuery) -> Result<Option<&mut Self>> {
        if self.run_select(query).await? {
            Ok(Some(self))
        } else {
            Ok(None)
        }
    }

    /// Runs a SELECT and returns the raw result scope.
    ///
    /// # Errors
    ///
    /// Same as [`Session::select`].
    pub async fn select_raw(&mut self, query: &SelectQuery) -> Result<Option<&mut Scope>> {
        if self.run_select(query).await? {
            Ok(self.scope.as_mut())
        } else {
            Ok(None)
        }
    }

    async fn run_select(&mut self, query: &SelectQuery) -> Result<bool> {
        let Ok(builder) = self.builder() else {
            return Ok(false);
        };
        let statement = builder.select(query);
        let operation = Operation::from(statement.kind);

        match self.run(operation, &statement.sql, statement.params).await? {
            Ok(true) => {
                self.queries += 1;
                self.is_select = true;
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(err) => {
                warn!(table = %self.table_name(), error = %err, "Select failed");
                Ok(false)
            }
        }
    }

    /// Returns the next row of the last read in `mode`.
    ///
    /// `None` when the session is closed, the last operation was not a read,
    /// or the rows are exhausted.
    pub fn fetch(&mut self, mode: FetchMode) -> Option<Row> {
        if !self.is_open() || !self.is_select {
            return None;
        }
        self.scope.as_mut()?.fetch_row(mode)
    }

    /// Returns every remaining row of the last read in `mode`.
    pub fn fetch_all(&mut self, mode: FetchMode) -> Vec<Row> {
        std::iter::from_fn(|| self.fetch(mode)).collect()
    }

    /// Deserializes the next row of the last read into `T`.
    ///
    /// # Errors
    ///
    /// [`WingsError::Statement`] tagged `fetch` when the row does not fit `T`.
    pub fn fetch_as<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        if !self.is_open() || !self.is_select {
            return Ok(None);
        }
        let Some(record) = self.scope.as_mut().and_then(Scope::next_record) else {
            return Ok(None);
        };
        serde_json::from_value(record.to_json())
            .map(Some)
            .map_err(|err| WingsError::statement(self.table_name(), Operation::Fetch, err))
    }

    /// Inserts one row. Fields are written in sorted order.
    ///
    /// # Errors
    ///
    /// [`WingsError::NotFlying`] on a closed session,
    /// [`WingsError::InvalidInput`] for empty data,
    /// [`WingsError::TypeInference`] for rejected values and
    /// [`WingsError::Statement`] when the driver fails.
    pub async fn insert<I, K, V>(&mut self, data: I) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToSqlValue,
    {
        let data = collect_data(data);
        let statement = self.builder()?.insert(&data)?;
        self.write(Operation::from(statement.kind), &statement.sql, statement.params)
            .await
    }

    /// Updates the rows matching `condition`.
    ///
    /// A missing or blank condition updates every row.
    ///
    /// # Errors
    ///
    /// Same as [`Session::insert`].
    pub async fn update<I, K, V>(&mut self, data: I, condition: Option<&str>) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToSqlValue,
    {
        let data = collect_data(data);
        let statement = self.builder()?.update(&data, condition)?;
        self.write(Operation::from(statement.kind), &statement.sql, statement.params)
            .await
    }

    /// Deletes the rows matching `condition` inside a transaction.
    ///
    /// A missing or blank condition deletes every row. Returns the number of
    /// deleted rows, or `None` when nothing was deleted. Calling this while a
    /// transaction is already open on the connection is not supported.
    ///
    /// # Errors
    ///
    /// [`WingsError::NotFlying`] on a closed session, and
    /// [`WingsError::Statement`] when the driver fails. The transaction is
    /// rolled back before the error is returned.
    pub async fn delete(&mut self, condition: Option<&str>) -> Result<Option<u64>> {
        let statement = self.builder()?.delete(condition);
        let operation = Operation::from(statement.kind);
        let table = self.table_name();

        self.conn_mut()?
            .begin()
            .await
            .map_err(|err| WingsError::statement(&table, operation, err))?;

        let outcome = match self.run(operation, &statement.sql, statement.params).await {
            Ok(Ok(executed)) => self
                .conn_mut()?
                .commit()
                .await
                .map(|()| executed)
                .map_err(|err| WingsError::statement(&table, operation, err)),
            Ok(Err(err)) => Err(WingsError::statement(&table, operation, err)),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(executed) => {
                let affected = self.scope.as_ref().map_or(0, Scope::row_count);
                if executed && affected > 0 {
                    self.queries += 1;
                    Ok(Some(affected))
                } else {
                    Ok(None)
                }
            }
            Err(err) => {
                if let Some(conn) = self.conn.as_mut() {
                    if let Err(rollback_err) = conn.rollback().await {
                        warn!(table = %table, error = %rollback_err, "Delete rollback failed");
                    }
                }
                Err(err)
            }
        }
    }

    /// Empties the table.
    ///
    /// # Errors
    ///
    /// [`WingsError::NotFlying`] on a closed session, and
    /// [`WingsError::Statement`] when the driver fails.
    pub async fn truncate(&mut self) -> Result<bool> {
        let statement = self.builder()?.truncate();
        self.raw(Operation::from(statement.kind), &statement.sql)
            .await
    }

    /// Runs a raw statement without parameters.
    ///
    /// The text is sanitized like a WHERE fragment. A statement that returns
    /// rows can be fetched afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`Session::truncate`].
    pub async fn query(&mut self, sql: &str) -> Result<bool> {
        self.builder()?;
        self.raw(Operation::Query, &sanitize(sql)).await
    }

    /// Row count of the current scope: rows returned by a read, rows affected
    /// by a write. `Some(0)` before any statement, `None` once closed.
    pub fn count(&self) -> Option<u64> {
        self.is_open()
            .then(|| self.scope.as_ref().map_or(0, Scope::row_count))
    }

    /// Identifier generated by the most recent insert.
    pub fn last_id(&self) -> Option<i64> {
        self.conn.as_ref().map(Connection::last_insert_id)
    }

    /// Number of statements this session executed successfully.
    pub fn queries(&self) -> Option<u64> {
        self.is_open().then_some(self.queries)
    }

    /// Rolls back the connection's active transaction.
    ///
    /// Returns `false` when the session is closed or the rollback fails.
    pub async fn rollback(&mut self) -> bool {
        let Some(conn) = self.conn.as_mut() else {
            return false;
        };
        match conn.rollback().await {
            Ok(()) => true,
            Err(err) => {
                warn!(table = %self.table_name(), error = %err, "Rollback failed");
                false
            }
        }
    }

    /// Dumps the current scope's statement and bound parameters.
    ///
    /// `None` when the session is closed or has not run a statement yet.
    pub fn debug(&self) -> Option<String> {
        self.conn.as_ref()?;
        self.scope.as_ref().map(Scope::dump)
    }

    /// Releases the connection and resets the session.
    ///
    /// Closing an already closed session does nothing.
    pub async fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let table = self.table_name();
        self.builder = None;
        self.scope = None;
        self.queries = 0;
        self.is_select = false;

        match conn.close().await {
            Ok(()) => info!(table = %table, "Session closed"),
            Err(err) => warn!(table = %table, error = %err, "Error while closing connection"),
        }
    }

    fn builder(&self) -> Result<&StatementBuilder> {
        match (&self.conn, &self.builder) {
            (Some(_), Some(builder)) => Ok(builder),
            _ => Err(WingsError::NotFlying),
        }
    }

    fn conn_mut(&mut self) -> Result<&mut C> {
        self.conn.as_mut().ok_or(WingsError::NotFlying)
    }

    fn table_name(&self) -> String {
        self.table().map(String::from).unwrap_or_default()
    }

    /// Prepares, binds and executes `sql`, storing the scope.
    ///
    /// Prepare failures are returned as errors; execution failures are
    /// returned in the inner result so each operation can pick its channel.
    async fn run(
        &mut self,
        operation: Operation,
        sql: &str,
        params: Vec<BoundParam>,
    ) -> Result<std::result::Result<bool, sqlx::Error>> {
        self.scope = None;
        self.is_select = false;
        let table = self.table_name();
        let conn = self.conn_mut()?;

        debug!(table = %table, operation = %operation, sql = %sql, "Executing statement");
        let mut scope = conn
            .prepare(sql)
            .await
            .map_err(|err| WingsError::statement(&table, operation, err))?;
        for BoundParam { name, value, ty } in params {
            scope.bind(name, value, ty);
        }

        let outcome = conn.execute(&mut scope).await;
        self.scope = Some(scope);
        Ok(outcome)
    }

    async fn write(
        &mut self,
        operation: Operation,
        sql: &str,
        params: Vec<BoundParam>,
    ) -> Result<bool> {
        match self.run(operation, sql, params).await? {
            Ok(true) => {
                self.queries += 1;
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(err) => Err(WingsError::statement(self.table_name(), operation, err)),
        }
    }

    async fn raw(&mut self, operation: Operation, sql: &str) -> Result<bool> {
        let executed = self.write(operation, sql, Vec::new()).await?;
        self.is_select = executed && self.scope.as_ref().is_some_and(Scope::returns_rows);
        Ok(executed)
    }
}

impl<C: Connection> Drop for Session<C> {
    fn drop(&mut self) {
        if self.conn.is_some() {
            debug!(table = %self.table_name(), "Session dropped while open, releasing connection");
        }
    }
}

fn collect_data<I, K, V>(data: I) -> Data
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToSqlValue,
{
    data.into_iter()
        .map(|(field, value)| (field.into(), value.to_sql_value()))
        .collect()
}

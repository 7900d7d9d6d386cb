//! The driver seam a session executes through.

use async_trait::async_trait;

use crate::config::ConnectionConfig;
use crate::scope::Scope;

/// A single open database connection.
///
/// A session owns exactly one connection and calls it strictly in sequence.
/// Implementations prepare statements with `:name` placeholders, execute
/// prepared scopes and expose the transaction primitives `delete` needs.
#[async_trait]
pub trait Connection: Send + Sized {
    /// Opens a connection with `config`.
    async fn connect(config: &ConnectionConfig) -> Result<Self, sqlx::Error>;

    /// Driver identifier used to resolve the dialect (`"sqlite"`, `"mysql"`, ...).
    fn driver_name(&self) -> &str;

    /// Prepares `sql`, which may contain `:name` placeholders.
    async fn prepare(&mut self, sql: &str) -> Result<Scope, sqlx::Error>;

    /// Executes a prepared scope with its bound parameters, buffering any rows
    /// into the scope. Returns `true` when the driver reports success.
    async fn execute(&mut self, scope: &mut Scope) -> Result<bool, sqlx::Error>;

    /// Identifier generated by the most recent insert.
    fn last_insert_id(&self) -> i64;

    /// Starts a transaction.
    async fn begin(&mut self) -> Result<(), sqlx::Error>;

    /// Commits the active transaction.
    async fn commit(&mut self) -> Result<(), sqlx::Error>;

    /// Rolls back the active transaction.
    async fn rollback(&mut self) -> Result<(), sqlx::Error>;

    /// Closes the connection.
    async fn close(self) -> Result<(), sqlx::Error>;
}

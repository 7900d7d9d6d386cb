//! # wings
//!
//! Per-table active-record sessions over parameterized SQL.
//!
//! This crate provides:
//! - `Session` bound to one table, owning one connection
//! - `SessionRegistry` keeping one open session per table
//! - `Connection`, the async driver seam, with a SQLite driver on `sqlx`
//! - Rows fetched as maps, positional values, records or serde types
//!
//! ## Quick Start
//!
//! ```ignore
//! use wings::{ConnectionConfig, FetchMode, SelectQuery, Session};
//!
//! async fn example() -> wings::Result<()> {
//!     let config = ConnectionConfig::new("sqlite://app.db?mode=rwc");
//!     let mut users: Session = Session::open(&config, "users").await?;
//!
//!     users.insert([("id", 1_i64)]).await?;
//!
//!     if let Some(session) = users
//!         .select(&SelectQuery::new(&["name"]).where_clause("id = 1").limit(1))
//!         .await?
//!     {
//!         let row = session.fetch(FetchMode::Assoc);
//!     }
//!
//!     users.update([("name", "b")], Some("id = 1")).await?;
//!     let deleted = users.delete(Some("id = 1")).await?;
//!
//!     users.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure channels
//!
//! Reads and accessors on a closed session return `None` or `false`, and a
//! SELECT that fails while executing returns `Ok(None)`. Writes on a closed
//! session, invalid input and driver failures return a [`WingsError`].
//!
//! ## Shared sessions
//!
//! ```ignore
//! use wings::{ConnectionConfig, SessionRegistry};
//!
//! let registry: SessionRegistry = SessionRegistry::new(ConnectionConfig::new("sqlite://app.db"));
//! let users = registry.session("users").await?;
//! users.lock().await.truncate().await?;
//! registry.close_all().await;
//! ```

mod config;
mod connection;
mod error;
mod registry;
mod row;
mod scope;
mod session;
pub mod sqlite;

pub use config::ConnectionConfig;
pub use connection::Connection;
pub use error::{Operation, Result, StatementSource, WingsError};
pub use registry::{SessionRegistry, SharedSession};
pub use row::{FetchMode, Record, Row};
pub use scope::{Scope, UnboundPlaceholder};
pub use session::Session;
pub use sqlite::SqliteDriver;

// Re-export commonly used types from wings-core
pub use wings_core::{
    BoundParam, Data, Dialect, ParamType, SelectQuery, SqlValue, ToSqlValue, UnsupportedValuePolicy,
};

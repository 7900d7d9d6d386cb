//! # wings-core
//!
//! Dialect resolution and parameterized statement building for per-table
//! sessions.
//!
//! This crate provides:
//! - A dialect resolver mapping a driver identifier to its quoting rules
//! - Pure builders turning field/value maps into field, placeholder and
//!   assignment lists
//! - A [`StatementBuilder`] composing complete SELECT / INSERT / UPDATE /
//!   DELETE / TRUNCATE statements for one table
//! - Parameter type inference with an explicit policy for unsupported values
//!
//! ## Building statements
//!
//! ```rust
//! use wings_core::{Data, Dialect, SelectQuery, StatementBuilder, ToSqlValue};
//!
//! let builder = StatementBuilder::new("users", Dialect::from_driver("mysql"));
//!
//! let mut data = Data::new();
//! data.insert(String::from("name"), "alice".to_sql_value());
//! data.insert(String::from("id"), 1_i64.to_sql_value());
//!
//! let insert = builder.insert(&data).unwrap();
//! assert_eq!(
//!     insert.sql,
//!     "INSERT INTO `users` (`id`, `name`) VALUES (:id, :name)"
//! );
//!
//! let select = builder.select(&SelectQuery::new(&["name"]).where_clause("id = 1").limit(1));
//! assert_eq!(
//!     select.sql,
//!     "SELECT `name` FROM `users` WHERE (id = 1) LIMIT 0,1"
//! );
//! ```
//!
//! ## Trust boundary
//!
//! Values are always bound as parameters. WHERE and ORDER BY fragments are
//! caller-supplied SQL: they are sanitized (escape artifacts stripped, trimmed)
//! but never parsed, so callers own the injection safety of anything they do
//! not bind.

pub mod builder;
pub mod dialect;
pub mod error;
pub mod value;

pub use builder::{
    insert_lists, quote_identifier, sanitize, select_field_list, update_assignments, BoundParam,
    BuiltStatement, Data, InsertLists, SelectQuery, StatementBuilder, StatementKind,
};
pub use dialect::{resolve_quote, Dialect};
pub use error::BuildError;
pub use value::{infer_param_type, ParamType, SqlValue, ToSqlValue, UnsupportedValuePolicy};

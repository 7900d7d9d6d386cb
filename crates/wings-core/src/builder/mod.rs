//! Statement builder.
//!
//! Two layers: pure list builders ([`insert_lists`], [`update_assignments`],
//! [`select_field_list`]) that only know a quote character, and a
//! [`StatementBuilder`] bound to one table and dialect that composes complete
//! parameterized statements from them.
//!
//! # Example
//!
//! ```rust
//! use wings_core::builder::{update_assignments, Data};
//! use wings_core::ToSqlValue;
//!
//! let mut data = Data::new();
//! data.insert(String::from("name"), "b".to_sql_value());
//! data.insert(String::from("email"), "b@example.com".to_sql_value());
//!
//! assert_eq!(
//!     update_assignments(&data, '"').unwrap(),
//!     "\"email\" = :email, \"name\" = :name"
//! );
//! ```

mod fields;
mod statement;

pub use fields::{
    insert_lists, quote_identifier, sanitize, select_field_list, update_assignments, Data,
    InsertLists,
};
pub use statement::{BoundParam, BuiltStatement, SelectQuery, StatementBuilder, StatementKind};

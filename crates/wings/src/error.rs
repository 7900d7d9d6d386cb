//! Error types for table sessions.

use thiserror::Error;
use wings_core::{BuildError, StatementKind};

/// The session operation a statement error was raised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `select` / `select_raw`
    Select,
    /// `fetch_as`
    Fetch,
    /// `insert`
    Insert,
    /// `update`
    Update,
    /// `delete`
    Delete,
    /// `truncate`
    Truncate,
    /// `query` (raw statement)
    Query,
}

impl Operation {
    /// Returns the lowercase operation name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Fetch => "fetch",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Truncate => "truncate",
            Self::Query => "query",
        }
    }
}

impl From<StatementKind> for Operation {
    fn from(kind: StatementKind) -> Self {
        match kind {
            StatementKind::Select => Self::Select,
            StatementKind::Insert => Self::Insert,
            StatementKind::Update => Self::Update,
            StatementKind::Delete => Self::Delete,
            StatementKind::Truncate => Self::Truncate,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What failed underneath a statement error.
#[derive(Debug, Error)]
pub enum StatementSource {
    /// The driver failed to prepare or execute the statement.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A fetched row did not match the requested shape.
    #[error("row does not match the requested type: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Session errors.
#[derive(Debug, Error)]
pub enum WingsError {
    /// The connection handshake failed; no session was produced.
    #[error("failed to connect to '{dsn}': {source}")]
    Connection {
        /// DSN the connection was attempted with.
        dsn: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A write was attempted on a closed or never-opened session.
    #[error("session is not flying: open a new session for the table")]
    NotFlying,

    /// A statement failed at the driver.
    #[error("error while running {operation} on table [{table}]: {source}")]
    Statement {
        /// Table the session is bound to.
        table: String,
        /// Operation that failed.
        operation: Operation,
        /// Underlying failure.
        #[source]
        source: StatementSource,
    },

    /// Input that cannot produce well-formed SQL.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A value with no binding type under the reject policy.
    #[error("cannot infer a parameter type for {kind} value of field '{field}'")]
    TypeInference {
        /// Field the value was bound to.
        field: String,
        /// Runtime kind of the value.
        kind: &'static str,
    },
}

impl WingsError {
    /// Creates a statement error for `table` and `operation`.
    pub fn statement(
        table: impl Into<String>,
        operation: Operation,
        source: impl Into<StatementSource>,
    ) -> Self {
        Self::Statement {
            table: table.into(),
            operation,
            source: source.into(),
        }
    }

    /// Returns the failing operation for statement errors.
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Statement { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

impl From<BuildError> for WingsError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::InvalidInput(message) => Self::InvalidInput(message),
            BuildError::TypeInference { field, kind } => Self::TypeInference { field, kind },
        }
    }
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, WingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_error_names_table_and_operation() {
        let err = WingsError::statement(
            "users",
            Operation::Insert,
            sqlx::Error::Protocol(String::from("boom")),
        );
        let message = err.to_string();
        assert!(message.contains("insert"), "{message}");
        assert!(message.contains("[users]"), "{message}");
        assert_eq!(err.operation(), Some(Operation::Insert));
    }

    #[test]
    fn test_build_errors_convert() {
        let err: WingsError = BuildError::invalid_input("empty").into();
        assert!(matches!(err, WingsError::InvalidInput(ref m) if m == "empty"));

        let err: WingsError = BuildError::TypeInference {
            field: String::from("price"),
            kind: "float",
        }
        .into();
        assert!(matches!(
            err,
            WingsError::TypeInference { ref field, kind: "float" } if field == "price"
        ));
    }

    #[test]
    fn test_operation_from_statement_kind() {
        assert_eq!(Operation::from(StatementKind::Select), Operation::Select);
        assert_eq!(
            Operation::from(StatementKind::Truncate),
            Operation::Truncate
        );
        assert_eq!(Operation::from(StatementKind::Delete).as_str(), "delete");
    }

    #[test]
    fn test_not_flying_has_no_operation() {
        assert_eq!(WingsError::NotFlying.operation(), None);
    }
}

//! Statement building errors.

use crate::value::SqlValue;

/// An error raised while turning caller input into a statement.
///
/// Both variants fail before anything reaches a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The caller supplied input that cannot produce well-formed SQL
    /// (an empty field set, or a field name unusable as a placeholder).
    InvalidInput(String),
    /// A value of a kind the binding layer does not support was supplied
    /// while the policy is [`Reject`](crate::UnsupportedValuePolicy::Reject).
    TypeInference {
        /// Field the value was bound to.
        field: String,
        /// Runtime kind of the rejected value.
        kind: &'static str,
    },
}

impl BuildError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a type inference error for `value` bound to `field`.
    #[must_use]
    pub fn type_inference(field: impl Into<String>, value: &SqlValue) -> Self {
        Self::TypeInference {
            field: field.into(),
            kind: value.kind(),
        }
    }
}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::TypeInference { field, kind } => write!(
                f,
                "cannot infer a parameter type for {kind} value of field '{field}'"
            ),
        }
    }
}

impl std::error::Error for BuildError {}

//! SQL values, parameter type inference and the unsupported-value policy.

use crate::error::BuildError;

/// A value bound to a statement parameter or read back from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Bound as a boolean; most drivers store it as 0/1.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// Double precision float. Has no binding type of its own.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes. Has no binding type of its own.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the runtime kind of the value, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    /// Renders the value as plain text (no quoting).
    ///
    /// Blobs render as uppercase hex, NULL as an empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => String::from(if *b { "1" } else { "0" }),
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => s.clone(),
            Self::Blob(b) => b.iter().map(|byte| format!("{byte:02X}")).collect(),
        }
    }
}

/// The parameter type a value is bound with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Integer parameter.
    Integer,
    /// Text parameter.
    Text,
    /// Boolean parameter.
    Boolean,
    /// NULL parameter.
    Null,
    /// No binding type exists for the value.
    Unsupported,
}

impl ParamType {
    /// Returns the lowercase name used in debug dumps.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Unsupported => "unsupported",
        }
    }
}

impl core::fmt::Display for ParamType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a value by its runtime kind.
///
/// Floats and blobs have no binding type and classify as
/// [`ParamType::Unsupported`].
#[must_use]
pub const fn infer_param_type(value: &SqlValue) -> ParamType {
    match value {
        SqlValue::Int(_) => ParamType::Integer,
        SqlValue::Text(_) => ParamType::Text,
        SqlValue::Bool(_) => ParamType::Boolean,
        SqlValue::Null => ParamType::Null,
        SqlValue::Float(_) | SqlValue::Blob(_) => ParamType::Unsupported,
    }
}

/// What to do with a value whose type is [`ParamType::Unsupported`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnsupportedValuePolicy {
    /// Fail with [`BuildError::TypeInference`].
    #[default]
    Reject,
    /// Bind the value's text rendering as [`ParamType::Text`].
    CoerceToText,
}

impl UnsupportedValuePolicy {
    /// Resolves the value and type bound for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TypeInference`] when the value is unsupported and
    /// the policy is [`UnsupportedValuePolicy::Reject`].
    pub fn resolve(
        self,
        field: &str,
        value: SqlValue,
    ) -> Result<(SqlValue, ParamType), BuildError> {
        match (infer_param_type(&value), self) {
            (ParamType::Unsupported, Self::Reject) => {
                Err(BuildError::type_inference(field, &value))
            }
            (ParamType::Unsupported, Self::CoerceToText) => {
                Ok((SqlValue::Text(value.to_text()), ParamType::Text))
            }
            (ty, _) => Ok((value, ty)),
        }
    }
}

/// Conversion into a [`SqlValue`] for binding.
pub trait ToSqlValue {
    /// Converts `self`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

macro_rules! to_sql_value_via {
    ($variant:ident($target:ty): $($source:ty),+) => {
        $(
            impl ToSqlValue for $source {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::$variant(<$target>::from(self))
                }
            }
        )+
    };
}

to_sql_value_via!(Bool(bool): bool);
to_sql_value_via!(Int(i64): i64, i32, i16, u32, u16, u8);
to_sql_value_via!(Float(f64): f64, f32);
to_sql_value_via!(Text(String): String, &str);
to_sql_value_via!(Blob(Vec<u8>): Vec<u8>, &[u8]);

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

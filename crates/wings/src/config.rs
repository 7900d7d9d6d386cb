//! Connection configuration.

use serde::Deserialize;
use wings_core::UnsupportedValuePolicy;

/// Everything a session needs to open its connection.
///
/// A session reads the config once while opening; editing a config afterwards
/// never affects sessions that are already open.
///
/// # Example
///
/// ```rust
/// use wings::{ConnectionConfig, UnsupportedValuePolicy};
///
/// let config = ConnectionConfig::new("sqlite::memory:")
///     .authenticate("app", "secret")
///     .unsupported_values(UnsupportedValuePolicy::CoerceToText);
/// assert_eq!(config.username.as_deref(), Some("app"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    /// Driver connection string, e.g. `sqlite://app.db?mode=rwc`.
    pub dsn: String,
    /// Database user, for drivers that authenticate.
    #[serde(default)]
    pub username: Option<String>,
    /// Database password, for drivers that authenticate.
    #[serde(default)]
    pub password: Option<String>,
    /// What to do with values that have no binding type.
    #[serde(default)]
    pub unsupported_values: UnsupportedValuePolicy,
}

impl ConnectionConfig {
    /// Creates a config for `dsn` without credentials.
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    /// Sets the credentials used by the connection handshake.
    #[must_use]
    pub fn authenticate(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the policy for values without a binding type.
    #[must_use]
    pub const fn unsupported_values(mut self, policy: UnsupportedValuePolicy) -> Self {
        self.unsupported_values = policy;
        self
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dsn", &self.dsn)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("unsupported_values", &self.unsupported_values)
            .finish()
    }
}

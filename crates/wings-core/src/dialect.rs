//! SQL dialect resolution.
//!
//! A session learns its dialect once, from the driver identifier of its
//! connection. The dialect decides the identifier quote character and the few
//! clauses whose syntax differs between databases.

use crate::builder::quote_identifier;

/// Database dialects distinguished by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// PostgreSQL.
    Postgres,
    /// Microsoft SQL Server.
    SqlServer,
    /// Sybase.
    Sybase,
    /// MySQL / MariaDB.
    MySql,
    /// SQLite.
    Sqlite,
    /// Any driver not listed above.
    Generic,
}

impl Dialect {
    /// Resolves the dialect from a driver identifier.
    ///
    /// Matching is case-insensitive. Unknown identifiers resolve to
    /// [`Dialect::Generic`] rather than failing.
    #[must_use]
    pub fn from_driver(driver: &str) -> Self {
        match driver.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgsql" => Self::Postgres,
            "sqlserver" | "sqlsrv" | "mssql" | "dblib" => Self::SqlServer,
            "sybase" => Self::Sybase,
            "mysql" => Self::MySql,
            "sqlite" | "sqlite2" | "sqlite3" => Self::Sqlite,
            _ => Self::Generic,
        }
    }

    /// Returns the name of the dialect.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::SqlServer => "sqlserver",
            Self::Sybase => "sybase",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Generic => "generic",
        }
    }

    /// Returns the identifier quote character.
    #[must_use]
    pub const fn identifier_quote(self) -> char {
        match self {
            Self::Postgres | Self::SqlServer | Self::Sybase => '"',
            Self::MySql | Self::Sqlite | Self::Generic => '`',
        }
    }

    /// Quotes an identifier with this dialect's quote character.
    #[must_use]
    pub fn quote_identifier(self, name: &str) -> String {
        quote_identifier(name, self.identifier_quote())
    }

    /// Renders the row limit clause for a SELECT.
    #[must_use]
    pub fn limit_clause(self, limit: u64) -> String {
        match self {
            Self::Postgres => format!("LIMIT {limit} OFFSET 0"),
            _ => format!("LIMIT 0,{limit}"),
        }
    }

    /// Renders the statement that empties `table`.
    ///
    /// SQLite has no `TRUNCATE`; an unconditional `DELETE` is its equivalent.
    #[must_use]
    pub fn truncate_sql(self, table: &str) -> String {
        let table = self.quote_identifier(table);
        match self {
            Self::Sqlite => format!("DELETE FROM {table}"),
            _ => format!("TRUNCATE TABLE {table}"),
        }
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the identifier quote character for a driver identifier.
///
/// `"` for PostgreSQL, SQL Server and Sybase; `` ` `` for MySQL, SQLite and
/// any unrecognized driver.
#[must_use]
pub fn resolve_quote(driver: &str) -> char {
    Dialect::from_driver(driver).identifier_quote()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_quote_drivers() {
        for driver in [
            "postgres",
            "pgsql",
            "sqlserver",
            "sqlsrv",
            "mssql",
            "dblib",
            "sybase",
        ] {
            assert_eq!(resolve_quote(driver), '"', "driver {driver}");
        }
    }

    #[test]
    fn test_backtick_drivers() {
        for driver in ["mysql", "sqlite", "sqlite2", "sqlite3"] {
            assert_eq!(resolve_quote(driver), '`', "driver {driver}");
        }
    }

    #[test]
    fn test_unknown_driver_falls_back_to_backtick() {
        assert_eq!(resolve_quote("oracle"), '`');
        assert_eq!(resolve_quote(""), '`');
        assert_eq!(Dialect::from_driver("firebird"), Dialect::Generic);
    }

    #[test]
    fn test_driver_matching_ignores_case() {
        assert_eq!(Dialect::from_driver("PostgreSQL"), Dialect::Postgres);
        assert_eq!(Dialect::from_driver(" SQLite "), Dialect::Sqlite);
    }

    #[test]
    fn test_limit_clause() {
        assert_eq!(Dialect::MySql.limit_clause(10), "LIMIT 0,10");
        assert_eq!(Dialect::Postgres.limit_clause(10), "LIMIT 10 OFFSET 0");
    }

    #[test]
    fn test_truncate_sql() {
        assert_eq!(
            Dialect::MySql.truncate_sql("users"),
            "TRUNCATE TABLE `users`"
        );
        assert_eq!(
            Dialect::Postgres.truncate_sql("users"),
            "TRUNCATE TABLE \"users\""
        );
        assert_eq!(Dialect::Sqlite.truncate_sql("logs"), "DELETE FROM `logs`");
    }
}

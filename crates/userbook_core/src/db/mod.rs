//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the user/book store.
//! - Apply embedded schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories refuse connections that are not fully migrated.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or migrating the user/book database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build with more migrations.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "user/book database error: {err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "user/book database uses schema v{found}, this build supports up to v{supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn schema_error_names_both_versions() {
        let err = DbError::UnsupportedSchemaVersion {
            found: 9,
            supported: 2,
        };
        assert_eq!(
            err.to_string(),
            "user/book database uses schema v9, this build supports up to v2"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn sqlite_error_keeps_its_source() {
        let err = DbError::from(rusqlite::Error::InvalidQuery);
        assert!(err.to_string().starts_with("user/book database error: "));
        assert!(err.source().is_some());
    }
}

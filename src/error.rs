//! Error kinds surfaced by the data-access layer. The driver decides how to
//! present them; nothing in here is fatal to the process.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Which entity a lookup was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Department,
    Employee,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Department => write!(f, "department"),
            Entity::Employee => write!(f, "employee"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DaoError {
    /// Lookup, update, or delete target is absent.
    #[error("{entity} {key} not found")]
    NotFound { entity: Entity, key: i64 },

    /// The store is closed, missing, or failed underneath us.
    #[error("connection error: {0}")]
    Connection(String),

    /// Malformed identity values, blank fields, or duplicate keys.
    #[error("{0}")]
    Validation(String),
}

impl DaoError {
    pub fn not_found(entity: Entity, key: i64) -> Self {
        DaoError::NotFound { entity, key }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DaoError::NotFound { .. })
    }

    /// Coerce SQLite errors into our kinds. Primary key clashes become
    /// validation errors naming the duplicated key; everything else means the
    /// store could not do its job.
    pub(crate) fn from_sqlite(err: rusqlite::Error, entity: Entity, key: i64) -> Self {
        if matches!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation)) {
            DaoError::Validation(format!("{entity} {key} already exists."))
        } else {
            DaoError::Connection(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for DaoError {
    fn from(err: rusqlite::Error) -> Self {
        DaoError::Connection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DaoError>;

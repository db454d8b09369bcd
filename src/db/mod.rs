pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Not a member of group {group_id}")]
    NotMember { group_id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
}

impl DatabaseError {
    /// Stable machine tag, surfaced in the API error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            DatabaseError::NotFound { .. } => "NOT_FOUND",
            DatabaseError::NotMember { .. } => "NOT_MEMBER",
            DatabaseError::Forbidden(_) => "FORBIDDEN",
            DatabaseError::Conflict(_) => "CONFLICT",
            _ => "INTERNAL",
        }
    }

    /// True when the underlying SQLite failure is a UNIQUE constraint hit.
    /// Used to distinguish duplicate submissions from generic failures.
    pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

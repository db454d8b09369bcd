//! Transport-agnostic application state.
//!
//! `CoreState` is the single shared state behind the HTTP API. It holds
//! no open connection: every request opens one through `open_db()` and
//! the connection is released when it drops — on success, on `?`, on
//! anything.

use std::path::PathBuf;
use std::sync::Arc;

use crate::analytics::{AlertDispatcher, TracingDispatcher};
use crate::config;
use crate::db;

pub struct CoreState {
    /// Path of the SQLite database file.
    pub db_path: PathBuf,
    /// Where critical health alerts go. Swappable for deployments with a
    /// real notification channel.
    pub dispatcher: Arc<dyn AlertDispatcher>,
}

impl CoreState {
    /// Create a CoreState with defaults, ensuring the data directory exists.
    pub fn new() -> Result<Self, CoreError> {
        let data_dir = config::app_data_dir();
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| CoreError::DataDir(data_dir.display().to_string(), e.to_string()))?;
        Ok(Self {
            db_path: config::database_path(),
            dispatcher: Arc::new(TracingDispatcher),
        })
    }

    /// State backed by an explicit path (tests use a tempdir).
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            dispatcher: Arc::new(TracingDispatcher),
        }
    }

    /// Open a database connection for this request.
    ///
    /// Scoped acquisition: the returned `Connection` closes on drop, so
    /// release is guaranteed on every exit path.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Cannot create data directory {0}: {1}")]
    DataDir(String, String),
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

//! Error handling module
//!
//! Provides the unified error type for the schema lifecycle tool. Store
//! errors are carried verbatim; nothing here retries or translates them.

use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Connection error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Failed to build connection pool: {0}")]
    Build(#[from] deadpool_postgres::CreatePoolError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl AppError {
    /// The SQLSTATE reported by the store, if this error came from it
    pub fn sql_state(&self) -> Option<&SqlState> {
        match self {
            AppError::Database(e) => e.code(),
            AppError::Pool(deadpool_postgres::PoolError::Backend(e)) => e.code(),
            _ => None,
        }
    }

    /// True when the store rejected a row for referencing a missing parent
    pub fn is_foreign_key_violation(&self) -> bool {
        self.sql_state() == Some(&SqlState::FOREIGN_KEY_VIOLATION)
    }
}

/// Result type alias for store and menu operations
pub type AppResult<T> = Result<T, AppError>;

/// Helper function to create a parse error
pub fn parse_error(msg: impl Into<String>) -> AppError {
    AppError::Parse(msg.into())
}

//! Database error types.
//!
//! Storage-level errors surfaced by the repositories. Uses miette for fancy
//! diagnostic output and thiserror for derive macros.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("{entity} not found: {key}")]
    #[diagnostic(code(retailer::db::not_found))]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already exists: {key}")]
    #[diagnostic(code(retailer::db::already_exists))]
    AlreadyExists { entity: &'static str, key: String },

    #[error("Reference violation: {message}")]
    #[diagnostic(code(retailer::db::foreign_key))]
    ForeignKey { message: String },

    #[error("Validation error: {message}")]
    #[diagnostic(code(retailer::db::validation))]
    Validation { message: String },

    #[error("Database error: {message}")]
    #[diagnostic(code(retailer::db::database))]
    Database { message: String },

    #[error("Migration error: {message}")]
    #[diagnostic(code(retailer::db::migration))]
    Migration { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(retailer::db::connection))]
    Connection { message: String },
}

impl DbError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DbError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DbError::Validation {
            message: message.into(),
        }
    }
}

/// Classify sqlx errors into the taxonomy above.
///
/// SQLite reports constraint failures as database errors with fixed message
/// prefixes ("UNIQUE constraint failed: <table>.<column>", "FOREIGN KEY
/// constraint failed"), so classification is by message.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                if msg.contains("UNIQUE constraint failed") {
                    let key = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::AlreadyExists {
                        entity: "Record",
                        key,
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKey { message: msg }
                } else {
                    DbError::Database { message: msg }
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => DbError::Connection {
                message: err.to_string(),
            },
            _ => DbError::Database {
                message: err.to_string(),
            },
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration {
            message: err.to_string(),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

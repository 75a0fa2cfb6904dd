//! Application state for the API server.

use std::sync::Arc;

use crate::db::SqliteDatabase;

/// Shared application state: the database handle, cheap to clone per
/// request.
#[derive(Clone)]
pub struct AppState {
    db: Arc<SqliteDatabase>,
}

impl AppState {
    pub fn new(db: SqliteDatabase) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &SqliteDatabase {
        &self.db
    }
}

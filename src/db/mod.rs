//! Database layer.
//!
//! # Architecture
//!
//! - `error`: error taxonomy shared by all repositories
//! - `models`: domain entities (Customer, Product, Sale, ...)
//! - `sqlite`: SQLite-backed repositories and the pool handle

mod error;
mod models;
pub mod sqlite;

pub use error::{DbError, DbResult};
pub use models::*;
pub use sqlite::SqliteDatabase;

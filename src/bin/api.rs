//! Retailer API server binary.
//!
//! Opens the SQLite database, runs migrations, then hands the handle to the
//! API server.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use miette::Diagnostic;
use retailer::api::{self, ApiError, Config};
use retailer::db::{DbError, SqliteDatabase};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Database error: {0}")]
    #[diagnostic(code(retailer::binary::database))]
    Database(#[from] DbError),

    #[error("Failed to create data directory: {0}")]
    #[diagnostic(code(retailer::binary::io))]
    Io(#[from] std::io::Error),

    #[error("API server error: {0}")]
    #[diagnostic(code(retailer::binary::api))]
    Api(#[from] ApiError),
}

#[derive(Parser)]
#[command(name = "retailer-api")]
#[command(author, version, about = "Global Electronics Retailer API server", long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(long, env = "RETAILER_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "RETAILER_PORT", default_value = "8000")]
    port: u16,

    /// Database file path
    #[arg(long, env = "RETAILER_DB", default_value = "retailer.db")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), BinaryError> {
    let cli = Cli::parse();

    println!("Opening database at {:?}", cli.db);

    if let Some(parent) = cli.db.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let db = SqliteDatabase::open(&cli.db).await?;

    // Run migrations before starting the server
    db.migrate().await?;
    println!("Database migrations complete");

    api::run(
        Config {
            host: cli.host,
            port: cli.port,
        },
        db,
    )
    .await?;

    Ok(())
}

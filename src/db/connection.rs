use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

/// Where a configured database URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    Path(PathBuf),
    /// A SQLite `file:` URI, handed to SQLite untouched.
    Uri(String),
}

impl DatabaseLocation {
    /// Interpret a connection string. Accepts a bare path, `sqlite://<path>`,
    /// `sqlite::memory:` / `:memory:`, and `file:` URIs.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(anyhow!("database URL is empty"));
        }

        match url {
            ":memory:" | "sqlite::memory:" | "sqlite://:memory:" => {
                return Ok(DatabaseLocation::Memory)
            }
            _ => {}
        }

        if url.starts_with("file:") {
            return Ok(DatabaseLocation::Uri(url.to_string()));
        }

        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        if path.is_empty() {
            return Err(anyhow!("database URL `{url}` has no path"));
        }
        Ok(DatabaseLocation::Path(PathBuf::from(path)))
    }
}

/// Open the configured database, create the schema if needed, and return the
/// live connection. The caller owns the handle for the rest of the process.
pub fn ensure_schema(database_url: &str) -> Result<Connection> {
    let location = DatabaseLocation::parse(database_url)?;
    let conn = open_database(&location)?;
    initialize_schema(&conn)?;
    info!(?location, "database ready");
    Ok(conn)
}

/// Open a connection for a parsed location, creating parent directories for
/// on-disk files.
pub fn open_database(location: &DatabaseLocation) -> Result<Connection> {
    match location {
        DatabaseLocation::Memory => {
            Connection::open_in_memory().context("failed to open in-memory database")
        }
        DatabaseLocation::Path(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).context("failed to create data directory")?;
                }
            }
            Connection::open(path)
                .with_context(|| format!("failed to open SQLite database at {}", path.display()))
        }
        DatabaseLocation::Uri(uri) => Connection::open_with_flags(
            uri,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open SQLite database `{uri}`")),
    }
}

/// Create the `toys` table when absent. `AUTOINCREMENT` keeps ids strictly
/// increasing, even across deletes.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS toys (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            material TEXT NOT NULL,
            color TEXT NOT NULL,
            price REAL NOT NULL
        )",
        [],
    )
    .context("failed to create toys table")?;
    debug!("toys table present");
    Ok(())
}

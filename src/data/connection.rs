// src/data/connection.rs

use super::error::DataResult;
use super::schema;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;

pub struct DbConnection;

impl DbConnection {
    /// Opens (creating if needed) the database file with WAL journaling and the schema in place.
    pub fn open(path: &Path) -> DataResult<Connection> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;

        // PRAGMA settings are per connection, so this runs on every open.
        let journal_mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            bevy::log::warn!(
                "Failed to set WAL mode on database {:?}. Current mode: {}",
                path.file_name(),
                journal_mode
            );
        } else {
            bevy::log::debug!("WAL mode activated for database {:?}", path.file_name());
        }

        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;

        register_functions(&conn)?;
        schema::ensure_schema(&conn)?;
        Ok(conn)
    }

    /// Private database for tests and throwaway sessions.
    pub fn open_in_memory() -> DataResult<Connection> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        register_functions(&conn)?;
        schema::ensure_schema(&conn)?;
        Ok(conn)
    }
}

/// Name of the Unicode-aware replacement for SQLite's ASCII-only `lower()`.
pub const UNICODE_LOWER: &str = "unicode_lower";

fn register_functions(conn: &Connection) -> DataResult<()> {
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )?;
    Ok(())
}

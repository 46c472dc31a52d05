// src/data/schema.rs

use super::error::DataResult;
use rusqlite::Connection;

pub const BASES: &str = "bases";
pub const TABLES: &str = "base_tables";
pub const COLUMNS: &str = "table_columns";
pub const ROWS: &str = "table_rows";
pub const CELLS: &str = "row_cells";

/// Creates every table and index the service needs. Idempotent.
pub fn ensure_schema(conn: &Connection) -> DataResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS bases (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS base_tables (
            id TEXT PRIMARY KEY,
            base_id TEXT NOT NULL REFERENCES bases(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS table_columns (
            id TEXT PRIMARY KEY,
            table_id TEXT NOT NULL REFERENCES base_tables(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            column_type TEXT NOT NULL DEFAULT 'text',
            ord INTEGER NOT NULL,
            UNIQUE(table_id, ord)
        );
        CREATE TABLE IF NOT EXISTS table_rows (
            id TEXT PRIMARY KEY,
            table_id TEXT NOT NULL REFERENCES base_tables(id) ON DELETE CASCADE,
            seq INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(table_id, seq)
        );
        CREATE TABLE IF NOT EXISTS row_cells (
            id TEXT PRIMARY KEY,
            row_id TEXT NOT NULL REFERENCES table_rows(id) ON DELETE CASCADE,
            column_id TEXT NOT NULL REFERENCES table_columns(id) ON DELETE CASCADE,
            value TEXT NOT NULL DEFAULT '',
            UNIQUE(row_id, column_id)
        );
        CREATE INDEX IF NOT EXISTS idx_base_tables_base ON base_tables(base_id);
        CREATE INDEX IF NOT EXISTS idx_table_rows_table_seq ON table_rows(table_id, seq);
        CREATE INDEX IF NOT EXISTS idx_row_cells_column_value ON row_cells(column_id, value);",
    )?;
    Ok(())
}

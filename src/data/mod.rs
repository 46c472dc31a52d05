// src/data/mod.rs

pub mod connection;
pub mod error;
pub mod generator;
pub mod model;
pub mod query;
pub mod reader;
pub mod schema;
pub mod service;
pub mod sqlite;
pub mod writer;

pub use error::{DataError, DataResult};
pub use model::{Base, BaseId, Cell, CellId, Column, ColumnId, ColumnType, Row, RowId, Table, TableId};
pub use query::{Cursor, FilterSpec, Page, SortDirection, SortSpec, ViewQuery};
pub use service::{BulkOutcome, DataService};
pub use sqlite::SqliteDataService;

use std::path::PathBuf;

pub const DATABASE_FILE: &str = "gridbase.db";
pub const DATABASE_ENV_VAR: &str = "GRIDBASE_DB";

/// Database storage configuration
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub database_path: PathBuf,
}

impl DataConfig {
    pub fn default_path() -> PathBuf {
        let documents = directories_next::UserDirs::new()
            .and_then(|dirs| dirs.document_dir().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        documents.join("GridBase").join(DATABASE_FILE)
    }

    /// Explicit path first, then `GRIDBASE_DB`, then the documents folder.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        let database_path = explicit
            .or_else(|| std::env::var_os(DATABASE_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(Self::default_path);
        Self { database_path }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::resolve(None)
    }
}

// src/data/service.rs
// Boundary the grid consumes. Calls are synchronous; the app runs them off the UI thread.

use super::error::DataResult;
use super::model::{Base, BaseId, Cell, CellId, Column, ColumnId, ColumnType, Row, Table, TableId};
use super::query::{Cursor, Page, ViewQuery};

pub const MIN_BULK_ROWS: u64 = 1;
pub const MAX_BULK_ROWS: u64 = 100_000;
pub const BULK_BATCH_SIZE: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    pub created: u64,
}

pub trait DataService: Send {
    fn create_base(&self, name: &str) -> DataResult<Base>;
    fn list_bases(&self) -> DataResult<Vec<Base>>;
    fn create_table(&self, base_id: &BaseId, name: &str) -> DataResult<Table>;
    fn list_tables(&self, base_id: &BaseId) -> DataResult<Vec<Table>>;
    fn get_table(&self, table_id: &TableId) -> DataResult<Table>;
    fn delete_table(&self, table_id: &TableId) -> DataResult<()>;

    fn list_columns(&self, table_id: &TableId) -> DataResult<Vec<Column>>;
    fn fetch_page(&self, query: &ViewQuery, cursor: Option<Cursor>) -> DataResult<Page>;
    fn update_cell(&self, cell_id: &CellId, value: &str) -> DataResult<Cell>;
    fn create_row(&self, table_id: &TableId) -> DataResult<Row>;
    /// Batched and not atomic: a failure part way keeps committed batches.
    fn create_bulk_rows(&self, table_id: &TableId, count: u64) -> DataResult<BulkOutcome>;
    fn create_column(
        &self,
        table_id: &TableId,
        name: &str,
        column_type: ColumnType,
    ) -> DataResult<Column>;
}

/// Looks up a column's type among already loaded columns.
pub fn column_type_of(columns: &[Column], column_id: &ColumnId) -> Option<ColumnType> {
    columns
        .iter()
        .find(|c| &c.id == column_id)
        .map(|c| c.column_type)
}

// src/data/sqlite.rs
// `DataService` over a single SQLite connection.

use super::connection::DbConnection;
use super::error::{DataError, DataResult};
use super::generator::generate;
use super::model::{Base, BaseId, Cell, CellId, Column, ColumnType, Row, Table, TableId};
use super::query::{Cursor, Page, ViewQuery};
use super::service::{BulkOutcome, DataService, BULK_BATCH_SIZE, MAX_BULK_ROWS, MIN_BULK_ROWS};
use super::{reader, writer};
use rusqlite::Connection;
use std::path::Path;

pub struct SqliteDataService {
    conn: Connection,
}

impl SqliteDataService {
    pub fn open(path: &Path) -> DataResult<Self> {
        bevy::log::info!("Opening database at {:?}", path);
        Ok(Self {
            conn: DbConnection::open(path)?,
        })
    }

    pub fn open_in_memory() -> DataResult<Self> {
        Ok(Self {
            conn: DbConnection::open_in_memory()?,
        })
    }

    /// Raw connection, for maintenance tools.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// First table of the first base, creating "Default" / "Table 1" on an empty database.
    pub fn ensure_starter_table(&self) -> DataResult<Table> {
        let base = match reader::list_bases(&self.conn)?.into_iter().next() {
            Some(base) => base,
            None => self.create_base("Default")?,
        };
        match reader::list_tables(&self.conn, &base.id)?.into_iter().next() {
            Some(table) => Ok(table),
            None => self.create_table(&base.id, "Table 1"),
        }
    }
}

fn validated_name(kind: &str, name: &str) -> DataResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DataError::Validation(format!("{} name cannot be empty", kind)));
    }
    Ok(trimmed.to_string())
}

pub fn validate_bulk_count(count: u64) -> DataResult<()> {
    if !(MIN_BULK_ROWS..=MAX_BULK_ROWS).contains(&count) {
        return Err(DataError::Validation(format!(
            "Row count must be between {} and {}, got {}",
            MIN_BULK_ROWS, MAX_BULK_ROWS, count
        )));
    }
    Ok(())
}

impl DataService for SqliteDataService {
    fn create_base(&self, name: &str) -> DataResult<Base> {
        let name = validated_name("Base", name)?;
        let base = writer::insert_base(&self.conn, &name)?;
        bevy::log::info!("Created base '{}' ({})", base.name, base.id);
        Ok(base)
    }

    fn list_bases(&self) -> DataResult<Vec<Base>> {
        reader::list_bases(&self.conn)
    }

    fn create_table(&self, base_id: &BaseId, name: &str) -> DataResult<Table> {
        let name = validated_name("Table", name)?;
        if !reader::base_exists(&self.conn, base_id)? {
            return Err(DataError::NotFound(format!("Base {}", base_id)));
        }
        let tx = self.conn.unchecked_transaction()?;
        let table = writer::insert_table(&tx, base_id, &name)?;
        tx.commit()?;
        bevy::log::info!("Created table '{}' ({}) in base {}", table.name, table.id, base_id);
        Ok(table)
    }

    fn list_tables(&self, base_id: &BaseId) -> DataResult<Vec<Table>> {
        if !reader::base_exists(&self.conn, base_id)? {
            return Err(DataError::NotFound(format!("Base {}", base_id)));
        }
        reader::list_tables(&self.conn, base_id)
    }

    fn get_table(&self, table_id: &TableId) -> DataResult<Table> {
        reader::get_table(&self.conn, table_id)
    }

    fn delete_table(&self, table_id: &TableId) -> DataResult<()> {
        writer::delete_table(&self.conn, table_id)?;
        bevy::log::info!("Deleted table {}", table_id);
        Ok(())
    }

    fn list_columns(&self, table_id: &TableId) -> DataResult<Vec<Column>> {
        reader::get_table(&self.conn, table_id)?;
        reader::list_columns(&self.conn, table_id)
    }

    fn fetch_page(&self, query: &ViewQuery, cursor: Option<Cursor>) -> DataResult<Page> {
        reader::fetch_page(&self.conn, query, cursor)
    }

    fn update_cell(&self, cell_id: &CellId, value: &str) -> DataResult<Cell> {
        let current = reader::get_cell(&self.conn, cell_id)?;
        let column_type = reader::column_type_of_cell(&self.conn, &current)?;
        if !column_type.accepts(value) {
            return Err(DataError::Validation(format!("'{}' is not a number", value)));
        }
        writer::update_cell_value(&self.conn, cell_id, value)?;
        bevy::log::debug!("Updated cell {}", cell_id);
        Ok(Cell {
            value: value.to_string(),
            ..current
        })
    }

    fn create_row(&self, table_id: &TableId) -> DataResult<Row> {
        let columns = self.list_columns(table_id)?;
        let tx = self.conn.unchecked_transaction()?;
        let mut rows = writer::insert_rows(&tx, table_id, &columns, 1, |_| String::new())?;
        tx.commit()?;
        rows.pop()
            .ok_or_else(|| DataError::Transient("Row insert returned nothing".to_string()))
    }

    fn create_bulk_rows(&self, table_id: &TableId, count: u64) -> DataResult<BulkOutcome> {
        validate_bulk_count(count)?;
        let columns = self.list_columns(table_id)?;
        bevy::log::info!(
            "Generating {} rows for table {} in batches of {}",
            count,
            table_id,
            BULK_BATCH_SIZE
        );

        let mut created = 0u64;
        while created < count {
            let batch = (count - created).min(BULK_BATCH_SIZE);
            let result = (|| -> DataResult<()> {
                let tx = self.conn.unchecked_transaction()?;
                writer::insert_rows(&tx, table_id, &columns, batch, |column| {
                    generate(column.column_type, &column.name)
                })?;
                tx.commit()?;
                Ok(())
            })();
            if let Err(e) = result {
                bevy::log::error!(
                    "Bulk generation for table {} failed after {} rows: {}",
                    table_id,
                    created,
                    e
                );
                return Err(DataError::PartialBulk {
                    created,
                    reason: e.to_string(),
                });
            }
            created += batch;
            bevy::log::debug!("Bulk generation progress: {}/{}", created, count);
        }
        Ok(BulkOutcome { created })
    }

    fn create_column(&self, table_id: &TableId, name: &str, column_type: ColumnType) -> DataResult<Column> {
        let name = validated_name("Column", name)?;
        reader::get_table(&self.conn, table_id)?;
        let tx = self.conn.unchecked_transaction()?;
        let column = writer::insert_column(&tx, table_id, &name, column_type)?;
        tx.commit()?;
        Ok(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::query::SortDirection;

    fn service_with_table() -> (SqliteDataService, Table) {
        let service = SqliteDataService::open_in_memory().unwrap();
        let base = service.create_base("Base").unwrap();
        let table = service.create_table(&base.id, "Tasks").unwrap();
        (service, table)
    }

    fn fill_column(service: &SqliteDataService, table: &Table, column: &Column, values: &[&str]) {
        for v in values {
            let row = service.create_row(&table.id).unwrap();
            let cell = row.cell_for(&column.id).unwrap();
            service.update_cell(&cell.id, v).unwrap();
        }
    }

    fn column_values(page: &Page, column: &Column) -> Vec<String> {
        page.rows.iter().map(|r| r.value_for(&column.id).to_string()).collect()
    }

    #[test]
    fn new_table_has_default_columns_and_no_rows() {
        let (service, table) = service_with_table();
        let columns = service.list_columns(&table.id).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Notes", "Amount"]);
        assert_eq!(columns[2].column_type, ColumnType::Number);

        let page = service
            .fetch_page(&ViewQuery::new(table.id.clone(), 50), None)
            .unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn created_row_has_one_empty_cell_per_column() {
        let (service, table) = service_with_table();
        let row = service.create_row(&table.id).unwrap();
        assert_eq!(row.cells.len(), 3);
        assert!(row.cells.iter().all(|c| c.value.is_empty()));

        let page = service
            .fetch_page(&ViewQuery::new(table.id.clone(), 50), None)
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.rows[0].cells.len(), 3);
    }

    #[test]
    fn pages_of_fifty_over_one_hundred_twenty_rows() {
        let (service, table) = service_with_table();
        service.create_bulk_rows(&table.id, 120).unwrap();
        let query = ViewQuery::new(table.id.clone(), 50);

        let first = service.fetch_page(&query, None).unwrap();
        assert_eq!(first.rows.len(), 50);
        assert_eq!(first.next_cursor, Some(Cursor(50)));
        assert_eq!(first.total_count, 120);

        let second = service.fetch_page(&query, first.next_cursor).unwrap();
        assert_eq!(second.rows.len(), 50);
        assert_eq!(second.next_cursor, Some(Cursor(100)));
        assert_eq!(second.rows[0].seq, 50);

        let third = service.fetch_page(&query, second.next_cursor).unwrap();
        assert_eq!(third.rows.len(), 20);
        assert_eq!(third.next_cursor, None);
        assert_eq!(third.rows.last().map(|r| r.seq), Some(119));
    }

    #[test]
    fn same_cursor_twice_returns_same_page() {
        let (service, table) = service_with_table();
        service.create_bulk_rows(&table.id, 30).unwrap();
        let query = ViewQuery::new(table.id.clone(), 10);
        let a = service.fetch_page(&query, Some(Cursor(10))).unwrap();
        let b = service.fetch_page(&query, Some(Cursor(10))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn number_column_sorts_numerically() {
        let (service, table) = service_with_table();
        let columns = service.list_columns(&table.id).unwrap();
        let amount = &columns[2];
        fill_column(&service, &table, amount, &["3", "10", "1"]);

        let query = ViewQuery::new(table.id.clone(), 50).with_sort(amount.id.clone(), SortDirection::Desc);
        let page = service.fetch_page(&query, None).unwrap();
        assert_eq!(column_values(&page, amount), vec!["10", "3", "1"]);

        let query = ViewQuery::new(table.id.clone(), 50).with_sort(amount.id.clone(), SortDirection::Asc);
        let page = service.fetch_page(&query, None).unwrap();
        assert_eq!(column_values(&page, amount), vec!["1", "3", "10"]);
    }

    #[test]
    fn text_column_sorts_lexically() {
        let (service, table) = service_with_table();
        let columns = service.list_columns(&table.id).unwrap();
        let name = &columns[0];
        fill_column(&service, &table, name, &["3", "10", "1"]);

        let query = ViewQuery::new(table.id.clone(), 50).with_sort(name.id.clone(), SortDirection::Desc);
        let page = service.fetch_page(&query, None).unwrap();
        assert_eq!(column_values(&page, name), vec!["3", "10", "1"]);
    }

    #[test]
    fn blank_values_sort_last_in_both_directions() {
        let (service, table) = service_with_table();
        let columns = service.list_columns(&table.id).unwrap();
        let name = &columns[0];
        fill_column(&service, &table, name, &["b", "", "a"]);

        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let query = ViewQuery::new(table.id.clone(), 50).with_sort(name.id.clone(), direction);
            let page = service.fetch_page(&query, None).unwrap();
            assert_eq!(column_values(&page, name).last().map(String::as_str), Some(""));
        }
    }

    #[test]
    fn filter_is_case_insensitive_substring_and_composes_with_sort() {
        let (service, table) = service_with_table();
        let columns = service.list_columns(&table.id).unwrap();
        let name = &columns[0];
        fill_column(&service, &table, name, &["Apple pie", "banana", "Pineapple", "cherry"]);

        let query = ViewQuery::new(table.id.clone(), 50).with_filter(name.id.clone(), "APPLE");
        let page = service.fetch_page(&query, None).unwrap();
        assert_eq!(column_values(&page, name), vec!["Apple pie", "Pineapple"]);
        assert_eq!(page.total_count, 2);

        let query = query.with_sort(name.id.clone(), SortDirection::Desc);
        let page = service.fetch_page(&query, None).unwrap();
        assert_eq!(column_values(&page, name), vec!["Pineapple", "Apple pie"]);
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn filter_folds_case_beyond_ascii() {
        let (service, table) = service_with_table();
        let columns = service.list_columns(&table.id).unwrap();
        let name = &columns[0];
        fill_column(&service, &table, name, &["ÉCOLE Normale", "ecole", "Straße", "Ωmega"]);

        let query = ViewQuery::new(table.id.clone(), 50).with_filter(name.id.clone(), "école");
        let page = service.fetch_page(&query, None).unwrap();
        assert_eq!(column_values(&page, name), vec!["ÉCOLE Normale"]);

        let query = ViewQuery::new(table.id.clone(), 50).with_filter(name.id.clone(), "ωMEGA");
        let page = service.fetch_page(&query, None).unwrap();
        assert_eq!(column_values(&page, name), vec!["Ωmega"]);
        assert_eq!(page.total_count, 1);
    }

    #[test]
    fn update_cell_rejects_non_numeric_values_in_number_columns() {
        let (service, table) = service_with_table();
        let row = service.create_row(&table.id).unwrap();
        let amount_cell = &row.cells[2];
        let err = service.update_cell(&amount_cell.id, "lots").unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
        let ok = service.update_cell(&amount_cell.id, "12.5").unwrap();
        assert_eq!(ok.value, "12.5");
    }

    #[test]
    fn update_missing_cell_is_not_found() {
        let (service, _) = service_with_table();
        let err = service.update_cell(&CellId::from("nope"), "x").unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn new_column_backfills_existing_rows() {
        let (service, table) = service_with_table();
        service.create_bulk_rows(&table.id, 5).unwrap();
        let column = service.create_column(&table.id, "  Status ", ColumnType::Text).unwrap();
        assert_eq!(column.name, "Status");
        assert_eq!(column.order, 3);

        let page = service
            .fetch_page(&ViewQuery::new(table.id.clone(), 50), None)
            .unwrap();
        assert!(page.rows.iter().all(|r| r.cells.len() == 4));
        assert!(page.rows.iter().all(|r| r.value_for(&column.id).is_empty()));
    }

    #[test]
    fn empty_names_and_bad_counts_are_rejected() {
        let (service, table) = service_with_table();
        assert!(matches!(service.create_base("  "), Err(DataError::Validation(_))));
        assert!(matches!(
            service.create_column(&table.id, "", ColumnType::Text),
            Err(DataError::Validation(_))
        ));
        assert!(matches!(service.create_bulk_rows(&table.id, 0), Err(DataError::Validation(_))));
        assert!(matches!(
            service.create_bulk_rows(&table.id, 100_001),
            Err(DataError::Validation(_))
        ));
    }

    #[test]
    fn bulk_rows_span_several_batches() {
        let (service, table) = service_with_table();
        let outcome = service.create_bulk_rows(&table.id, 2_500).unwrap();
        assert_eq!(outcome.created, 2_500);
        assert_eq!(reader::count_rows(service.connection(), &table.id).unwrap(), 2_500);
    }

    #[test]
    fn deleting_a_table_cascades() {
        let (service, table) = service_with_table();
        service.create_bulk_rows(&table.id, 3).unwrap();
        service.delete_table(&table.id).unwrap();
        assert!(matches!(service.get_table(&table.id), Err(DataError::NotFound(_))));
        assert_eq!(reader::count_rows(service.connection(), &table.id).unwrap(), 0);
        let cells: i64 = service
            .connection()
            .query_row("SELECT COUNT(*) FROM row_cells", [], |r| r.get(0))
            .unwrap();
        assert_eq!(cells, 0);
    }

    #[test]
    fn starter_table_is_created_once() {
        let service = SqliteDataService::open_in_memory().unwrap();
        let first = service.ensure_starter_table().unwrap();
        let again = service.ensure_starter_table().unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.name, "Table 1");
    }
}

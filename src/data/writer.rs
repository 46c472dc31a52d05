// src/data/writer.rs
// Every SQL write goes through this module (see tests/no_direct_db_writes.rs).

use super::error::{DataError, DataResult};
use super::model::{
    Base, BaseId, Cell, CellId, Column, ColumnId, ColumnType, Row, RowId, Table, TableId,
    DEFAULT_COLUMNS,
};
use rusqlite::{params, Connection, Transaction};

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn insert_base(conn: &Connection, name: &str) -> DataResult<Base> {
    let base = Base {
        id: BaseId::generate(),
        name: name.to_string(),
        created_at: now_timestamp(),
    };
    conn.execute(
        "INSERT INTO bases (id, name, created_at) VALUES (?, ?, ?)",
        params![base.id.as_str(), base.name, base.created_at],
    )?;
    Ok(base)
}

/// Inserts a table together with its default column set.
pub fn insert_table(tx: &Transaction, base_id: &BaseId, name: &str) -> DataResult<Table> {
    let table = Table {
        id: TableId::generate(),
        base_id: base_id.clone(),
        name: name.to_string(),
        created_at: now_timestamp(),
    };
    tx.execute(
        "INSERT INTO base_tables (id, base_id, name, created_at) VALUES (?, ?, ?, ?)",
        params![table.id.as_str(), base_id.as_str(), table.name, table.created_at],
    )?;
    for (order, (col_name, col_type)) in DEFAULT_COLUMNS.iter().enumerate() {
        tx.execute(
            "INSERT INTO table_columns (id, table_id, name, column_type, ord) VALUES (?, ?, ?, ?, ?)",
            params![
                ColumnId::generate().as_str(),
                table.id.as_str(),
                col_name,
                col_type.as_str(),
                order as i64
            ],
        )?;
    }
    Ok(table)
}

pub fn delete_table(conn: &Connection, table_id: &TableId) -> DataResult<()> {
    let removed = conn.execute("DELETE FROM base_tables WHERE id = ?", [table_id.as_str()])?;
    if removed == 0 {
        return Err(DataError::NotFound(format!("Table {}", table_id)));
    }
    Ok(())
}

pub fn update_cell_value(conn: &Connection, cell_id: &CellId, value: &str) -> DataResult<()> {
    let updated = conn.execute(
        "UPDATE row_cells SET value = ? WHERE id = ?",
        params![value, cell_id.as_str()],
    )?;
    if updated == 0 {
        return Err(DataError::NotFound(format!("Cell {}", cell_id)));
    }
    Ok(())
}

/// Appends a column after the current last one and backfills an empty cell for every row.
pub fn insert_column(
    tx: &Transaction,
    table_id: &TableId,
    name: &str,
    column_type: ColumnType,
) -> DataResult<Column> {
    let next_order: i64 = tx.query_row(
        "SELECT COALESCE(MAX(ord), -1) + 1 FROM table_columns WHERE table_id = ?",
        [table_id.as_str()],
        |r| r.get(0),
    )?;
    let column = Column {
        id: ColumnId::generate(),
        table_id: table_id.clone(),
        name: name.to_string(),
        column_type,
        order: next_order,
    };
    tx.execute(
        "INSERT INTO table_columns (id, table_id, name, column_type, ord) VALUES (?, ?, ?, ?, ?)",
        params![
            column.id.as_str(),
            table_id.as_str(),
            column.name,
            column_type.as_str(),
            next_order
        ],
    )?;

    let row_ids: Vec<String> = {
        let mut stmt = tx.prepare("SELECT id FROM table_rows WHERE table_id = ?")?;
        let ids = stmt
            .query_map([table_id.as_str()], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        ids
    };
    {
        let mut stmt =
            tx.prepare("INSERT INTO row_cells (id, row_id, column_id, value) VALUES (?, ?, ?, '')")?;
        for row_id in &row_ids {
            stmt.execute(params![CellId::generate().as_str(), row_id, column.id.as_str()])?;
        }
    }
    bevy::log::info!(
        "Added column '{}' ({}) to table {} with {} backfilled cells",
        column.name,
        column_type,
        table_id,
        row_ids.len()
    );
    Ok(column)
}

fn next_seq(conn: &Connection, table_id: &TableId) -> DataResult<i64> {
    let seq: i64 = conn.query_row(
        "SELECT COALESCE(MAX(seq), -1) + 1 FROM table_rows WHERE table_id = ?",
        [table_id.as_str()],
        |r| r.get(0),
    )?;
    Ok(seq)
}

/// Inserts `count` rows, each with one cell per column, filled by `value_for`.
/// Rows get consecutive creation sequence numbers.
pub fn insert_rows<F>(
    tx: &Transaction,
    table_id: &TableId,
    columns: &[Column],
    count: u64,
    mut value_for: F,
) -> DataResult<Vec<Row>>
where
    F: FnMut(&Column) -> String,
{
    let first_seq = next_seq(tx, table_id)?;
    let created_at = now_timestamp();
    let mut row_stmt =
        tx.prepare("INSERT INTO table_rows (id, table_id, seq, created_at) VALUES (?, ?, ?, ?)")?;
    let mut cell_stmt =
        tx.prepare("INSERT INTO row_cells (id, row_id, column_id, value) VALUES (?, ?, ?, ?)")?;

    let mut rows = Vec::with_capacity(count as usize);
    for i in 0..count {
        let row_id = RowId::generate();
        let seq = first_seq + i as i64;
        row_stmt.execute(params![row_id.as_str(), table_id.as_str(), seq, created_at])?;
        let mut cells = Vec::with_capacity(columns.len());
        for column in columns {
            let cell = Cell {
                id: CellId::generate(),
                row_id: row_id.clone(),
                column_id: column.id.clone(),
                value: value_for(column),
            };
            cell_stmt.execute(params![
                cell.id.as_str(),
                row_id.as_str(),
                column.id.as_str(),
                cell.value
            ])?;
            cells.push(cell);
        }
        rows.push(Row {
            id: row_id,
            table_id: table_id.clone(),
            seq,
            cells,
        });
    }
    Ok(rows)
}

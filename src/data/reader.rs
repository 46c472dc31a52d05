// src/data/reader.rs
// Read-only queries: listings, single lookups and page fetches.

use super::connection::UNICODE_LOWER;
use super::error::{DataError, DataResult};
use super::model::{Base, BaseId, Cell, CellId, Column, ColumnId, ColumnType, Row, RowId, Table, TableId};
use super::query::{Cursor, Page, SortDirection, ViewQuery};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::collections::HashMap;

pub fn list_bases(conn: &Connection) -> DataResult<Vec<Base>> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM bases ORDER BY created_at, id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Base {
                id: BaseId(row.get(0)?),
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn base_exists(conn: &Connection, base_id: &BaseId) -> DataResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM bases WHERE id = ?", [base_id.as_str()], |r| r.get(0))
        .optional()?;
    Ok(found.is_some())
}

pub fn list_tables(conn: &Connection, base_id: &BaseId) -> DataResult<Vec<Table>> {
    let mut stmt = conn.prepare(
        "SELECT id, base_id, name, created_at FROM base_tables WHERE base_id = ? ORDER BY created_at, id",
    )?;
    let rows = stmt
        .query_map([base_id.as_str()], map_table)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_table(conn: &Connection, table_id: &TableId) -> DataResult<Table> {
    conn.query_row(
        "SELECT id, base_id, name, created_at FROM base_tables WHERE id = ?",
        [table_id.as_str()],
        map_table,
    )
    .optional()?
    .ok_or_else(|| DataError::NotFound(format!("Table {}", table_id)))
}

fn map_table(row: &rusqlite::Row<'_>) -> rusqlite::Result<Table> {
    Ok(Table {
        id: TableId(row.get(0)?),
        base_id: BaseId(row.get(1)?),
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub fn list_columns(conn: &Connection, table_id: &TableId) -> DataResult<Vec<Column>> {
    let mut stmt = conn.prepare(
        "SELECT id, table_id, name, column_type, ord FROM table_columns WHERE table_id = ? ORDER BY ord",
    )?;
    let rows = stmt
        .query_map([table_id.as_str()], |row| {
            let type_name: String = row.get(3)?;
            Ok(Column {
                id: ColumnId(row.get(0)?),
                table_id: TableId(row.get(1)?),
                name: row.get(2)?,
                column_type: ColumnType::parse(&type_name).unwrap_or_default(),
                order: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_cell(conn: &Connection, cell_id: &CellId) -> DataResult<Cell> {
    conn.query_row(
        "SELECT id, row_id, column_id, value FROM row_cells WHERE id = ?",
        [cell_id.as_str()],
        map_cell,
    )
    .optional()?
    .ok_or_else(|| DataError::NotFound(format!("Cell {}", cell_id)))
}

fn map_cell(row: &rusqlite::Row<'_>) -> rusqlite::Result<Cell> {
    Ok(Cell {
        id: CellId(row.get(0)?),
        row_id: RowId(row.get(1)?),
        column_id: ColumnId(row.get(2)?),
        value: row.get(3)?,
    })
}

pub fn column_type_of_cell(conn: &Connection, cell: &Cell) -> DataResult<ColumnType> {
    let type_name: Option<String> = conn
        .query_row(
            "SELECT column_type FROM table_columns WHERE id = ?",
            [cell.column_id.as_str()],
            |r| r.get(0),
        )
        .optional()?;
    type_name
        .map(|t| ColumnType::parse(&t).unwrap_or_default())
        .ok_or_else(|| DataError::NotFound(format!("Column {}", cell.column_id)))
}

fn column_type_in_table(
    conn: &Connection,
    table_id: &TableId,
    column_id: &ColumnId,
) -> DataResult<ColumnType> {
    let type_name: Option<String> = conn
        .query_row(
            "SELECT column_type FROM table_columns WHERE id = ? AND table_id = ?",
            params![column_id.as_str(), table_id.as_str()],
            |r| r.get(0),
        )
        .optional()?;
    type_name
        .map(|t| ColumnType::parse(&t).unwrap_or_default())
        .ok_or_else(|| DataError::NotFound(format!("Column {}", column_id)))
}

/// Fetches one page of `query`, starting at `cursor` (first page when `None`).
///
/// Filter and sort are applied together. Text columns sort by byte order,
/// number columns by numeric value; blank cells go last in either direction
/// and ties fall back to creation order.
pub fn fetch_page(conn: &Connection, query: &ViewQuery, cursor: Option<Cursor>) -> DataResult<Page> {
    query.validate()?;
    get_table(conn, &query.table_id)?;
    let cursor = cursor.unwrap_or(Cursor::START);

    let sort_type = match &query.sort {
        Some(sort) => Some(column_type_in_table(conn, &query.table_id, &sort.column_id)?),
        None => None,
    };
    if let Some(filter) = &query.filter {
        column_type_in_table(conn, &query.table_id, &filter.column_id)?;
    }

    let mut where_sql = String::from(" WHERE r.table_id = ?");
    let mut where_params: Vec<&dyn ToSql> = vec![&query.table_id.0];
    if let Some(filter) = &query.filter {
        where_sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM row_cells f WHERE f.row_id = r.id AND f.column_id = ? \
             AND instr({lower}(f.value), {lower}(?)) > 0)",
            lower = UNICODE_LOWER
        ));
        where_params.push(&filter.column_id.0);
        where_params.push(&filter.text);
    }

    let total_count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM table_rows r{}", where_sql),
        rusqlite::params_from_iter(where_params.iter()),
        |r| r.get(0),
    )?;

    let limit = query.page_size as i64;
    let offset = cursor.offset() as i64;
    let mut sql = String::from("SELECT r.id, r.seq FROM table_rows r");
    let mut all_params: Vec<&dyn ToSql> = Vec::new();
    let order_sql = match (&query.sort, sort_type) {
        (Some(sort), Some(column_type)) => {
            sql.push_str(" LEFT JOIN row_cells s ON s.row_id = r.id AND s.column_id = ?");
            all_params.push(&sort.column_id.0);
            let dir = match sort.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            let key = match column_type {
                ColumnType::Text => "s.value".to_string(),
                ColumnType::Number => "CAST(s.value AS REAL)".to_string(),
            };
            format!(
                " ORDER BY (COALESCE(s.value, '') = '') ASC, {} {}, r.seq ASC, r.id ASC",
                key, dir
            )
        }
        _ => " ORDER BY r.seq ASC, r.id ASC".to_string(),
    };
    sql.push_str(&where_sql);
    sql.push_str(&order_sql);
    sql.push_str(" LIMIT ? OFFSET ?");
    all_params.extend(where_params.iter().copied());
    all_params.push(&limit);
    all_params.push(&offset);

    let mut stmt = conn.prepare(&sql)?;
    let heads: Vec<(String, i64)> = stmt
        .query_map(rusqlite::params_from_iter(all_params.iter()), |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let row_ids: Vec<&str> = heads.iter().map(|(id, _)| id.as_str()).collect();
    let mut cells_by_row = load_cells_for_rows(conn, &row_ids)?;

    let rows: Vec<Row> = heads
        .iter()
        .map(|(id, seq)| Row {
            id: RowId(id.clone()),
            table_id: query.table_id.clone(),
            seq: *seq,
            cells: cells_by_row.remove(id.as_str()).unwrap_or_default(),
        })
        .collect();

    let total_count = total_count.max(0) as u64;
    let consumed = cursor.offset() + rows.len() as u64;
    let next_cursor = if !rows.is_empty() && consumed < total_count {
        Some(Cursor(cursor.offset() + query.page_size as u64))
    } else {
        None
    };

    bevy::log::debug!(
        "fetch_page: table={} cursor={} rows={} total={} next={:?}",
        query.table_id,
        cursor.offset(),
        rows.len(),
        total_count,
        next_cursor
    );

    Ok(Page {
        cursor,
        rows,
        next_cursor,
        total_count,
    })
}

/// Cells of the given rows, grouped by row id and ordered by column order.
pub fn load_cells_for_rows(conn: &Connection, row_ids: &[&str]) -> DataResult<HashMap<String, Vec<Cell>>> {
    let mut out: HashMap<String, Vec<Cell>> = HashMap::new();
    if row_ids.is_empty() {
        return Ok(out);
    }
    let placeholders = (0..row_ids.len()).map(|_| "?").collect::<Vec<_>>().join(", ");
    let sql = format!(
        "SELECT c.id, c.row_id, c.column_id, c.value FROM row_cells c \
         JOIN table_columns col ON col.id = c.column_id \
         WHERE c.row_id IN ({}) ORDER BY c.row_id, col.ord",
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let cells = stmt.query_map(rusqlite::params_from_iter(row_ids.iter()), map_cell)?;
    for cell in cells {
        let cell = cell?;
        out.entry(cell.row_id.0.clone()).or_default().push(cell);
    }
    Ok(out)
}

pub fn count_rows(conn: &Connection, table_id: &TableId) -> DataResult<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM table_rows WHERE table_id = ?",
        [table_id.as_str()],
        |r| r.get(0),
    )?;
    Ok(n.max(0) as u64)
}

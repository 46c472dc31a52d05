// src/cli/rows.rs
use crate::data::query::{Cursor, SortDirection, ViewQuery};
use crate::data::{Column, ColumnId, DataError, DataResult, DataService, SqliteDataService, TableId};
use std::time::Instant;

const CELL_WIDTH: usize = 18;

pub fn seed(service: &SqliteDataService, table_id: &str, count: u64) -> DataResult<()> {
    let started = Instant::now();
    match service.create_bulk_rows(&TableId::from(table_id), count) {
        Ok(outcome) => {
            println!("Generated {} rows in {:.2?}", outcome.created, started.elapsed());
            Ok(())
        }
        Err(DataError::PartialBulk { created, reason }) => {
            println!("Stopped after {} rows: {}", created, reason);
            Err(DataError::PartialBulk { created, reason })
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageArgs {
    pub table_id: String,
    pub cursor: Option<u64>,
    pub limit: u32,
    pub filter_column: Option<String>,
    pub filter: Option<String>,
    pub sort_column: Option<String>,
    pub desc: bool,
}

/// Accepts a column id or, failing that, a column name (case-insensitive).
fn resolve_column(columns: &[Column], key: &str) -> DataResult<ColumnId> {
    columns
        .iter()
        .find(|c| c.id.as_str() == key)
        .or_else(|| columns.iter().find(|c| c.name.eq_ignore_ascii_case(key)))
        .map(|c| c.id.clone())
        .ok_or_else(|| DataError::NotFound(format!("Column {}", key)))
}

pub fn build_query(columns: &[Column], args: &PageArgs) -> DataResult<ViewQuery> {
    let mut query = ViewQuery::new(TableId::from(args.table_id.as_str()), args.limit);
    // Keep the raw limit so out-of-range values are reported instead of clamped.
    query.page_size = args.limit;
    if let (Some(column), Some(text)) = (&args.filter_column, &args.filter) {
        query = query.with_filter(resolve_column(columns, column)?, text);
    }
    if let Some(column) = &args.sort_column {
        let direction = if args.desc { SortDirection::Desc } else { SortDirection::Asc };
        query = query.with_sort(resolve_column(columns, column)?, direction);
    }
    Ok(query)
}

pub fn print_page(service: &SqliteDataService, args: PageArgs) -> DataResult<()> {
    let columns = service.list_columns(&TableId::from(args.table_id.as_str()))?;
    let query = build_query(&columns, &args)?;
    let page = service.fetch_page(&query, args.cursor.map(Cursor))?;

    let header: Vec<String> = columns.iter().map(|c| fit(&c.name)).collect();
    println!("{:<6} {}", "#", header.join(" "));
    println!("{}", "-".repeat(7 + columns.len() * (CELL_WIDTH + 1)));
    for (i, row) in page.rows.iter().enumerate() {
        let cells: Vec<String> = columns.iter().map(|c| fit(row.value_for(&c.id))).collect();
        println!("{:<6} {}", page.cursor.offset() + i as u64, cells.join(" "));
    }
    println!();
    println!(
        "{} of {} rows; next cursor: {}",
        page.rows.len(),
        page.total_count,
        page.next_cursor
            .map(|c| c.offset().to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    Ok(())
}

fn fit(value: &str) -> String {
    let mut out: String = value.chars().take(CELL_WIDTH).collect();
    if value.chars().count() > CELL_WIDTH {
        out.pop();
        out.push('~');
    }
    format!("{:<width$}", out, width = CELL_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnType;

    fn columns() -> Vec<Column> {
        vec![
            Column {
                id: ColumnId::from("c-name"),
                table_id: TableId::from("t"),
                name: "Name".into(),
                column_type: ColumnType::Text,
                order: 0,
            },
            Column {
                id: ColumnId::from("c-amount"),
                table_id: TableId::from("t"),
                name: "Amount".into(),
                column_type: ColumnType::Number,
                order: 1,
            },
        ]
    }

    fn args() -> PageArgs {
        PageArgs {
            table_id: "t".into(),
            cursor: None,
            limit: 50,
            filter_column: None,
            filter: None,
            sort_column: None,
            desc: false,
        }
    }

    #[test]
    fn columns_resolve_by_id_or_name() {
        let query = build_query(
            &columns(),
            &PageArgs {
                filter_column: Some("name".into()),
                filter: Some("ada".into()),
                sort_column: Some("c-amount".into()),
                desc: true,
                ..args()
            },
        )
        .unwrap();
        assert_eq!(query.filter.unwrap().column_id, ColumnId::from("c-name"));
        let sort = query.sort.unwrap();
        assert_eq!(sort.column_id, ColumnId::from("c-amount"));
        assert_eq!(sort.direction, SortDirection::Desc);

        let missing = build_query(&columns(), &PageArgs { sort_column: Some("Nope".into()), ..args() });
        assert!(matches!(missing, Err(DataError::NotFound(_))));
    }

    #[test]
    fn out_of_range_limit_is_not_clamped() {
        let query = build_query(&columns(), &PageArgs { limit: 500, ..args() }).unwrap();
        assert!(matches!(query.validate(), Err(DataError::Validation(_))));
    }

    #[test]
    fn long_values_are_truncated() {
        let cell = fit("a very long value that does not fit");
        assert_eq!(cell.chars().count(), CELL_WIDTH);
        assert!(cell.ends_with('~'));
        assert_eq!(fit("ok").trim_end(), "ok");
    }
}

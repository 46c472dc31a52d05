// src/cli/columns.rs
use crate::data::{ColumnType, DataResult, DataService, SqliteDataService, TableId};

pub fn list_columns(service: &SqliteDataService, table_id: &str) -> DataResult<()> {
    let columns = service.list_columns(&TableId::from(table_id))?;
    println!("{:<6} {:<38} {:<24} {}", "Order", "Id", "Name", "Type");
    println!("{}", "-".repeat(80));
    for column in columns {
        println!(
            "{:<6} {:<38} {:<24} {}",
            column.order, column.id, column.name, column.column_type
        );
    }
    Ok(())
}

pub fn add_column(
    service: &SqliteDataService,
    table_id: &str,
    name: &str,
    column_type: ColumnType,
) -> DataResult<()> {
    let column = service.create_column(&TableId::from(table_id), name, column_type)?;
    println!(
        "Added {} column '{}' at position {}",
        column.column_type, column.name, column.order
    );
    println!("  id: {}", column.id);
    Ok(())
}

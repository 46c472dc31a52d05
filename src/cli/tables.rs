// src/cli/tables.rs
use crate::data::{BaseId, DataResult, DataService, SqliteDataService};

pub fn create_base(service: &SqliteDataService, name: &str) -> DataResult<()> {
    let base = service.create_base(name)?;
    println!("Created base '{}'", base.name);
    println!("  id: {}", base.id);
    Ok(())
}

pub fn list_bases(service: &SqliteDataService) -> DataResult<()> {
    let bases = service.list_bases()?;
    if bases.is_empty() {
        println!("No bases yet. Create one with `gridbase create-base NAME`.");
        return Ok(());
    }
    println!("{:<38} {:<24} {}", "Id", "Name", "Created");
    println!("{}", "-".repeat(90));
    for base in bases {
        println!("{:<38} {:<24} {}", base.id, base.name, base.created_at);
    }
    Ok(())
}

pub fn create_table(service: &SqliteDataService, base_id: &str, name: &str) -> DataResult<()> {
    let table = service.create_table(&BaseId::from(base_id), name)?;
    println!("Created table '{}' in base {}", table.name, table.base_id);
    println!("  id: {}", table.id);
    Ok(())
}

pub fn list_tables(service: &SqliteDataService, base_id: &str) -> DataResult<()> {
    let tables = service.list_tables(&BaseId::from(base_id))?;
    println!("{:<38} {:<24} {}", "Id", "Name", "Created");
    println!("{}", "-".repeat(90));
    for table in tables {
        println!("{:<38} {:<24} {}", table.id, table.name, table.created_at);
    }
    Ok(())
}

// src/cli/mod.rs
// Command line tools for managing bases, tables and rows without opening the window

pub mod columns;
pub mod rows;
pub mod tables;

use crate::data::{ColumnType, DataConfig, DataResult, SqliteDataService};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gridbase")]
#[command(about = "GridBase - paginated table editor with maintenance tools", long_about = None)]
pub struct Cli {
    /// Database file to use instead of GRIDBASE_DB or the documents folder
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Create a new base
    CreateBase {
        name: String,
    },

    /// List all bases
    ListBases,

    /// Create a table (with the default columns) inside a base
    CreateTable {
        base_id: String,
        name: String,
    },

    /// List the tables of a base
    ListTables {
        base_id: String,
    },

    /// List the columns of a table in display order
    ListColumns {
        table_id: String,
    },

    /// Append a column to a table, backfilling empty cells
    AddColumn {
        table_id: String,
        name: String,
        /// text or number
        #[arg(long = "type", default_value = "text", value_parser = parse_column_type)]
        column_type: ColumnType,
    },

    /// Generate rows of synthetic data
    Seed {
        table_id: String,
        count: u64,
    },

    /// Print one page of a table
    Page {
        table_id: String,
        /// Offset cursor returned by a previous page
        #[arg(long)]
        cursor: Option<u64>,
        #[arg(long, default_value_t = crate::data::query::DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(long, requires = "filter")]
        filter_column: Option<String>,
        #[arg(long, requires = "filter_column")]
        filter: Option<String>,
        #[arg(long)]
        sort_column: Option<String>,
        /// Sort descending (needs --sort-column)
        #[arg(long, requires = "sort_column")]
        desc: bool,
    },
}

fn parse_column_type(s: &str) -> Result<ColumnType, String> {
    ColumnType::parse(s).ok_or_else(|| format!("unknown column type '{}' (expected text or number)", s))
}

/// Opens the database and runs one tool.
pub fn run(db: Option<PathBuf>, command: Commands) -> DataResult<()> {
    let config = DataConfig::resolve(db);
    let service = SqliteDataService::open(&config.database_path)?;
    dispatch(&service, command)
}

pub fn dispatch(service: &SqliteDataService, command: Commands) -> DataResult<()> {
    match command {
        Commands::CreateBase { name } => tables::create_base(service, &name),
        Commands::ListBases => tables::list_bases(service),
        Commands::CreateTable { base_id, name } => tables::create_table(service, &base_id, &name),
        Commands::ListTables { base_id } => tables::list_tables(service, &base_id),
        Commands::ListColumns { table_id } => columns::list_columns(service, &table_id),
        Commands::AddColumn {
            table_id,
            name,
            column_type,
        } => columns::add_column(service, &table_id, &name, column_type),
        Commands::Seed { table_id, count } => rows::seed(service, &table_id, count),
        Commands::Page {
            table_id,
            cursor,
            limit,
            filter_column,
            filter,
            sort_column,
            desc,
        } => rows::print_page(
            service,
            rows::PageArgs {
                table_id,
                cursor,
                limit,
                filter_column,
                filter,
                sort_column,
                desc,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_desktop_app() {
        let cli = Cli::try_parse_from(["gridbase"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.db.is_none());
    }

    #[test]
    fn add_column_parses_type_flag() {
        let cli = Cli::try_parse_from(["gridbase", "add-column", "t1", "Price", "--type", "number"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::AddColumn {
                table_id: "t1".into(),
                name: "Price".into(),
                column_type: ColumnType::Number,
            })
        );
        assert!(Cli::try_parse_from(["gridbase", "add-column", "t1", "X", "--type", "date"]).is_err());
    }

    #[test]
    fn page_options_and_global_db() {
        let cli = Cli::try_parse_from([
            "gridbase", "page", "t1", "--cursor", "50", "--limit", "25", "--sort-column", "c1", "--desc",
            "--db", "/tmp/grid.db",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/grid.db")));
        match cli.command {
            Some(Commands::Page { cursor, limit, desc, filter, .. }) => {
                assert_eq!(cursor, Some(50));
                assert_eq!(limit, 25);
                assert!(desc);
                assert!(filter.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Cli::try_parse_from(["gridbase", "page", "t1", "--filter", "x"]).is_err());
    }

    #[test]
    fn dispatch_runs_against_sqlite() {
        let service = SqliteDataService::open_in_memory().unwrap();
        dispatch(&service, Commands::CreateBase { name: "Ops".into() }).unwrap();
        let base = service.connection();
        let base_id: String = base
            .query_row("SELECT id FROM bases LIMIT 1", [], |r| r.get(0))
            .unwrap();
        dispatch(&service, Commands::CreateTable { base_id: base_id.clone(), name: "Tasks".into() }).unwrap();
        let table_id: String = base
            .query_row("SELECT id FROM base_tables LIMIT 1", [], |r| r.get(0))
            .unwrap();
        dispatch(&service, Commands::Seed { table_id: table_id.clone(), count: 3 }).unwrap();
        dispatch(
            &service,
            Commands::Page {
                table_id,
                cursor: None,
                limit: 2,
                filter_column: None,
                filter: None,
                sort_column: None,
                desc: false,
            },
        )
        .unwrap();
        assert!(dispatch(&service, Commands::ListTables { base_id: "missing".into() }).is_err());
    }
}

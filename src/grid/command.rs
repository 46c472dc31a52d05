// src/grid/command.rs
// Work the session asks for, and the results that come back from the service.

use super::bulk::BulkJobId;
use super::fetch::{FetchRequest, FetchTicket};
use super::transaction::CommitId;
use crate::data::error::{DataError, DataResult};
use crate::data::model::{Cell, CellId, Column, ColumnType, Row, TableId};
use crate::data::query::Page;
use crate::data::service::{BulkOutcome, DataService};

#[derive(Debug, Clone, PartialEq)]
pub enum GridCommand {
    Fetch(FetchRequest),
    Commit {
        id: CommitId,
        cell_id: CellId,
        value: String,
    },
    CreateRow {
        table_id: TableId,
    },
    CreateColumn {
        table_id: TableId,
        name: String,
        column_type: ColumnType,
    },
    GenerateRows {
        job: BulkJobId,
        table_id: TableId,
        count: u64,
    },
    ReloadColumns {
        table_id: TableId,
    },
}

impl GridCommand {
    pub fn label(&self) -> &'static str {
        match self {
            GridCommand::Fetch(_) => "fetch",
            GridCommand::Commit { .. } => "commit",
            GridCommand::CreateRow { .. } => "create row",
            GridCommand::CreateColumn { .. } => "create column",
            GridCommand::GenerateRows { .. } => "generate rows",
            GridCommand::ReloadColumns { .. } => "reload columns",
        }
    }
}

#[derive(Debug)]
pub enum GridResult {
    PageLoaded {
        ticket: FetchTicket,
        result: DataResult<Page>,
    },
    CommitSettled {
        id: CommitId,
        result: DataResult<Cell>,
    },
    RowCreated(DataResult<Row>),
    ColumnCreated(DataResult<Column>),
    ColumnsLoaded(DataResult<Vec<Column>>),
    BulkSettled {
        job: BulkJobId,
        result: DataResult<BulkOutcome>,
    },
}

impl GridResult {
    /// The result `command` would have produced had the service failed with `error`.
    pub fn failure(command: &GridCommand, error: DataError) -> GridResult {
        match command {
            GridCommand::Fetch(request) => GridResult::PageLoaded {
                ticket: request.ticket,
                result: Err(error),
            },
            GridCommand::Commit { id, .. } => GridResult::CommitSettled {
                id: *id,
                result: Err(error),
            },
            GridCommand::CreateRow { .. } => GridResult::RowCreated(Err(error)),
            GridCommand::CreateColumn { .. } => GridResult::ColumnCreated(Err(error)),
            GridCommand::GenerateRows { job, .. } => GridResult::BulkSettled {
                job: *job,
                result: Err(error),
            },
            GridCommand::ReloadColumns { .. } => GridResult::ColumnsLoaded(Err(error)),
        }
    }

    /// Only reads are retried; a failed write must surface.
    pub fn retryable_error(&self) -> Option<&DataError> {
        match self {
            GridResult::PageLoaded { result: Err(e), .. } => Some(e),
            GridResult::ColumnsLoaded(Err(e)) => Some(e),
            _ => None,
        }
    }
}

/// Runs one command against the service, synchronously.
pub fn execute<S: DataService + ?Sized>(service: &S, command: &GridCommand) -> GridResult {
    match command {
        GridCommand::Fetch(request) => GridResult::PageLoaded {
            ticket: request.ticket,
            result: service.fetch_page(&request.query, Some(request.cursor)),
        },
        GridCommand::Commit { id, cell_id, value } => GridResult::CommitSettled {
            id: *id,
            result: service.update_cell(cell_id, value),
        },
        GridCommand::CreateRow { table_id } => GridResult::RowCreated(service.create_row(table_id)),
        GridCommand::CreateColumn {
            table_id,
            name,
            column_type,
        } => GridResult::ColumnCreated(service.create_column(table_id, name, *column_type)),
        GridCommand::GenerateRows { job, table_id, count } => GridResult::BulkSettled {
            job: *job,
            result: service.create_bulk_rows(table_id, *count),
        },
        GridCommand::ReloadColumns { table_id } => {
            GridResult::ColumnsLoaded(service.list_columns(table_id))
        }
    }
}

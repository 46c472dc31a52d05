// src/app/events.rs
use crate::data::{Base, BaseId, DataResult, Table, TableId};
use crate::grid::GridResult;
use bevy::prelude::Event;

/// A service answer for the session opened at `epoch` (see `ActiveGrid`).
#[derive(Event, Debug)]
pub struct GridResultEvent {
    pub epoch: u64,
    pub table_id: TableId,
    pub result: GridResult,
}

#[derive(Event, Debug, Clone)]
pub struct OpenTableRequest {
    pub table: Table,
}

#[derive(Event, Debug, Clone)]
pub enum DirectoryRequest {
    Reload,
    CreateTable { base_id: BaseId, name: String },
}

#[derive(Event, Debug)]
pub struct DirectoryLoaded {
    pub result: DataResult<(Vec<Base>, Vec<Table>)>,
    /// Table created by the request, opened once the directory is refreshed.
    pub created: Option<Table>,
}

#[derive(Event, Debug, Clone)]
pub struct GridFeedback {
    pub message: String,
    pub is_error: bool,
}

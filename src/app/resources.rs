// src/app/resources.rs
use crate::data::{Base, DataError, DataResult, SqliteDataService, Table};
use crate::grid::{GridCommand, GridSession};
use bevy::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard};

/// The one SQLite service, shared with blocking worker threads.
#[derive(Resource, Clone)]
pub struct SharedService(pub Arc<Mutex<SqliteDataService>>);

impl SharedService {
    pub fn new(service: SqliteDataService) -> Self {
        Self(Arc::new(Mutex::new(service)))
    }

    pub fn lock(&self) -> DataResult<MutexGuard<'_, SqliteDataService>> {
        self.0
            .lock()
            .map_err(|_| DataError::Transient("database worker panicked".to_string()))
    }
}

/// Session of the open table. Dropped (and replaced) when another table is opened.
///
/// `epoch` changes with every opened session. Commit and fetch ids restart in a new
/// session, so results are matched by epoch, never by table alone.
#[derive(Resource, Default)]
pub struct ActiveGrid {
    pub session: Option<GridSession>,
    epoch: u64,
}

impl ActiveGrid {
    pub fn is_open(&self, table_id: &crate::data::TableId) -> bool {
        self.session.as_ref().map_or(false, |s| s.table_id() == table_id)
    }

    /// Replaces the session and returns the new epoch.
    pub fn open(&mut self, session: GridSession) -> u64 {
        self.epoch += 1;
        self.session = Some(session);
        self.epoch
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The session a result stamped with `epoch` belongs to, if it is still open.
    pub fn session_for(&mut self, epoch: u64) -> Option<&mut GridSession> {
        if epoch == self.epoch {
            self.session.as_mut()
        } else {
            None
        }
    }
}

/// Commands produced this frame, executed by `execute_grid_commands`.
#[derive(Resource, Default, Debug)]
pub struct GridCommandQueue {
    pub commands: Vec<GridCommand>,
}

impl GridCommandQueue {
    pub fn extend(&mut self, commands: impl IntoIterator<Item = GridCommand>) {
        self.commands.extend(commands);
    }
}

/// Bases and tables for the table picker.
#[derive(Resource, Default, Debug, Clone)]
pub struct TableDirectory {
    pub bases: Vec<Base>,
    pub tables: Vec<Table>,
    pub loading: bool,
}

impl TableDirectory {
    pub fn tables_of<'a>(&'a self, base: &'a Base) -> impl Iterator<Item = &'a Table> + 'a {
        self.tables.iter().filter(move |t| t.base_id == base.id)
    }
}

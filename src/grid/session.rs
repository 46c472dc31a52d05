// src/grid/session.rs
// One open table: columns, view parameters, cache, fetching, editing and commits.
//
// The session never talks to the service itself. Inputs and service results go in,
// `GridCommand`s come out, and whoever owns the session executes them.

use super::bulk::BulkTracker;
use super::cache::PageCache;
use super::command::{GridCommand, GridResult};
use super::edit::{EditController, EditInput};
use super::fetch::{FetchEngine, FetchOutcome};
use super::params::{QueryParams, DEFAULT_FILTER_DEBOUNCE};
use super::transaction::{CommitLedger, SettleOutcome};
use super::virtualize::{Virtualizer, VirtualizerConfig, VirtualWindow};
use crate::data::error::DataError;
use crate::data::model::{Column, ColumnId, ColumnType, Table, TableId};
use crate::data::query::DEFAULT_PAGE_SIZE;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub page_size: u32,
    pub filter_debounce: Duration,
    pub virtualizer: VirtualizerConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            filter_debounce: DEFAULT_FILTER_DEBOUNCE,
            virtualizer: VirtualizerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

pub struct GridSession {
    table: Table,
    columns: Vec<Column>,
    params: QueryParams,
    cache: PageCache,
    fetch: FetchEngine,
    virtualizer: Virtualizer,
    editor: EditController,
    ledger: CommitLedger,
    bulk: BulkTracker,
    notices: VecDeque<Notice>,
    /// Why the table cannot be shown, after a failed column load.
    unavailable: Option<String>,
}

impl GridSession {
    pub fn new(table: Table, config: GridConfig) -> Self {
        let params = QueryParams::new(table.id.clone(), config.page_size, config.filter_debounce);
        Self {
            table,
            columns: Vec::new(),
            params,
            cache: PageCache::new(),
            fetch: FetchEngine::new(),
            virtualizer: Virtualizer::new(config.virtualizer),
            editor: EditController::new(),
            ledger: CommitLedger::new(),
            bulk: BulkTracker::new(),
            notices: VecDeque::new(),
            unavailable: None,
        }
    }

    /// Columns first; the first page follows once they are known.
    pub fn open(&mut self) -> Vec<GridCommand> {
        bevy::log::info!("Opening grid for table '{}' ({})", self.table.name, self.table.id);
        vec![GridCommand::ReloadColumns {
            table_id: self.table.id.clone(),
        }]
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_id(&self) -> &TableId {
        &self.table.id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn editor(&self) -> &EditController {
        &self.editor
    }

    pub fn virtualizer(&self) -> &Virtualizer {
        &self.virtualizer
    }

    pub fn window(&self) -> VirtualWindow {
        self.virtualizer.window()
    }

    pub fn unavailable(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.in_flight()
    }

    pub fn is_stalled(&self) -> bool {
        self.fetch.is_stalled()
    }

    pub fn bulk_running(&self) -> bool {
        self.bulk.is_running()
    }

    pub fn pending_commits(&self) -> usize {
        self.ledger.pending_count()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn notify(&mut self, notice: Notice) {
        if notice.is_error() {
            bevy::log::warn!("{}", notice.message);
        } else {
            bevy::log::info!("{}", notice.message);
        }
        self.notices.push_back(notice);
    }

    // ---- view parameters ----

    pub fn set_filter_text(&mut self, text: &str, now: Duration) {
        self.params.set_filter_text(text, now);
    }

    /// Drives the filter debounce. Call once per frame.
    pub fn tick(&mut self, now: Duration) -> Vec<GridCommand> {
        match self.params.poll(now) {
            Some(query) => {
                bevy::log::debug!("Filter now {:?}", query.filter);
                self.invalidate()
            }
            None => Vec::new(),
        }
    }

    pub fn set_filter_column(&mut self, column_id: ColumnId) -> Vec<GridCommand> {
        match self.params.set_filter_column(column_id) {
            Some(_) => self.invalidate(),
            None => Vec::new(),
        }
    }

    pub fn toggle_sort(&mut self, column_id: &ColumnId) -> Vec<GridCommand> {
        self.params.toggle_sort(column_id);
        self.invalidate()
    }

    pub fn clear_sort(&mut self) -> Vec<GridCommand> {
        match self.params.clear_sort() {
            Some(_) => self.invalidate(),
            None => Vec::new(),
        }
    }

    /// Starts a fresh result stream for the current parameters. A draft in progress
    /// is committed first.
    pub fn invalidate(&mut self) -> Vec<GridCommand> {
        let mut commands = Vec::new();
        if self.editor.active().is_some() {
            commands.extend(self.edit(EditInput::Blur));
        }
        self.editor.cancel();
        self.cache.reset(self.params.view_query());
        self.fetch.reset();
        self.virtualizer.reset_measurements();
        self.virtualizer.set_scroll_offset(0.0);
        self.sync_virtualizer();
        commands.extend(self.request_page());
        commands
    }

    // ---- scrolling and fetching ----

    /// Reports the scroll position and viewport height seen by the renderer.
    pub fn on_viewport(&mut self, scroll_offset: f32, viewport_height: f32) -> Vec<GridCommand> {
        self.virtualizer.set_viewport(viewport_height);
        self.virtualizer.set_scroll_offset(scroll_offset);
        self.fetch_if_near_bottom()
    }

    pub fn measure_row(&mut self, index: usize, height: f32) {
        self.virtualizer.measure(index, height);
    }

    /// Clears a stalled fetch and asks for the page again.
    pub fn retry_fetch(&mut self) -> Vec<GridCommand> {
        self.fetch.retry();
        self.request_page()
    }

    fn fetch_if_near_bottom(&mut self) -> Vec<GridCommand> {
        let near = self.virtualizer.should_fetch_more(
            self.cache.len(),
            self.cache.has_more(),
            self.fetch.in_flight(),
        );
        if near && !self.fetch.is_stalled() {
            self.request_page()
        } else {
            Vec::new()
        }
    }

    fn request_page(&mut self) -> Vec<GridCommand> {
        self.fetch
            .request_next(&self.cache)
            .map(GridCommand::Fetch)
            .into_iter()
            .collect()
    }

    fn sync_virtualizer(&mut self) {
        let loader = usize::from(self.cache.has_more());
        self.virtualizer.set_count(self.cache.len() + loader);
    }

    // ---- editing ----

    pub fn edit(&mut self, input: EditInput) -> Vec<GridCommand> {
        let step = self.editor.handle(input, &self.cache, &self.columns);
        let mut commands = Vec::new();
        if let Some(message) = step.rejected {
            self.notify(Notice::error(message));
        }
        if let Some(intent) = step.commit {
            if self.ledger.begin(&mut self.cache, intent.cell_id.clone(), &intent.value).is_none() {
                bevy::log::warn!("Cell {} left the view before commit", intent.cell_id);
            }
            commands.extend(self.dispatch_commits());
        }
        if step.needs_rows {
            let fetch = self.request_page();
            if fetch.is_empty() && !self.fetch.in_flight() {
                self.editor.resume_pending(&self.cache, &self.columns, false);
            }
            commands.extend(fetch);
        }
        self.reveal_active();
        commands
    }

    /// Commits the ledger allows out now, oldest first and one per cell.
    fn dispatch_commits(&mut self) -> Vec<GridCommand> {
        self.ledger
            .ready()
            .into_iter()
            .map(|ready| GridCommand::Commit {
                id: ready.id,
                cell_id: ready.cell_id,
                value: ready.value,
            })
            .collect()
    }

    fn reveal_active(&mut self) {
        if let Some(row_index) = self.editor.active().map(|e| e.row_index) {
            self.virtualizer.scroll_to_reveal(row_index);
        }
    }

    // ---- structural changes ----

    pub fn add_row(&mut self) -> Vec<GridCommand> {
        vec![GridCommand::CreateRow {
            table_id: self.table.id.clone(),
        }]
    }

    pub fn add_column(&mut self, name: &str, column_type: ColumnType) -> Vec<GridCommand> {
        let name = name.trim();
        if name.is_empty() {
            self.notify(Notice::error("Column name cannot be empty"));
            return Vec::new();
        }
        vec![GridCommand::CreateColumn {
            table_id: self.table.id.clone(),
            name: name.to_string(),
            column_type,
        }]
    }

    pub fn generate_rows(&mut self, count: u64) -> Vec<GridCommand> {
        match self.bulk.start(count) {
            Ok(job) => {
                self.notify(Notice::info(format!("Generating {} rows...", count)));
                vec![GridCommand::GenerateRows {
                    job: job.id,
                    table_id: self.table.id.clone(),
                    count,
                }]
            }
            Err(e) => {
                self.notify(Notice::error(e.user_message()));
                Vec::new()
            }
        }
    }

    // ---- service results ----

    pub fn apply(&mut self, result: GridResult) -> Vec<GridCommand> {
        match result {
            GridResult::PageLoaded { ticket, result } => {
                match self.fetch.complete(ticket, result, &mut self.cache) {
                    FetchOutcome::Applied(_) => {
                        self.sync_virtualizer();
                        let mut commands = Vec::new();
                        if self.editor.resume_pending(&self.cache, &self.columns, true) {
                            commands.extend(self.request_page());
                        } else {
                            self.reveal_active();
                            commands.extend(self.fetch_if_near_bottom());
                        }
                        commands
                    }
                    FetchOutcome::Failed(e) => {
                        self.notify(Notice::error(format!("Could not load rows: {}", e.user_message())));
                        self.editor.resume_pending(&self.cache, &self.columns, false);
                        self.reveal_active();
                        Vec::new()
                    }
                    FetchOutcome::Stale => Vec::new(),
                }
            }
            GridResult::CommitSettled { id, result } => {
                let outcome = self.ledger.settle(&mut self.cache, id, &result);
                if let (Some(SettleOutcome::RolledBack { .. } | SettleOutcome::Superseded { .. }), Err(e)) =
                    (&outcome, &result)
                {
                    self.notify(Notice::error(format!("Edit was not saved: {}", e.user_message())));
                }
                self.dispatch_commits()
            }
            GridResult::RowCreated(result) => match result {
                Ok(row) => {
                    bevy::log::debug!("Row {} created", row.id);
                    self.invalidate()
                }
                Err(e) => {
                    self.notify(Notice::error(format!("Could not add row: {}", e.user_message())));
                    Vec::new()
                }
            },
            GridResult::ColumnCreated(result) => match result {
                Ok(column) => {
                    self.notify(Notice::info(format!("Added column '{}'", column.name)));
                    vec![GridCommand::ReloadColumns {
                        table_id: self.table.id.clone(),
                    }]
                }
                Err(e) => {
                    self.notify(Notice::error(format!("Could not add column: {}", e.user_message())));
                    Vec::new()
                }
            },
            GridResult::ColumnsLoaded(result) => match result {
                Ok(mut columns) => {
                    columns.sort_by_key(|c| c.order);
                    self.unavailable = None;
                    self.params.sync_columns(&columns);
                    self.columns = columns;
                    self.invalidate()
                }
                Err(e) => {
                    let message = match e {
                        DataError::NotFound(_) => format!("Table '{}' no longer exists", self.table.name),
                        other => format!("Could not load columns: {}", other.user_message()),
                    };
                    if self.columns.is_empty() {
                        self.unavailable = Some(message.clone());
                    }
                    self.notify(Notice::error(message));
                    Vec::new()
                }
            },
            GridResult::BulkSettled { job, result } => match self.bulk.settle(job, &result) {
                Some((_, message, is_error)) => {
                    self.notify(if is_error {
                        Notice::error(message)
                    } else {
                        Notice::info(message)
                    });
                    self.invalidate()
                }
                None => Vec::new(),
            },
        }
    }
}

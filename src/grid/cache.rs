// src/grid/cache.rs
// Fetched pages of the active view, flattened into one ordered row sequence.

use crate::data::model::{Cell, CellId, Row, RowId};
use crate::data::query::{Cursor, Page, ViewQuery};
use std::collections::HashSet;

/// Prior state of one cell, captured by `point_update` and consumed by `restore`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSnapshot {
    pub cell_id: CellId,
    pub prior: String,
    pub applied: String,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Applied { added: usize, skipped: usize },
    /// The page does not start where the cache expects the next page to start.
    OutOfOrder { expected: Option<Cursor>, got: Cursor },
    /// No query is active, or the cache already holds the final page.
    Closed,
}

#[derive(Debug, Default)]
pub struct PageCache {
    query: Option<ViewQuery>,
    rows: Vec<Row>,
    row_ids: HashSet<RowId>,
    /// Number of rows each applied page contributed, in arrival order.
    page_lengths: Vec<usize>,
    next_cursor: Option<Cursor>,
    total_count: u64,
    pages_loaded: usize,
    generation: u64,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything and starts a new result stream for `query`.
    pub fn reset(&mut self, query: ViewQuery) {
        self.query = Some(query);
        self.rows.clear();
        self.row_ids.clear();
        self.page_lengths.clear();
        self.next_cursor = Some(Cursor::START);
        self.total_count = 0;
        self.pages_loaded = 0;
        self.generation += 1;
    }

    pub fn query(&self) -> Option<&ViewQuery> {
        self.query.as_ref()
    }

    /// Bumped on every reset; snapshots from older generations no longer apply.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn append_page(&mut self, page: Page) -> AppendOutcome {
        if self.query.is_none() {
            return AppendOutcome::Closed;
        }
        let Some(expected) = self.next_cursor else {
            return AppendOutcome::Closed;
        };
        if page.cursor != expected {
            bevy::log::warn!(
                "Discarding page at cursor {} (expected {})",
                page.cursor.offset(),
                expected.offset()
            );
            return AppendOutcome::OutOfOrder {
                expected: Some(expected),
                got: page.cursor,
            };
        }

        let mut added = 0;
        let mut skipped = 0;
        for row in page.rows {
            if self.row_ids.insert(row.id.clone()) {
                self.rows.push(row);
                added += 1;
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            bevy::log::debug!("Skipped {} rows already cached (rows shifted between pages)", skipped);
        }
        self.page_lengths.push(added);
        self.next_cursor = page.next_cursor;
        self.total_count = page.total_count;
        self.pages_loaded += 1;
        AppendOutcome::Applied { added, skipped }
    }

    /// Flattened rows in page-arrival order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True until the final page has been applied (also before the first one).
    pub fn has_more(&self) -> bool {
        self.query.is_some() && self.next_cursor.is_some()
    }

    pub fn next_cursor(&self) -> Option<Cursor> {
        self.next_cursor
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn page_lengths(&self) -> &[usize] {
        &self.page_lengths
    }

    pub fn cell(&self, cell_id: &CellId) -> Option<&Cell> {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .find(|c| &c.id == cell_id)
    }

    fn cell_mut(&mut self, cell_id: &CellId) -> Option<&mut Cell> {
        self.rows
            .iter_mut()
            .flat_map(|r| r.cells.iter_mut())
            .find(|c| &c.id == cell_id)
    }

    /// Overwrites one cached cell value; rows and page boundaries are untouched.
    /// Returns `None` when the cell is not part of the cached view.
    pub fn point_update(&mut self, cell_id: &CellId, value: &str) -> Option<CellSnapshot> {
        let generation = self.generation;
        let cell = self.cell_mut(cell_id)?;
        let prior = std::mem::replace(&mut cell.value, value.to_string());
        Some(CellSnapshot {
            cell_id: cell_id.clone(),
            prior,
            applied: value.to_string(),
            generation,
        })
    }

    /// Puts a snapshot's prior value back. Skipped when the view was reset since the
    /// snapshot was taken, or when the cell no longer holds the snapshot's value.
    pub fn restore(&mut self, snapshot: &CellSnapshot) -> bool {
        if snapshot.generation != self.generation {
            return false;
        }
        match self.cell_mut(&snapshot.cell_id) {
            Some(cell) if cell.value == snapshot.applied => {
                cell.value = snapshot.prior.clone();
                true
            }
            _ => false,
        }
    }
}

// src/grid/edit.rs
// Which cell is being edited, its draft, and keyboard navigation between cells.

use super::cache::PageCache;
use crate::data::model::{CellId, Column, ColumnId, ColumnType, RowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row_index: usize,
    pub column_index: usize,
}

impl CellPosition {
    pub fn new(row_index: usize, column_index: usize) -> Self {
        Self { row_index, column_index }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEdit {
    pub row_id: RowId,
    pub column_id: ColumnId,
    pub cell_id: CellId,
    pub row_index: usize,
    pub column_index: usize,
    pub column_type: ColumnType,
    pub draft: String,
}

impl ActiveEdit {
    pub fn position(&self) -> CellPosition {
        CellPosition::new(self.row_index, self.column_index)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing(ActiveEdit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditInput {
    Click(CellPosition),
    Draft(String),
    Blur,
    Enter { shift: bool },
    Tab { shift: bool },
    Escape,
    Arrow(Direction),
}

/// A value the session should send to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitIntent {
    pub cell_id: CellId,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditStep {
    pub commit: Option<CommitIntent>,
    /// Draft rejected before dispatch; the cell stays in edit mode.
    pub rejected: Option<String>,
    /// Navigation target lies past the loaded rows; a page is needed.
    pub needs_rows: bool,
}

#[derive(Debug, Default)]
pub struct EditController {
    state: EditState,
    pending_target: Option<CellPosition>,
}

impl EditController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveEdit> {
        match &self.state {
            EditState::Editing(edit) => Some(edit),
            EditState::Idle => None,
        }
    }

    pub fn is_editing(&self, position: CellPosition) -> bool {
        self.active().map_or(false, |e| e.position() == position)
    }

    pub fn pending_target(&self) -> Option<CellPosition> {
        self.pending_target
    }

    pub fn handle(&mut self, input: EditInput, cache: &PageCache, columns: &[Column]) -> EditStep {
        match input {
            EditInput::Draft(text) => {
                if let EditState::Editing(edit) = &mut self.state {
                    edit.draft = text;
                }
                EditStep::default()
            }
            EditInput::Escape => {
                if let Some(edit) = self.active() {
                    bevy::log::debug!("Discarding draft for cell {}", edit.cell_id);
                }
                self.state = EditState::Idle;
                self.pending_target = None;
                EditStep::default()
            }
            EditInput::Blur => self.commit_and_move(cache, columns, None),
            EditInput::Click(position) => {
                if self.is_editing(position) {
                    return EditStep::default();
                }
                self.commit_and_move(cache, columns, Some(position))
            }
            EditInput::Enter { shift } => {
                let target = self.active().map(|e| {
                    let row = if shift {
                        e.row_index.saturating_sub(1)
                    } else {
                        e.row_index + 1
                    };
                    CellPosition::new(row, e.column_index)
                });
                self.commit_and_move(cache, columns, target)
            }
            EditInput::Tab { shift } => {
                let target = self
                    .active()
                    .map(|e| tab_target(e.position(), columns.len(), shift));
                self.commit_and_move(cache, columns, target)
            }
            EditInput::Arrow(direction) => {
                let last_column = columns.len().saturating_sub(1);
                let target = self.active().map(|e| {
                    let (row, col) = (e.row_index, e.column_index);
                    match direction {
                        Direction::Up => CellPosition::new(row.saturating_sub(1), col),
                        Direction::Down => CellPosition::new(row + 1, col),
                        Direction::Left => CellPosition::new(row, col.saturating_sub(1)),
                        Direction::Right => CellPosition::new(row, (col + 1).min(last_column)),
                    }
                });
                self.commit_and_move(cache, columns, target)
            }
        }
    }

    /// Called after a page landed or the fetch for it gave up (`can_fetch == false`).
    /// Returns true while the target still waits for rows.
    pub fn resume_pending(&mut self, cache: &PageCache, columns: &[Column], can_fetch: bool) -> bool {
        let Some(target) = self.pending_target else {
            return false;
        };
        if target.row_index >= cache.len() && can_fetch && cache.has_more() {
            return true;
        }
        self.pending_target = None;
        if cache.is_empty() {
            return false;
        }
        let row_index = target.row_index.min(cache.len() - 1);
        self.open(cache, columns, CellPosition::new(row_index, target.column_index));
        false
    }

    /// Drops the edit and any pending target, e.g. when the view is reset.
    pub fn cancel(&mut self) {
        self.state = EditState::Idle;
        self.pending_target = None;
    }

    fn commit_and_move(
        &mut self,
        cache: &PageCache,
        columns: &[Column],
        target: Option<CellPosition>,
    ) -> EditStep {
        let mut step = EditStep::default();
        let leaving = self.active().map(|e| (e.position(), e.draft.clone()));
        if let Some(edit) = self.active() {
            if !edit.column_type.accepts(&edit.draft) {
                step.rejected = Some(format!("'{}' is not a number", edit.draft.trim()));
                return step;
            }
            let committed = cache.cell(&edit.cell_id).map(|c| c.value.as_str());
            if committed != Some(edit.draft.as_str()) {
                step.commit = Some(CommitIntent {
                    cell_id: edit.cell_id.clone(),
                    value: edit.draft.clone(),
                });
            }
        }
        self.state = EditState::Idle;
        self.pending_target = None;

        if let Some(target) = target {
            if target.row_index < cache.len() {
                self.open(cache, columns, target);
            } else if cache.has_more() {
                self.pending_target = Some(target);
                step.needs_rows = true;
            } else if !cache.is_empty() {
                let clamped = CellPosition::new(cache.len() - 1, target.column_index);
                self.open(cache, columns, clamped);
            }
        }
        // Navigation that lands back on the same cell keeps what was typed; the
        // cache only receives the committed value after this returns.
        if let (Some((position, draft)), EditState::Editing(edit)) = (leaving, &mut self.state) {
            if edit.position() == position {
                edit.draft = draft;
            }
        }
        step
    }

    fn open(&mut self, cache: &PageCache, columns: &[Column], position: CellPosition) {
        let Some(row) = cache.row(position.row_index) else {
            return;
        };
        if columns.is_empty() {
            return;
        }
        let column_index = position.column_index.min(columns.len() - 1);
        let column = &columns[column_index];
        let Some(cell) = row.cell_for(&column.id) else {
            bevy::log::warn!("Row {} has no cell for column {}", row.id, column.id);
            return;
        };
        self.state = EditState::Editing(ActiveEdit {
            row_id: row.id.clone(),
            column_id: column.id.clone(),
            cell_id: cell.id.clone(),
            row_index: position.row_index,
            column_index,
            column_type: column.column_type,
            draft: cell.value.clone(),
        });
    }
}

fn tab_target(from: CellPosition, column_count: usize, shift: bool) -> CellPosition {
    let last_column = column_count.saturating_sub(1);
    if shift {
        if from.column_index > 0 {
            CellPosition::new(from.row_index, from.column_index - 1)
        } else if from.row_index > 0 {
            CellPosition::new(from.row_index - 1, last_column)
        } else {
            from
        }
    } else if from.column_index < last_column {
        CellPosition::new(from.row_index, from.column_index + 1)
    } else {
        CellPosition::new(from.row_index + 1, 0)
    }
}

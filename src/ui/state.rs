// src/ui/state.rs
use crate::data::{BaseId, CellId, ColumnId, ColumnType, Table, TableId};
use crate::grid::EditInput;
use crate::settings::FpsSetting;
use bevy::prelude::Resource;

/// Form fields and focus bookkeeping of the grid window.
#[derive(Resource, Debug, Clone)]
pub struct GridUiState {
    /// Table the fields below belong to; they reset when another table opens.
    pub table_id: Option<TableId>,
    pub filter_text: String,
    pub new_column_name: String,
    pub new_column_type: ColumnType,
    pub generate_count: String,
    pub new_table_name: String,
    /// Cell whose editor already received keyboard focus.
    pub focused_cell: Option<CellId>,
    /// Scroll offset the grid reported last frame.
    pub last_offset: f32,
}

impl Default for GridUiState {
    fn default() -> Self {
        Self {
            table_id: None,
            filter_text: String::new(),
            new_column_name: String::new(),
            new_column_type: ColumnType::Text,
            generate_count: "1000".to_string(),
            new_table_name: String::new(),
            focused_cell: None,
            last_offset: 0.0,
        }
    }
}

impl GridUiState {
    pub fn sync_table(&mut self, table_id: Option<&TableId>) {
        if self.table_id.as_ref() != table_id {
            *self = Self {
                table_id: table_id.cloned(),
                generate_count: std::mem::take(&mut self.generate_count),
                ..Self::default()
            };
        }
    }
}

/// Everything the window asks for in one frame, applied after drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Edit(EditInput),
    ToggleSort(ColumnId),
    ClearSort,
    SetFilterText(String),
    SetFilterColumn(ColumnId),
    Viewport { offset: f32, height: f32 },
    Measure { index: usize, height: f32 },
    RetryFetch,
    AddRow,
    AddColumn { name: String, column_type: ColumnType },
    GenerateRows(u64),
    OpenTable(Table),
    ReloadTables,
    CreateTable { base_id: BaseId, name: String },
    SetFps(FpsSetting),
    Feedback { message: String, is_error: bool },
}

// src/data/model.rs
// Entities stored by the data service and carried through the grid.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Fresh random identity.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

entity_id!(BaseId);
entity_id!(TableId);
entity_id!(ColumnId);
entity_id!(RowId);
entity_id!(CellId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
        }
    }

    pub fn parse(s: &str) -> Option<ColumnType> {
        match s.trim() {
            "text" | "Text" | "string" | "String" => Some(ColumnType::Text),
            "number" | "Number" | "numeric" | "F64" | "I64" => Some(ColumnType::Number),
            _ => None,
        }
    }

    /// Whether `value` is acceptable as the committed content of a cell of this type.
    /// The empty string always is (no value).
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ColumnType::Text => true,
            ColumnType::Number => {
                let trimmed = value.trim();
                trimmed.is_empty() || trimmed.parse::<f64>().map_or(false, |n| n.is_finite())
            }
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub id: BaseId,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub base_id: BaseId,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub table_id: TableId,
    pub name: String,
    pub column_type: ColumnType,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub row_id: RowId,
    pub column_id: ColumnId,
    /// Empty string means "no value".
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub table_id: TableId,
    /// Creation sequence within the table.
    pub seq: i64,
    /// One cell per column, in column order.
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn cell_for(&self, column_id: &ColumnId) -> Option<&Cell> {
        self.cells.iter().find(|c| &c.column_id == column_id)
    }

    pub fn value_for(&self, column_id: &ColumnId) -> &str {
        self.cell_for(column_id).map_or("", |c| c.value.as_str())
    }
}

/// Columns every new table starts with.
pub const DEFAULT_COLUMNS: [(&str, ColumnType); 3] = [
    ("Name", ColumnType::Text),
    ("Notes", ColumnType::Text),
    ("Amount", ColumnType::Number),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_columns_accept_blank_and_numeric_only() {
        assert!(ColumnType::Number.accepts(""));
        assert!(ColumnType::Number.accepts(" 42 "));
        assert!(ColumnType::Number.accepts("-3.5"));
        assert!(!ColumnType::Number.accepts("ten"));
        assert!(!ColumnType::Number.accepts("inf"));
        assert!(ColumnType::Text.accepts("anything"));
    }

    #[test]
    fn column_type_parse_accepts_storage_names() {
        assert_eq!(ColumnType::parse("text"), Some(ColumnType::Text));
        assert_eq!(ColumnType::parse("number"), Some(ColumnType::Number));
        assert_eq!(ColumnType::parse("date"), None);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(CellId::generate(), CellId::generate());
    }
}

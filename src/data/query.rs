// src/data/query.rs
// View descriptors and the page shape returned by `fetch_page`.

use super::error::{DataError, DataResult};
use super::model::{ColumnId, Row, TableId};
use serde::{Deserialize, Serialize};

pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub column_id: ColumnId,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    pub column_id: ColumnId,
    /// Case-insensitive substring to look for. Never empty.
    pub text: String,
}

/// One distinct paginated result stream. Changing any field means a new stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewQuery {
    pub table_id: TableId,
    pub filter: Option<FilterSpec>,
    pub sort: Option<SortSpec>,
    pub page_size: u32,
}

impl ViewQuery {
    pub fn new(table_id: TableId, page_size: u32) -> Self {
        Self {
            table_id,
            filter: None,
            sort: None,
            page_size: clamp_page_size(page_size),
        }
    }

    /// Sets the filter; blank text means no filter at all.
    pub fn with_filter(mut self, column_id: ColumnId, text: &str) -> Self {
        self.filter = if text.trim().is_empty() {
            None
        } else {
            Some(FilterSpec {
                column_id,
                text: text.to_string(),
            })
        };
        self
    }

    pub fn with_sort(mut self, column_id: ColumnId, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec { column_id, direction });
        self
    }

    pub fn validate(&self) -> DataResult<()> {
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(DataError::Validation(format!(
                "Page size {} outside {}..={}",
                self.page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }
}

pub fn clamp_page_size(size: u32) -> u32 {
    size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// Resume position inside a result stream. Offsets advance by the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Cursor(pub u64);

impl Cursor {
    pub const START: Cursor = Cursor(0);

    pub fn offset(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Cursor this page was requested at.
    pub cursor: Cursor,
    pub rows: Vec<Row>,
    pub next_cursor: Option<Cursor>,
    /// Rows matching the query, ignoring pagination.
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filter_text_means_no_filter() {
        let q = ViewQuery::new(TableId::from("t"), 50).with_filter(ColumnId::from("c"), "   ");
        assert!(q.filter.is_none());
        let q = q.with_filter(ColumnId::from("c"), "ab");
        assert_eq!(q.filter.as_ref().map(|f| f.text.as_str()), Some("ab"));
    }

    #[test]
    fn constructor_clamps_page_size_but_validate_rejects_raw_values() {
        assert_eq!(ViewQuery::new(TableId::from("t"), 0).page_size, 1);
        assert_eq!(ViewQuery::new(TableId::from("t"), 5000).page_size, 100);
        let mut q = ViewQuery::new(TableId::from("t"), 10);
        q.page_size = 101;
        assert!(matches!(q.validate(), Err(DataError::Validation(_))));
    }
}

// src/grid/params.rs
// Filter text, filter column and sort of the open table, with a debounced filter.

use crate::data::model::{Column, ColumnId, ColumnType, TableId};
use crate::data::query::{SortDirection, SortSpec, ViewQuery};
use std::time::Duration;

pub const DEFAULT_FILTER_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct QueryParams {
    table_id: TableId,
    page_size: u32,
    debounce: Duration,
    raw_filter: String,
    effective_filter: String,
    /// Time of the last keystroke that has not been made effective yet.
    last_keystroke: Option<Duration>,
    filter_column: Option<ColumnId>,
    default_filter_column: Option<ColumnId>,
    sort: Option<SortSpec>,
}

impl QueryParams {
    pub fn new(table_id: TableId, page_size: u32, debounce: Duration) -> Self {
        Self {
            table_id,
            page_size,
            debounce,
            raw_filter: String::new(),
            effective_filter: String::new(),
            last_keystroke: None,
            filter_column: None,
            default_filter_column: None,
            sort: None,
        }
    }

    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    pub fn raw_filter(&self) -> &str {
        &self.raw_filter
    }

    pub fn effective_filter(&self) -> &str {
        &self.effective_filter
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Picks the first text column as the fallback filter column, and drops
    /// choices that refer to columns which no longer exist.
    /// Returns true when the effective query changed.
    pub fn sync_columns(&mut self, columns: &[Column]) -> bool {
        let before = self.view_query();
        self.default_filter_column = columns
            .iter()
            .find(|c| c.column_type == ColumnType::Text)
            .map(|c| c.id.clone());
        let exists = |id: &ColumnId| columns.iter().any(|c| &c.id == id);
        if self.filter_column.as_ref().map_or(false, |id| !exists(id)) {
            self.filter_column = None;
        }
        if self.sort.as_ref().map_or(false, |s| !exists(&s.column_id)) {
            self.sort = None;
        }
        before != self.view_query()
    }

    pub fn filter_column(&self) -> Option<&ColumnId> {
        self.filter_column.as_ref().or(self.default_filter_column.as_ref())
    }

    /// Records a keystroke. The text becomes effective once `poll` sees a quiet period.
    pub fn set_filter_text(&mut self, text: &str, now: Duration) {
        if text == self.raw_filter {
            return;
        }
        self.raw_filter = text.to_string();
        self.last_keystroke = Some(now);
    }

    /// Whether a keystroke is still waiting for its quiet period.
    pub fn filter_pending(&self) -> bool {
        self.last_keystroke.is_some()
    }

    /// Promotes the raw filter text once the debounce elapsed.
    /// Returns the new query only if the effective query actually changed.
    pub fn poll(&mut self, now: Duration) -> Option<ViewQuery> {
        let typed_at = self.last_keystroke?;
        if now.saturating_sub(typed_at) < self.debounce {
            return None;
        }
        self.last_keystroke = None;
        let before = self.view_query();
        self.effective_filter = self.raw_filter.clone();
        let after = self.view_query();
        (before != after).then_some(after)
    }

    /// Returns the new query if the change affects the effective query.
    pub fn set_filter_column(&mut self, column_id: ColumnId) -> Option<ViewQuery> {
        let before = self.view_query();
        self.filter_column = Some(column_id);
        let after = self.view_query();
        (before != after).then_some(after)
    }

    /// none -> asc -> desc -> none on the same column; another column starts at asc.
    pub fn toggle_sort(&mut self, column_id: &ColumnId) -> ViewQuery {
        self.sort = match self.sort.take() {
            Some(SortSpec { column_id: current, direction }) if &current == column_id => {
                match direction {
                    SortDirection::Asc => Some(SortSpec {
                        column_id: current,
                        direction: SortDirection::Desc,
                    }),
                    SortDirection::Desc => None,
                }
            }
            _ => Some(SortSpec {
                column_id: column_id.clone(),
                direction: SortDirection::Asc,
            }),
        };
        self.view_query()
    }

    pub fn clear_sort(&mut self) -> Option<ViewQuery> {
        self.sort.take().map(|_| self.view_query())
    }

    pub fn view_query(&self) -> ViewQuery {
        let mut query = ViewQuery::new(self.table_id.clone(), self.page_size);
        if let Some(column_id) = self.filter_column() {
            query = query.with_filter(column_id.clone(), &self.effective_filter);
        }
        if let Some(sort) = &self.sort {
            query = query.with_sort(sort.column_id.clone(), sort.direction);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        let table_id = TableId::from("t");
        vec![
            Column {
                id: ColumnId::from("amount"),
                table_id: table_id.clone(),
                name: "Amount".into(),
                column_type: ColumnType::Number,
                order: 0,
            },
            Column {
                id: ColumnId::from("name"),
                table_id,
                name: "Name".into(),
                column_type: ColumnType::Text,
                order: 1,
            },
        ]
    }

    fn params() -> QueryParams {
        let mut p = QueryParams::new(TableId::from("t"), 50, DEFAULT_FILTER_DEBOUNCE);
        p.sync_columns(&columns());
        p
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_text_column_is_the_default_filter_column() {
        let p = params();
        assert_eq!(p.filter_column(), Some(&ColumnId::from("name")));
    }

    #[test]
    fn filter_waits_for_quiet_period() {
        let mut p = params();
        p.set_filter_text("a", ms(0));
        p.set_filter_text("ad", ms(100));
        assert!(p.poll(ms(350)).is_none());
        assert!(p.filter_pending());

        let query = p.poll(ms(400)).unwrap();
        let filter = query.filter.unwrap();
        assert_eq!(filter.text, "ad");
        assert_eq!(filter.column_id, ColumnId::from("name"));
        assert!(!p.filter_pending());
        assert!(p.poll(ms(1000)).is_none());
    }

    #[test]
    fn retyping_the_same_filter_reports_nothing() {
        let mut p = params();
        p.set_filter_text("x", ms(0));
        assert!(p.poll(ms(300)).is_some());
        p.set_filter_text("xy", ms(400));
        p.set_filter_text("x", ms(450));
        assert!(p.poll(ms(800)).is_none());
    }

    #[test]
    fn sort_toggle_cycles() {
        let mut p = params();
        let amount = ColumnId::from("amount");
        let q = p.toggle_sort(&amount);
        assert_eq!(q.sort.as_ref().map(|s| s.direction), Some(SortDirection::Asc));
        let q = p.toggle_sort(&amount);
        assert_eq!(q.sort.as_ref().map(|s| s.direction), Some(SortDirection::Desc));
        let q = p.toggle_sort(&amount);
        assert!(q.sort.is_none());

        p.toggle_sort(&amount);
        let q = p.toggle_sort(&ColumnId::from("name"));
        let sort = q.sort.unwrap();
        assert_eq!(sort.column_id, ColumnId::from("name"));
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn filter_column_change_matters_only_with_filter_text() {
        let mut p = params();
        assert!(p.set_filter_column(ColumnId::from("amount")).is_none());
        p.set_filter_text("4", ms(0));
        p.poll(ms(300));
        let q = p.set_filter_column(ColumnId::from("name")).unwrap();
        assert_eq!(q.filter.unwrap().column_id, ColumnId::from("name"));
    }

    #[test]
    fn vanished_sort_column_is_dropped() {
        let mut p = params();
        p.toggle_sort(&ColumnId::from("amount"));
        let remaining: Vec<Column> = columns().into_iter().skip(1).collect();
        assert!(p.sync_columns(&remaining));
        assert!(p.sort().is_none());
    }
}

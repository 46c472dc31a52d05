// src/grid/virtualize.rs
// Windowing math: which rows to materialise for a viewport, and where they sit.

use std::collections::BTreeMap;
use std::ops::Range;

pub const DEFAULT_ROW_HEIGHT: f32 = 28.0;
pub const DEFAULT_OVERSCAN: usize = 5;
pub const DEFAULT_FETCH_THRESHOLD_PX: f32 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualizerConfig {
    pub estimated_row_height: f32,
    pub overscan: usize,
    pub fetch_threshold_px: f32,
}

impl Default for VirtualizerConfig {
    fn default() -> Self {
        Self {
            estimated_row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            fetch_threshold_px: DEFAULT_FETCH_THRESHOLD_PX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualRow {
    pub index: usize,
    pub start: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualWindow {
    pub range: Range<usize>,
    pub rows: Vec<VirtualRow>,
    pub total_height: f32,
}

#[derive(Debug, Clone)]
pub struct Virtualizer {
    config: VirtualizerConfig,
    count: usize,
    viewport_height: f32,
    scroll_offset: f32,
    /// Rendered heights that differ from the estimate.
    measured: BTreeMap<usize, f32>,
}

impl Virtualizer {
    pub fn new(config: VirtualizerConfig) -> Self {
        let estimated_row_height = if config.estimated_row_height > 0.0 {
            config.estimated_row_height
        } else {
            DEFAULT_ROW_HEIGHT
        };
        Self {
            config: VirtualizerConfig {
                estimated_row_height,
                ..config
            },
            count: 0,
            viewport_height: 0.0,
            scroll_offset: 0.0,
            measured: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &VirtualizerConfig {
        &self.config
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Row count including the loader slot, if any.
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        self.measured.retain(|&i, _| i < count);
        self.clamp_offset();
    }

    pub fn set_viewport(&mut self, height: f32) {
        self.viewport_height = height.max(0.0);
        self.clamp_offset();
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset;
        self.clamp_offset();
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn measure(&mut self, index: usize, height: f32) {
        if index >= self.count || height <= 0.0 {
            return;
        }
        if (height - self.config.estimated_row_height).abs() < f32::EPSILON {
            self.measured.remove(&index);
        } else {
            self.measured.insert(index, height);
        }
    }

    /// Forget measurements, e.g. after the row set changed.
    pub fn reset_measurements(&mut self) {
        self.measured.clear();
    }

    pub fn row_height(&self, index: usize) -> f32 {
        self.measured
            .get(&index)
            .copied()
            .unwrap_or(self.config.estimated_row_height)
    }

    /// Offset of the top edge of row `index` (`index == count` gives the total height).
    pub fn row_start(&self, index: usize) -> f32 {
        let index = index.min(self.count);
        let estimate = self.config.estimated_row_height;
        let delta: f32 = self
            .measured
            .range(..index)
            .map(|(_, h)| h - estimate)
            .sum();
        index as f32 * estimate + delta
    }

    pub fn total_height(&self) -> f32 {
        self.row_start(self.count)
    }

    pub fn max_scroll_offset(&self) -> f32 {
        (self.total_height() - self.viewport_height).max(0.0)
    }

    /// Index of the row covering `offset`.
    pub fn index_at(&self, offset: f32) -> usize {
        if self.count == 0 {
            return 0;
        }
        if self.measured.is_empty() {
            let index = (offset / self.config.estimated_row_height).floor().max(0.0) as usize;
            return index.min(self.count - 1);
        }
        let (mut lo, mut hi) = (0usize, self.count - 1);
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if self.row_start(mid) <= offset {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }

    pub fn window(&self) -> VirtualWindow {
        let total_height = self.total_height();
        if self.count == 0 {
            return VirtualWindow {
                range: 0..0,
                rows: Vec::new(),
                total_height,
            };
        }
        let first = self.index_at(self.scroll_offset);
        let viewport_bottom = self.scroll_offset + self.viewport_height;
        let mut end = first;
        while end < self.count && self.row_start(end) < viewport_bottom {
            end += 1;
        }
        let start = first.saturating_sub(self.config.overscan);
        let end = (end + self.config.overscan).min(self.count);
        let rows = (start..end)
            .map(|index| VirtualRow {
                index,
                start: self.row_start(index),
                height: self.row_height(index),
            })
            .collect();
        VirtualWindow {
            range: start..end,
            rows,
            total_height,
        }
    }

    /// Whether the viewport bottom came within the threshold of the last loaded row.
    pub fn should_fetch_more(&self, loaded: usize, has_more: bool, in_flight: bool) -> bool {
        if !has_more || in_flight {
            return false;
        }
        let loaded_bottom = self.row_start(loaded);
        let viewport_bottom = self.scroll_offset + self.viewport_height;
        loaded_bottom - viewport_bottom <= self.config.fetch_threshold_px
    }

    /// Smallest scroll change that brings row `index` fully into view.
    pub fn scroll_to_reveal(&mut self, index: usize) {
        if index >= self.count {
            return;
        }
        let top = self.row_start(index);
        let bottom = top + self.row_height(index);
        if top < self.scroll_offset {
            self.set_scroll_offset(top);
        } else if bottom > self.scroll_offset + self.viewport_height {
            self.set_scroll_offset(bottom - self.viewport_height);
        }
    }

    fn clamp_offset(&mut self) {
        let max = self.max_scroll_offset();
        self.scroll_offset = self.scroll_offset.clamp(0.0, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn virtualizer(count: usize, viewport: f32, overscan: usize) -> Virtualizer {
        let mut v = Virtualizer::new(VirtualizerConfig {
            estimated_row_height: 20.0,
            overscan,
            fetch_threshold_px: 300.0,
        });
        v.set_count(count);
        v.set_viewport(viewport);
        v
    }

    #[test]
    fn window_size_is_visible_rows_plus_overscan() {
        let mut v = virtualizer(1000, 200.0, 3);
        v.set_scroll_offset(2000.0);
        let w = v.window();
        // ceil(200/20) + 2*3
        assert_eq!(w.range, 97..113);
        assert_eq!(w.rows.len(), 16);
        assert_eq!(w.rows[0].start, 97.0 * 20.0);
        assert_eq!(w.total_height, 20_000.0);
    }

    #[test]
    fn window_is_clamped_to_row_count() {
        let v = virtualizer(4, 200.0, 3);
        assert_eq!(v.window().range, 0..4);

        let mut v = virtualizer(1000, 200.0, 3);
        v.set_scroll_offset(1e9);
        assert_eq!(v.scroll_offset(), 20_000.0 - 200.0);
        let w = v.window();
        assert_eq!(w.range.end, 1000);
        assert!(w.range.start <= 990 - 3);

        assert_eq!(virtualizer(0, 200.0, 3).window().range, 0..0);
    }

    #[test]
    fn mid_row_offset_keeps_partly_visible_bottom_row() {
        let mut v = virtualizer(100, 200.0, 0);
        v.set_scroll_offset(10.0);
        // Row 0 shows its lower half, row 10 its upper half.
        assert_eq!(v.window().range, 0..11);

        v.measure(3, 45.0);
        v.set_scroll_offset(30.0);
        // Rows 1..=10 cover 20..245; the viewport ends at 230.
        assert_eq!(v.window().range, 1..11);
    }

    #[test]
    fn negative_offset_clamps_to_top() {
        let mut v = virtualizer(100, 200.0, 0);
        v.set_scroll_offset(-50.0);
        assert_eq!(v.scroll_offset(), 0.0);
        assert_eq!(v.window().range, 0..10);
    }

    #[test]
    fn measured_heights_shift_later_rows() {
        let mut v = virtualizer(100, 200.0, 0);
        v.measure(2, 50.0);
        assert_eq!(v.row_start(3), 90.0);
        assert_eq!(v.total_height(), 100.0 * 20.0 + 30.0);
        assert_eq!(v.index_at(85.0), 2);
        assert_eq!(v.index_at(95.0), 3);
        v.measure(2, 20.0);
        assert_eq!(v.total_height(), 2000.0);
    }

    #[test]
    fn fetch_threshold() {
        let mut v = virtualizer(51, 200.0, 0);
        // loaded bottom at 1000, viewport bottom at 200
        assert!(!v.should_fetch_more(50, true, false));
        v.set_scroll_offset(500.0);
        assert!(v.should_fetch_more(50, true, false));
        assert!(!v.should_fetch_more(50, true, true));
        assert!(!v.should_fetch_more(50, false, false));
    }

    #[test]
    fn reveal_scrolls_minimally() {
        let mut v = virtualizer(100, 200.0, 0);
        v.scroll_to_reveal(15);
        assert_eq!(v.scroll_offset(), 16.0 * 20.0 - 200.0);
        v.scroll_to_reveal(2);
        assert_eq!(v.scroll_offset(), 40.0);
    }
}

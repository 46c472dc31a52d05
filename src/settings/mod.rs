// src/settings/mod.rs
pub mod io;

use crate::data::query::{clamp_page_size, DEFAULT_PAGE_SIZE};
use crate::grid::params::DEFAULT_FILTER_DEBOUNCE;
use crate::grid::session::GridConfig;
use crate::grid::virtualize::{
    VirtualizerConfig, DEFAULT_FETCH_THRESHOLD_PX, DEFAULT_OVERSCAN, DEFAULT_ROW_HEIGHT,
};
use bevy::prelude::Resource;
use bevy_framepace::Limiter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FpsSetting {
    Thirty,
    #[default]
    Sixty,
    ScreenHz, // Auto
}

impl FpsSetting {
    pub fn limiter(&self) -> Limiter {
        match self {
            FpsSetting::Thirty => Limiter::from_framerate(30.0),
            FpsSetting::Sixty => Limiter::from_framerate(60.0),
            FpsSetting::ScreenHz => Limiter::Auto,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Resource)]
#[serde(default)]
pub struct AppSettings {
    pub page_size: u32,
    pub overscan: usize,
    pub row_height: f32,
    pub filter_debounce_ms: u64,
    pub fetch_threshold_px: f32,
    pub fps_setting: FpsSetting,
    /// Overrides the database location; `None` uses `GRIDBASE_DB` or the documents folder.
    pub database_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            overscan: DEFAULT_OVERSCAN,
            row_height: DEFAULT_ROW_HEIGHT,
            filter_debounce_ms: DEFAULT_FILTER_DEBOUNCE.as_millis() as u64,
            fetch_threshold_px: DEFAULT_FETCH_THRESHOLD_PX,
            fps_setting: FpsSetting::default(),
            database_path: None,
        }
    }
}

impl AppSettings {
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            page_size: clamp_page_size(self.page_size),
            filter_debounce: Duration::from_millis(self.filter_debounce_ms),
            virtualizer: VirtualizerConfig {
                estimated_row_height: if self.row_height > 0.0 {
                    self.row_height
                } else {
                    DEFAULT_ROW_HEIGHT
                },
                overscan: self.overscan,
                fetch_threshold_px: self.fetch_threshold_px.max(0.0),
            },
        }
    }
}

// src/ui/mod.rs
use bevy::prelude::*;
use bevy_egui::EguiContextPass;

pub mod editor;
pub mod grid_view;
pub mod state;
pub mod systems;
pub mod toolbar;

use editor::grid_editor_ui;
use state::GridUiState;
use systems::handle_ui_feedback;

#[derive(Resource, Default, Debug, Clone)]
pub struct UiFeedbackState {
    pub last_message: String,
    pub is_error: bool,
}

/// Plugin for the grid window: toolbar, virtualized table body and status line.
pub struct GridUiPlugin;

impl Plugin for GridUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiFeedbackState>()
            .init_resource::<GridUiState>()
            .add_systems(Update, handle_ui_feedback)
            .add_systems(EguiContextPass, grid_editor_ui);

        info!("GridUiPlugin initialized.");
    }
}

// src/ui/editor.rs
use super::grid_view::show_grid;
use super::state::{GridUiState, UiAction};
use super::toolbar::{show_status_line, show_toolbar};
use super::UiFeedbackState;
use crate::app::{ActiveGrid, DirectoryRequest, GridCommandQueue, GridFeedback, OpenTableRequest, TableDirectory};
use crate::grid::GridSession;
use crate::settings::AppSettings;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

#[allow(clippy::too_many_arguments)]
pub fn grid_editor_ui(
    mut contexts: EguiContexts,
    mut grid: ResMut<ActiveGrid>,
    mut queue: ResMut<GridCommandQueue>,
    mut ui_state: ResMut<GridUiState>,
    mut settings: ResMut<AppSettings>,
    directory: Res<TableDirectory>,
    ui_feedback: Res<UiFeedbackState>,
    time: Res<Time>,
    mut open_writer: EventWriter<OpenTableRequest>,
    mut directory_writer: EventWriter<DirectoryRequest>,
    mut feedback_writer: EventWriter<GridFeedback>,
) {
    let ctx = contexts.ctx_mut();
    let mut actions = Vec::new();
    ui_state.sync_table(grid.session.as_ref().map(|s| s.table_id()));

    egui::TopBottomPanel::top("grid_toolbar").show(ctx, |ui| {
        show_toolbar(
            ui,
            grid.session.as_ref(),
            &directory,
            &mut ui_state,
            settings.fps_setting,
            &mut actions,
        );
    });
    egui::TopBottomPanel::bottom("grid_status").show(ctx, |ui| {
        show_status_line(ui, grid.session.as_ref(), &ui_feedback);
    });
    egui::CentralPanel::default().show(ctx, |ui| match grid.session.as_ref() {
        Some(session) => show_grid(ui, session, &mut ui_state, &mut actions),
        None => {
            ui.centered_and_justified(|ui| ui.label("No table open"));
        }
    });

    for action in actions {
        match action {
            UiAction::OpenTable(table) => {
                open_writer.write(OpenTableRequest { table });
            }
            UiAction::ReloadTables => {
                directory_writer.write(DirectoryRequest::Reload);
            }
            UiAction::CreateTable { base_id, name } => {
                directory_writer.write(DirectoryRequest::CreateTable { base_id, name });
            }
            UiAction::SetFps(fps) => settings.fps_setting = fps,
            UiAction::Feedback { message, is_error } => {
                feedback_writer.write(GridFeedback { message, is_error });
            }
            other => {
                if let Some(session) = grid.session.as_mut() {
                    queue.extend(apply_session_action(session, other, &time));
                }
            }
        }
    }
}

fn apply_session_action(session: &mut GridSession, action: UiAction, time: &Time) -> Vec<crate::grid::GridCommand> {
    match action {
        UiAction::Edit(input) => session.edit(input),
        UiAction::ToggleSort(column_id) => session.toggle_sort(&column_id),
        UiAction::ClearSort => session.clear_sort(),
        UiAction::SetFilterText(text) => {
            session.set_filter_text(&text, time.elapsed());
            Vec::new()
        }
        UiAction::SetFilterColumn(column_id) => session.set_filter_column(column_id),
        UiAction::Viewport { offset, height } => session.on_viewport(offset, height),
        UiAction::Measure { index, height } => {
            session.measure_row(index, height);
            Vec::new()
        }
        UiAction::RetryFetch => session.retry_fetch(),
        UiAction::AddRow => session.add_row(),
        UiAction::AddColumn { name, column_type } => session.add_column(&name, column_type),
        UiAction::GenerateRows(count) => session.generate_rows(count),
        UiAction::OpenTable(_)
        | UiAction::ReloadTables
        | UiAction::CreateTable { .. }
        | UiAction::SetFps(_)
        | UiAction::Feedback { .. } => Vec::new(),
    }
}

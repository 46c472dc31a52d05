// src/ui/toolbar.rs
use super::state::{GridUiState, UiAction};
use super::UiFeedbackState;
use crate::app::TableDirectory;
use crate::data::ColumnType;
use crate::grid::GridSession;
use crate::settings::FpsSetting;
use bevy_egui::egui::{self, RichText};

pub fn show_toolbar(
    ui: &mut egui::Ui,
    session: Option<&GridSession>,
    directory: &TableDirectory,
    ui_state: &mut GridUiState,
    fps: FpsSetting,
    actions: &mut Vec<UiAction>,
) {
    ui.horizontal_wrapped(|ui| {
        show_table_picker(ui, session, directory, ui_state, actions);
        let Some(session) = session else {
            return;
        };
        ui.separator();
        show_filter_controls(ui, session, ui_state, actions);
        ui.separator();
        if let Some(sort) = session.params().sort() {
            let name = session
                .columns()
                .iter()
                .find(|c| c.id == sort.column_id)
                .map_or("?", |c| c.name.as_str());
            ui.label(format!("Sorted by {} ({:?})", name, sort.direction));
            if ui.small_button("Clear sort").clicked() {
                actions.push(UiAction::ClearSort);
            }
            ui.separator();
        }
        if ui.button("+ Row").clicked() {
            actions.push(UiAction::AddRow);
        }
        show_column_form(ui, ui_state, actions);
        ui.separator();
        show_generate_form(ui, session, ui_state, actions);
        ui.separator();
        show_fps_picker(ui, fps, actions);
    });
}

fn show_table_picker(
    ui: &mut egui::Ui,
    session: Option<&GridSession>,
    directory: &TableDirectory,
    ui_state: &mut GridUiState,
    actions: &mut Vec<UiAction>,
) {
    let current = session.map_or("No table".to_string(), |s| s.table().name.clone());
    egui::ComboBox::from_id_salt("table_picker")
        .selected_text(current)
        .show_ui(ui, |ui| {
            for base in &directory.bases {
                ui.label(RichText::new(&base.name).weak());
                for table in directory.tables_of(base) {
                    let selected = session.map_or(false, |s| s.table_id() == &table.id);
                    if ui.selectable_label(selected, format!("  {}", table.name)).clicked() && !selected {
                        actions.push(UiAction::OpenTable(table.clone()));
                    }
                }
            }
        });
    if directory.loading {
        ui.spinner();
    } else if ui.small_button("Reload").clicked() {
        actions.push(UiAction::ReloadTables);
    }

    let Some(base_id) = session.map(|s| s.table().base_id.clone()) else {
        return;
    };
    ui.add(
        egui::TextEdit::singleline(&mut ui_state.new_table_name)
            .hint_text("New table")
            .desired_width(100.0),
    );
    if ui.button("Create").clicked() {
        let name = ui_state.new_table_name.trim().to_string();
        if name.is_empty() {
            actions.push(UiAction::Feedback {
                message: "Table name cannot be empty".to_string(),
                is_error: true,
            });
        } else {
            actions.push(UiAction::CreateTable { base_id, name });
            ui_state.new_table_name.clear();
        }
    }
}

fn show_filter_controls(ui: &mut egui::Ui, session: &GridSession, ui_state: &mut GridUiState, actions: &mut Vec<UiAction>) {
    let columns = session.columns();
    let selected = session.params().filter_column();
    let selected_name = columns
        .iter()
        .find(|c| Some(&c.id) == selected)
        .map_or("-", |c| c.name.as_str());
    ui.label("Filter");
    egui::ComboBox::from_id_salt("filter_column")
        .selected_text(selected_name)
        .width(110.0)
        .show_ui(ui, |ui| {
            for column in columns {
                let is_selected = Some(&column.id) == selected;
                if ui.selectable_label(is_selected, &column.name).clicked() && !is_selected {
                    actions.push(UiAction::SetFilterColumn(column.id.clone()));
                }
            }
        });
    let response = ui.add(
        egui::TextEdit::singleline(&mut ui_state.filter_text)
            .hint_text("contains...")
            .desired_width(140.0),
    );
    if response.changed() {
        actions.push(UiAction::SetFilterText(ui_state.filter_text.clone()));
    }
}

fn show_column_form(ui: &mut egui::Ui, ui_state: &mut GridUiState, actions: &mut Vec<UiAction>) {
    ui.add(
        egui::TextEdit::singleline(&mut ui_state.new_column_name)
            .hint_text("Column name")
            .desired_width(100.0),
    );
    egui::ComboBox::from_id_salt("new_column_type")
        .selected_text(ui_state.new_column_type.as_str())
        .width(70.0)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut ui_state.new_column_type, ColumnType::Text, "text");
            ui.selectable_value(&mut ui_state.new_column_type, ColumnType::Number, "number");
        });
    if ui.button("+ Column").clicked() {
        actions.push(UiAction::AddColumn {
            name: ui_state.new_column_name.clone(),
            column_type: ui_state.new_column_type,
        });
        ui_state.new_column_name.clear();
    }
}

fn show_generate_form(ui: &mut egui::Ui, session: &GridSession, ui_state: &mut GridUiState, actions: &mut Vec<UiAction>) {
    ui.add(egui::TextEdit::singleline(&mut ui_state.generate_count).desired_width(60.0));
    let running = session.bulk_running();
    let button = ui.add_enabled(!running, egui::Button::new("Generate rows"));
    if running {
        ui.spinner();
    }
    if button.clicked() {
        match ui_state.generate_count.trim().parse::<u64>() {
            Ok(count) => actions.push(UiAction::GenerateRows(count)),
            Err(_) => actions.push(UiAction::Feedback {
                message: format!("'{}' is not a row count", ui_state.generate_count.trim()),
                is_error: true,
            }),
        }
    }
}

fn show_fps_picker(ui: &mut egui::Ui, fps: FpsSetting, actions: &mut Vec<UiAction>) {
    let label = |setting: FpsSetting| match setting {
        FpsSetting::Thirty => "30 FPS",
        FpsSetting::Sixty => "60 FPS",
        FpsSetting::ScreenHz => "Screen Hz",
    };
    egui::ComboBox::from_id_salt("fps_setting")
        .selected_text(label(fps))
        .width(80.0)
        .show_ui(ui, |ui| {
            for option in [FpsSetting::Thirty, FpsSetting::Sixty, FpsSetting::ScreenHz] {
                if ui.selectable_label(fps == option, label(option)).clicked() && fps != option {
                    actions.push(UiAction::SetFps(option));
                }
            }
        });
}

pub fn show_status_line(ui: &mut egui::Ui, session: Option<&GridSession>, feedback: &UiFeedbackState) {
    ui.horizontal(|ui| {
        if let Some(session) = session {
            let cache = session.cache();
            ui.label(format!("{} of {} rows loaded", cache.len(), cache.total_count()));
            if session.is_loading() {
                ui.spinner();
            }
            let pending = session.pending_commits();
            if pending > 0 {
                ui.label(RichText::new(format!("Saving {}...", pending)).weak());
            }
            ui.separator();
        }
        if !feedback.last_message.is_empty() {
            let color = if feedback.is_error {
                ui.visuals().error_fg_color
            } else {
                ui.visuals().text_color()
            };
            ui.colored_label(color, &feedback.last_message);
        }
    });
}

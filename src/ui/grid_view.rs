// src/ui/grid_view.rs
// Table body: sticky header, virtualized rows, the inline cell editor and the loader row.

use super::state::{GridUiState, UiAction};
use crate::data::{ColumnType, SortDirection};
use crate::grid::edit::ActiveEdit;
use crate::grid::{CellPosition, Direction, EditInput, GridSession, VirtualRow};
use bevy_egui::egui::{self, Align, Key, Layout, Modifiers, RichText, Sense};
use egui_extras::{Size, StripBuilder};

pub const ROW_NUMBER_WIDTH: f32 = 56.0;
pub const COLUMN_WIDTH: f32 = 160.0;
const HEADER_HEIGHT: f32 = 26.0;

pub fn show_grid(ui: &mut egui::Ui, session: &GridSession, ui_state: &mut GridUiState, actions: &mut Vec<UiAction>) {
    if session.columns().is_empty() {
        show_placeholder(ui, session);
        return;
    }
    if session.editor().active().is_none() {
        ui_state.focused_cell = None;
    }
    // Keys are taken before the text editor can react to them.
    let navigation = session
        .editor()
        .active()
        .and_then(|_| ui.input_mut(consume_navigation_key));

    let total_width = ROW_NUMBER_WIDTH + COLUMN_WIDTH * session.columns().len() as f32;
    let mut cell_actions = Vec::new();
    let mut editor_blurred = false;

    egui::ScrollArea::horizontal()
        .id_salt("grid_horizontal")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            ui.set_min_width(total_width);
            show_header(ui, session, actions);
            ui.separator();

            let wanted_offset = session.virtualizer().scroll_offset();
            let mut area = egui::ScrollArea::vertical()
                .id_salt(("grid_rows", session.table_id().as_str()))
                .auto_shrink([false; 2]);
            if (wanted_offset - ui_state.last_offset).abs() > 0.5 {
                area = area.vertical_scroll_offset(wanted_offset);
            }

            area.show_viewport(ui, |ui, viewport| {
                let window = session.window();
                ui.set_height(window.total_height);
                ui_state.last_offset = viewport.min.y;
                actions.push(UiAction::Viewport {
                    offset: viewport.min.y,
                    height: viewport.height(),
                });

                let origin = ui.min_rect().min;
                for row in &window.rows {
                    let rect = egui::Rect::from_min_size(
                        origin + egui::vec2(0.0, row.start),
                        egui::vec2(total_width, row.height),
                    );
                    if row.index < session.cache().len() {
                        let used = show_row(ui, rect, session, row, ui_state, &mut cell_actions, &mut editor_blurred);
                        actions.push(UiAction::Measure {
                            index: row.index,
                            height: used,
                        });
                    } else {
                        show_loader_row(ui, rect, session, actions);
                    }
                }
            });
        });

    let clicked_cell = cell_actions
        .iter()
        .any(|a| matches!(a, UiAction::Edit(EditInput::Click(_))));
    actions.extend(cell_actions);
    match navigation {
        Some(input) => actions.push(UiAction::Edit(input)),
        None if editor_blurred && !clicked_cell => actions.push(UiAction::Edit(EditInput::Blur)),
        None => {}
    }
}

fn consume_navigation_key(input: &mut egui::InputState) -> Option<EditInput> {
    if input.consume_key(Modifiers::SHIFT, Key::Tab) {
        Some(EditInput::Tab { shift: true })
    } else if input.consume_key(Modifiers::NONE, Key::Tab) {
        Some(EditInput::Tab { shift: false })
    } else if input.consume_key(Modifiers::SHIFT, Key::Enter) {
        Some(EditInput::Enter { shift: true })
    } else if input.consume_key(Modifiers::NONE, Key::Enter) {
        Some(EditInput::Enter { shift: false })
    } else if input.consume_key(Modifiers::NONE, Key::Escape) {
        Some(EditInput::Escape)
    } else if input.consume_key(Modifiers::NONE, Key::ArrowUp) {
        Some(EditInput::Arrow(Direction::Up))
    } else if input.consume_key(Modifiers::NONE, Key::ArrowDown) {
        Some(EditInput::Arrow(Direction::Down))
    } else if input.consume_key(Modifiers::ALT, Key::ArrowLeft) {
        Some(EditInput::Arrow(Direction::Left))
    } else if input.consume_key(Modifiers::ALT, Key::ArrowRight) {
        Some(EditInput::Arrow(Direction::Right))
    } else {
        None
    }
}

fn show_header(ui: &mut egui::Ui, session: &GridSession, actions: &mut Vec<UiAction>) {
    let sort = session.params().sort();
    let columns = session.columns();
    ui.allocate_ui(egui::vec2(ui.available_width(), HEADER_HEIGHT), |ui| {
        StripBuilder::new(ui)
            .size(Size::exact(ROW_NUMBER_WIDTH))
            .sizes(Size::exact(COLUMN_WIDTH), columns.len())
            .horizontal(|mut strip| {
                strip.cell(|ui| {
                    ui.label(RichText::new("#").weak());
                });
                for column in columns {
                    let arrow = match sort {
                        Some(s) if s.column_id == column.id => match s.direction {
                            SortDirection::Asc => " ▲",
                            SortDirection::Desc => " ▼",
                        },
                        _ => "",
                    };
                    let kind = match column.column_type {
                        ColumnType::Number => " #",
                        ColumnType::Text => "",
                    };
                    strip.cell(|ui| {
                        let button = egui::Button::new(RichText::new(format!("{}{}{}", column.name, kind, arrow)).strong())
                            .frame(false)
                            .wrap_mode(egui::TextWrapMode::Truncate);
                        if ui
                            .add_sized([COLUMN_WIDTH - 4.0, HEADER_HEIGHT], button)
                            .on_hover_text("Click to sort: ascending, descending, off")
                            .clicked()
                        {
                            actions.push(UiAction::ToggleSort(column.id.clone()));
                        }
                    });
                }
            });
    });
}

/// Draws one data row and returns the height it used.
fn show_row(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    session: &GridSession,
    row: &VirtualRow,
    ui_state: &mut GridUiState,
    actions: &mut Vec<UiAction>,
    editor_blurred: &mut bool,
) -> f32 {
    let Some(data_row) = session.cache().row(row.index) else {
        return row.height;
    };
    let columns = session.columns();
    let active = session.editor().active();

    let response = ui.scope_builder(egui::UiBuilder::new().max_rect(rect), |ui| {
        StripBuilder::new(ui)
            .size(Size::exact(ROW_NUMBER_WIDTH))
            .sizes(Size::exact(COLUMN_WIDTH), columns.len())
            .clip(true)
            .horizontal(|mut strip| {
                strip.cell(|ui| {
                    ui.label(RichText::new((row.index + 1).to_string()).weak());
                });
                for (column_index, column) in columns.iter().enumerate() {
                    let position = CellPosition::new(row.index, column_index);
                    strip.cell(|ui| match active {
                        Some(edit) if edit.position() == position => {
                            if show_cell_editor(ui, edit, ui_state, actions) {
                                *editor_blurred = true;
                            }
                        }
                        _ => {
                            let value = data_row.value_for(&column.id);
                            let label = egui::Label::new(value).truncate().sense(Sense::click());
                            let clicked = match column.column_type {
                                ColumnType::Number => {
                                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| ui.add(label))
                                        .inner
                                        .clicked()
                                }
                                ColumnType::Text => ui.add(label).clicked(),
                            };
                            if clicked {
                                actions.push(UiAction::Edit(EditInput::Click(position)));
                            }
                        }
                    });
                }
            });
    });
    response.response.rect.height()
}

/// Returns true when the editor lost focus this frame.
fn show_cell_editor(
    ui: &mut egui::Ui,
    edit: &ActiveEdit,
    ui_state: &mut GridUiState,
    actions: &mut Vec<UiAction>,
) -> bool {
    let mut draft = edit.draft.clone();
    let editor = egui::TextEdit::singleline(&mut draft)
        .id(egui::Id::new(("cell_editor", edit.cell_id.as_str())))
        .desired_width(f32::INFINITY);
    let response = ui.add(editor);
    if ui_state.focused_cell.as_ref() != Some(&edit.cell_id) {
        response.request_focus();
        ui_state.focused_cell = Some(edit.cell_id.clone());
    }
    if response.changed() {
        actions.push(UiAction::Edit(EditInput::Draft(draft)));
    }
    response.lost_focus()
}

fn show_loader_row(ui: &mut egui::Ui, rect: egui::Rect, session: &GridSession, actions: &mut Vec<UiAction>) {
    ui.scope_builder(egui::UiBuilder::new().max_rect(rect), |ui| {
        ui.horizontal_centered(|ui| {
            ui.add_space(ROW_NUMBER_WIDTH);
            if session.is_stalled() {
                ui.colored_label(ui.visuals().error_fg_color, "Loading rows failed.");
                if ui.button("Retry").clicked() {
                    actions.push(UiAction::RetryFetch);
                }
            } else if session.is_loading() {
                ui.spinner();
                ui.label("Loading more rows...");
            } else {
                ui.label(RichText::new("More rows below").weak());
            }
        });
    });
}

fn show_placeholder(ui: &mut egui::Ui, session: &GridSession) {
    ui.centered_and_justified(|ui| match session.unavailable() {
        Some(reason) => {
            ui.colored_label(ui.visuals().error_fg_color, reason);
        }
        None => {
            ui.label(RichText::new("Loading columns...").weak());
        }
    });
}

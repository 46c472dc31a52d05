// src/ui/systems.rs
use crate::app::GridFeedback;
use crate::ui::UiFeedbackState;
use bevy::prelude::*;

pub fn handle_ui_feedback(
    mut feedback_events: EventReader<GridFeedback>,
    mut ui_feedback_state: ResMut<UiFeedbackState>,
) {
    let mut last_info = None;
    let mut last_error = None;
    for event in feedback_events.read() {
        if event.is_error {
            last_error = Some(event.message.clone());
        } else {
            last_info = Some(event.message.clone());
        }
    }
    // An error stays visible over info messages from the same frame
    if let Some(msg) = last_error {
        warn!("UI Feedback (Error): {}", msg);
        ui_feedback_state.last_message = msg;
        ui_feedback_state.is_error = true;
    } else if let Some(msg) = last_info {
        debug!("UI Feedback: {}", msg);
        ui_feedback_state.last_message = msg;
        ui_feedback_state.is_error = false;
    }
}

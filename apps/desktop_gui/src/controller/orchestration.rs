//! Routes UI-thread events into the connection controller.

use client_core::{ConnectionController, LogSink, TransportFactory};
use shared::domain::LogLine;

use crate::controller::events::UiEvent;

pub fn apply_ui_event<F, L>(controller: &mut ConnectionController<F, L>, event: UiEvent)
where
    F: TransportFactory,
    L: LogSink,
{
    match event {
        UiEvent::Transport { id, event } => {
            tracing::debug!(connection_id = id.0, ?event, "ui received transport event");
            controller.handle_event(id, event);
        }
        UiEvent::Error(message) => {
            controller.log_mut().append(LogLine::error(message));
        }
    }
}

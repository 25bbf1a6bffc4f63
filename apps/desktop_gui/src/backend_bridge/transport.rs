//! Transport plumbing between the tokio runtime and the egui thread.

use client_core::{
    EventSink, TransportError, TransportEvent, TransportFactory, WsTransport, WsTransportFactory,
};
use crossbeam_channel::Sender;
use eframe::egui;
use shared::domain::ConnectionId;

use crate::controller::events::UiEvent;

/// Forwards transport events to the UI queue and wakes the event loop.
#[derive(Clone)]
pub struct UiEventSink {
    ui_tx: Sender<UiEvent>,
    repaint: Option<egui::Context>,
}

impl UiEventSink {
    pub fn new(ui_tx: Sender<UiEvent>, repaint: Option<egui::Context>) -> Self {
        Self { ui_tx, repaint }
    }
}

impl EventSink for UiEventSink {
    fn deliver(&self, id: ConnectionId, event: TransportEvent) {
        if self.ui_tx.send(UiEvent::Transport { id, event }).is_err() {
            tracing::debug!(connection_id = id.0, "ui queue closed; dropping transport event");
            return;
        }
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
    }
}

pub enum BridgeFactory {
    Ready(WsTransportFactory<UiEventSink>),
    Unavailable(String),
}

impl TransportFactory for BridgeFactory {
    type Transport = WsTransport;

    fn open(&mut self, id: ConnectionId, address: &str) -> Result<WsTransport, TransportError> {
        match self {
            Self::Ready(factory) => factory.open(id, address),
            Self::Unavailable(reason) => Err(TransportError::Unavailable(reason.clone())),
        }
    }
}

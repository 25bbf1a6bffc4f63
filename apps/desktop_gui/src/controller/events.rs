//! Events delivered from the network runtime to the UI thread.

use client_core::TransportEvent;
use shared::domain::ConnectionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Transport {
        id: ConnectionId,
        event: TransportEvent,
    },
    /// Startup problems that never reach the controller as transport events.
    Error(String),
}

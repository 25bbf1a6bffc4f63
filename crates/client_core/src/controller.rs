//! Connection lifecycle state machine.
//!
//! The controller owns at most one transport handle and mediates every
//! transition between `Disconnected`, `Connecting` and `Connected` on behalf
//! of the connect, disconnect and send actions. Each transition appends to the
//! injected [`LogSink`] and updates the [`ControlPanel`] view model.
//!
//! All methods are synchronous and expected to run on a single thread: front
//! ends feed user actions and [`TransportEvent`]s into it from one loop.

use shared::{
    domain::{ConnectionId, ConnectionState, LogLine},
    error::TerminalError,
    protocol::{frame_line, has_websocket_scheme, strip_line_terminator, EchoProbe},
};
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    log::LogSink,
    transport::{Transport, TransportEvent, TransportFactory},
};

pub const CONNECT_LABEL: &str = "Connect";
pub const CONNECTING_LABEL: &str = "Connecting...";
pub const WELCOME_MESSAGE: &str =
    "Welcome to the WebSocket Serial Monitor. Enter the server URL and connect.";

/// Enabled/visible attributes of the connect and disconnect controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPanel {
    pub connect_enabled: bool,
    pub connect_label: &'static str,
    pub connect_visible: bool,
    pub disconnect_visible: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            connect_enabled: true,
            connect_label: CONNECT_LABEL,
            connect_visible: true,
            disconnect_visible: false,
        }
    }
}

impl ControlPanel {
    fn begin_connecting(&mut self) {
        self.connect_enabled = false;
        self.connect_label = CONNECTING_LABEL;
    }

    fn restore_connect(&mut self) {
        self.connect_enabled = true;
        self.connect_label = CONNECT_LABEL;
    }

    fn show_connected(&mut self) {
        self.restore_connect();
        self.connect_visible = false;
        self.disconnect_visible = true;
    }

    fn show_disconnected(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Transmitted and logged; the caller may clear its input.
    Sent,
    /// Empty message, nothing happened.
    Ignored,
    NotConnected,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    pub echo_probe: Option<EchoProbe>,
}

struct ActiveConnection<T> {
    id: ConnectionId,
    address: String,
    transport: T,
}

pub struct ConnectionController<F: TransportFactory, L: LogSink> {
    factory: F,
    log: L,
    clock: Box<dyn Clock>,
    echo_probe: Option<EchoProbe>,
    state: ConnectionState,
    controls: ControlPanel,
    active: Option<ActiveConnection<F::Transport>>,
    last_id: ConnectionId,
}

impl<F: TransportFactory, L: LogSink> ConnectionController<F, L> {
    pub fn new(factory: F, log: L, options: ControllerOptions) -> Self {
        Self {
            factory,
            log,
            clock: Box::new(SystemClock),
            echo_probe: options.echo_probe,
            state: ConnectionState::Disconnected,
            controls: ControlPanel::default(),
            active: None,
            last_id: ConnectionId(0),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn controls(&self) -> &ControlPanel {
        &self.controls
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn active_connection(&self) -> Option<ConnectionId> {
        self.active.as_ref().map(|active| active.id)
    }

    pub fn active_address(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.address.as_str())
    }

    pub fn welcome(&mut self) {
        self.log.append(LogLine::info(WELCOME_MESSAGE));
    }

    /// Connect action. Rejected while a connection is pending or open.
    pub fn connect(&mut self, address: &str) -> Result<ConnectionId, TerminalError> {
        if self.state != ConnectionState::Disconnected {
            return Err(self.report(TerminalError::AlreadyActive {
                state: self.state.as_str(),
            }));
        }

        let address = address.trim();
        if address.is_empty() {
            return Err(self.report(TerminalError::EmptyUrl));
        }
        if !has_websocket_scheme(address) {
            return Err(self.report(TerminalError::InvalidScheme));
        }

        self.log.append(LogLine::info("Connecting..."));
        self.controls.begin_connecting();

        // After an error event the old handle lingers until its close arrives.
        if let Some(mut stale) = self.active.take() {
            debug!(connection_id = stale.id.0, "dropping errored connection");
            stale.transport.close();
        }

        let id = self.last_id.next();
        self.last_id = id;
        match self.factory.open(id, address) {
            Ok(transport) => {
                info!(connection_id = id.0, url = address, "connecting");
                self.active = Some(ActiveConnection {
                    id,
                    address: address.to_string(),
                    transport,
                });
                self.state = ConnectionState::Connecting;
                Ok(id)
            }
            Err(err) => {
                self.controls.restore_connect();
                Err(self.report(TerminalError::Construction(err.to_string())))
            }
        }
    }

    /// Disconnect action. Returns whether a close was requested.
    pub fn disconnect(&mut self) -> bool {
        match self.active.as_mut() {
            Some(active) => {
                info!(connection_id = active.id.0, "close requested");
                active.transport.close();
                true
            }
            None => {
                debug!("disconnect without an active connection");
                false
            }
        }
    }

    pub fn send(&mut self, message: &str) -> SendOutcome {
        if message.is_empty() {
            return SendOutcome::Ignored;
        }
        // An errored handle lingers until its close; it must not transmit.
        if self.active.is_none() || self.state == ConnectionState::Disconnected {
            self.report(TerminalError::NotConnected);
            return SendOutcome::NotConnected;
        }

        let outgoing = match &self.echo_probe {
            Some(probe) if probe.is_request(message) => probe.payload(self.clock.now_millis()),
            _ => message.to_string(),
        };
        let result = match self.active.as_mut() {
            Some(active) => active.transport.send(&frame_line(&outgoing)),
            None => return SendOutcome::NotConnected,
        };

        match result {
            Ok(()) => {
                self.log.append(LogLine::sent(outgoing));
                SendOutcome::Sent
            }
            Err(err) => {
                self.report(TerminalError::SendFailed(err.to_string()));
                SendOutcome::Failed
            }
        }
    }

    pub fn handle_event(&mut self, id: ConnectionId, event: TransportEvent) {
        if self.active_connection() != Some(id) {
            debug!(connection_id = id.0, ?event, "ignoring event from inactive connection");
            return;
        }

        match event {
            TransportEvent::Open => {
                if self.state != ConnectionState::Connecting {
                    debug!(connection_id = id.0, state = self.state.as_str(), "unexpected open");
                    return;
                }
                self.state = ConnectionState::Connected;
                self.controls.show_connected();
                self.log.append(LogLine::info("Connected."));
                info!(connection_id = id.0, "connected");
            }
            TransportEvent::Message(text) => {
                self.log
                    .append(LogLine::received(strip_line_terminator(&text)));
                let elapsed = self
                    .echo_probe
                    .as_ref()
                    .and_then(|probe| probe.elapsed_millis(&text, self.clock.now_millis()));
                if let Some(elapsed) = elapsed {
                    debug!(connection_id = id.0, elapsed_ms = elapsed, "echo probe returned");
                    self.log
                        .append(LogLine::info(format!("Echo round-trip: {elapsed} ms")));
                }
            }
            TransportEvent::Error(description) => {
                let description = description.trim();
                let message = match (self.state, description.is_empty()) {
                    (ConnectionState::Connecting, true) => "Failed to connect.".to_string(),
                    (ConnectionState::Connecting, false) => {
                        format!("Failed to connect: {description}")
                    }
                    (_, true) => "Connection error.".to_string(),
                    (_, false) => description.to_string(),
                };
                self.report(TerminalError::Transport(message));
                self.controls.restore_connect();
                if self.state == ConnectionState::Connecting {
                    self.state = ConnectionState::Disconnected;
                }
            }
            TransportEvent::Closed => {
                self.active = None;
                self.state = ConnectionState::Disconnected;
                self.controls.show_disconnected();
                self.log.append(LogLine::info("Disconnected."));
                info!(connection_id = id.0, "disconnected");
            }
        }
    }

    fn report(&mut self, err: TerminalError) -> TerminalError {
        warn!(kind = ?err.kind(), state = self.state.as_str(), "{err}");
        self.log.append(LogLine::new(err.log_kind(), err.to_string()));
        err
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

//! Connection controller, transport and persistence for the WebSocket terminal.

pub mod address;
pub mod clock;
pub mod controller;
pub mod log;
pub mod settings;
pub mod transport;
pub mod ws_transport;

pub use address::{AddressMirror, AddressStore, FileAddressStore};
pub use clock::{Clock, SystemClock};
pub use controller::{
    ConnectionController, ControlPanel, ControllerOptions, SendOutcome, CONNECTING_LABEL,
    CONNECT_LABEL,
};
pub use log::{LogSink, TerminalLog};
pub use settings::{load_settings, Settings, SettingsError};
pub use transport::{EventSink, Transport, TransportError, TransportEvent, TransportFactory};
pub use ws_transport::{WsTransport, WsTransportFactory};

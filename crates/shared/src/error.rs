use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::LogKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Construction,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerminalError {
    #[error("Please, enter the WebSocket server URL.")]
    EmptyUrl,
    #[error("Please, enter a valid WebSocket url.")]
    InvalidScheme,
    #[error("Please, connect to the WebSocket server before sending messages.")]
    NotConnected,
    #[error("Already {state}; disconnect first.")]
    AlreadyActive { state: &'static str },
    #[error("{0}")]
    Construction(String),
    #[error("{0}")]
    SendFailed(String),
    #[error("{0}")]
    Transport(String),
}

impl TerminalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyUrl | Self::InvalidScheme | Self::NotConnected | Self::AlreadyActive { .. } => {
                ErrorKind::Validation
            }
            Self::Construction(_) => ErrorKind::Construction,
            Self::SendFailed(_) | Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Validation problems are warnings; everything else is an error line.
    pub fn log_kind(&self) -> LogKind {
        match self.kind() {
            ErrorKind::Validation => LogKind::Warning,
            ErrorKind::Construction | ErrorKind::Transport => LogKind::Error,
        }
    }
}

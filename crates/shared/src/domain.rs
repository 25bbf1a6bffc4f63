use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(ConnectionId);

impl ConnectionId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Sent,
    Received,
    Info,
    Warning,
    Error,
}

impl LogKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Sent => ">> ",
            Self::Received => "<< ",
            Self::Info => "Info: ",
            Self::Warning => "Warning: ",
            Self::Error => "Error: ",
        }
    }
}

/// One line of terminal output, kept unrendered so front ends can style by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub kind: LogKind,
    pub text: String,
}

impl LogLine {
    pub fn new(kind: LogKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn sent(text: impl Into<String>) -> Self {
        Self::new(LogKind::Sent, text)
    }

    pub fn received(text: impl Into<String>) -> Self {
        Self::new(LogKind::Received, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(LogKind::Info, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(LogKind::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(LogKind::Error, text)
    }

    pub fn render(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.text)
    }
}

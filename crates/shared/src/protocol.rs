//! Line framing, address validation and the echo-probe payload format.

/// Appended to every outbound text frame.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Default marker that turns an outgoing message into an echo probe.
pub const DEFAULT_PROBE_MARKER: &str = "#echo";

/// Public echo endpoint used when no address has been remembered.
pub const DEFAULT_ECHO_ADDRESS: &str = "wss://echo.websocket.org/";

pub fn frame_line(message: &str) -> String {
    format!("{message}{LINE_TERMINATOR}")
}

/// Strips one trailing line terminator (`\r\n` or `\n`) for display.
pub fn strip_line_terminator(message: &str) -> &str {
    message
        .strip_suffix(LINE_TERMINATOR)
        .or_else(|| message.strip_suffix('\n'))
        .unwrap_or(message)
}

/// Case-insensitive `ws://` / `wss://` prefix check; the caller trims first.
pub fn has_websocket_scheme(address: &str) -> bool {
    starts_with_ignore_ascii_case(address, "ws://") || starts_with_ignore_ascii_case(address, "wss://")
}

fn starts_with_ignore_ascii_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoProbe {
    marker: String,
}

impl EchoProbe {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn is_request(&self, message: &str) -> bool {
        message == self.marker
    }

    /// Payload carrying the send time in unix milliseconds.
    pub fn payload(&self, sent_at_millis: i64) -> String {
        format!("{} {sent_at_millis}", self.marker)
    }

    /// Returns the embedded send time when `message` is an echoed probe.
    pub fn parse_reply(&self, message: &str) -> Option<i64> {
        if self.marker.trim().is_empty() {
            return None;
        }
        let rest = message.strip_prefix(self.marker.as_str())?;
        strip_line_terminator(rest).trim().parse().ok()
    }

    /// Milliseconds between the embedded stamp and `now_millis`, never negative.
    pub fn elapsed_millis(&self, message: &str, now_millis: i64) -> Option<i64> {
        self.parse_reply(message)
            .map(|sent_at| now_millis.saturating_sub(sent_at).max(0))
    }
}

impl Default for EchoProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_MARKER)
    }
}

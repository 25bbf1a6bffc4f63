use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared::protocol::{EchoProbe, DEFAULT_ECHO_ADDRESS, DEFAULT_PROBE_MARKER};
use thiserror::Error;
use tracing::warn;

use crate::controller::ControllerOptions;

pub const SETTINGS_FILE_NAME: &str = "wsterm.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub default_address: String,
    pub echo_probe: bool,
    pub probe_marker: String,
    pub remember_address: bool,
    pub state_dir: PathBuf,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_address: DEFAULT_ECHO_ADDRESS.into(),
            echo_probe: false,
            probe_marker: DEFAULT_PROBE_MARKER.into(),
            remember_address: true,
            state_dir: default_state_dir(),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            echo_probe: self
                .echo_probe
                .then(|| EchoProbe::new(self.probe_marker.clone())),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    default_address: Option<String>,
    echo_probe: Option<bool>,
    probe_marker: Option<String>,
    remember_address: Option<bool>,
    state_dir: Option<PathBuf>,
    log_filter: Option<String>,
}

fn default_state_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wsterm")
}

/// Defaults, then the TOML file, then `WSTERM_*` environment overrides.
///
/// An explicit `path` must exist; otherwise `wsterm.toml` in the working
/// directory is read when present.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(SETTINGS_FILE_NAME), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file_settings(&mut settings, &raw)
            .map_err(|source| SettingsError::Parse { path, source })?,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {}
        Err(source) => return Err(SettingsError::Read { path, source }),
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

pub fn apply_file_settings(settings: &mut Settings, raw: &str) -> Result<(), toml::de::Error> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.default_address {
        settings.default_address = v;
    }
    if let Some(v) = file.echo_probe {
        settings.echo_probe = v;
    }
    if let Some(v) = file.probe_marker {
        set_probe_marker(settings, "probe_marker", v);
    }
    if let Some(v) = file.remember_address {
        settings.remember_address = v;
    }
    if let Some(v) = file.state_dir {
        settings.state_dir = v;
    }
    if let Some(v) = file.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("WSTERM_DEFAULT_ADDRESS") {
        settings.default_address = v;
    }
    if let Some(v) = lookup("WSTERM_ECHO_PROBE").and_then(|v| parse_flag("WSTERM_ECHO_PROBE", &v)) {
        settings.echo_probe = v;
    }
    if let Some(v) = lookup("WSTERM_PROBE_MARKER") {
        set_probe_marker(settings, "WSTERM_PROBE_MARKER", v);
    }
    if let Some(v) =
        lookup("WSTERM_REMEMBER_ADDRESS").and_then(|v| parse_flag("WSTERM_REMEMBER_ADDRESS", &v))
    {
        settings.remember_address = v;
    }
    if let Some(v) = lookup("WSTERM_STATE_DIR") {
        settings.state_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("WSTERM_LOG_FILTER") {
        settings.log_filter = v;
    }
}

/// An empty marker would prefix-match every inbound message.
fn set_probe_marker(settings: &mut Settings, source: &str, marker: String) {
    if marker.trim().is_empty() {
        warn!("ignoring empty {source}");
    } else {
        settings.probe_marker = marker;
    }
}

fn parse_flag(name: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            warn!("ignoring {name}={other}: expected a boolean");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;

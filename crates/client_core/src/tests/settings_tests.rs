use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_point_at_the_public_echo_endpoint() {
    let settings = Settings::default();
    assert_eq!(settings.default_address, "wss://echo.websocket.org/");
    assert!(!settings.echo_probe);
    assert!(settings.remember_address);
    assert!(settings.controller_options().echo_probe.is_none());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(
        &mut settings,
        r#"
            default_address = "ws://127.0.0.1:9001"
            echo_probe = true
            probe_marker = "!ping"
            state_dir = "/tmp/wsterm-state"
        "#,
    )
    .expect("parse");

    assert_eq!(settings.default_address, "ws://127.0.0.1:9001");
    assert_eq!(settings.state_dir, PathBuf::from("/tmp/wsterm-state"));
    assert_eq!(settings.log_filter, "info");
    let probe = settings.controller_options().echo_probe.expect("probe enabled");
    assert_eq!(probe.marker(), "!ping");
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file_settings(&mut settings, "bind_addr = \"0.0.0.0\"").is_err());
}

#[test]
fn environment_overrides_file_values() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "echo_probe = false").expect("parse");
    apply_env_overrides(
        &mut settings,
        env(&[
            ("WSTERM_ECHO_PROBE", "yes"),
            ("WSTERM_REMEMBER_ADDRESS", "0"),
            ("WSTERM_LOG_FILTER", "client_core=debug"),
        ]),
    );

    assert!(settings.echo_probe);
    assert!(!settings.remember_address);
    assert_eq!(settings.log_filter, "client_core=debug");
}

#[test]
fn invalid_environment_values_are_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env(&[("WSTERM_ECHO_PROBE", "sometimes"), ("WSTERM_PROBE_MARKER", "  ")]),
    );

    assert!(!settings.echo_probe);
    assert_eq!(settings.probe_marker, "#echo");
}

#[test]
fn explicit_settings_path_must_exist() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.toml");

    assert!(matches!(
        load_settings(Some(&missing)),
        Err(SettingsError::Read { .. })
    ));
}

#[test]
fn loads_an_explicit_settings_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("custom.toml");
    fs::write(&path, "probe_marker = \"!rtt\"\necho_probe = true\n").expect("write");

    let settings = load_settings(Some(&path)).expect("load");

    assert_eq!(settings.probe_marker, "!rtt");
}

#[test]
fn malformed_settings_file_reports_its_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "echo_probe = maybe").expect("write");

    let err = load_settings(Some(&path)).expect_err("parse error");

    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn blank_probe_marker_in_file_keeps_the_default() {
    let mut settings = Settings::default();
    apply_file_settings(&mut settings, "echo_probe = true\nprobe_marker = \"  \"\n").expect("parse");

    assert_eq!(settings.probe_marker, "#echo");
    let probe = settings.controller_options().echo_probe.expect("probe enabled");
    assert_eq!(probe.parse_reply("42"), None);
}

mod backend_bridge;
mod controller;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use client_core::{load_settings, Settings};
use crossbeam_channel::unbounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::controller::events::UiEvent;
use crate::ui::app::TerminalApp;

/// Desktop WebSocket terminal.
#[derive(Parser, Debug)]
#[command(name = "wsterm-gui")]
struct Args {
    /// Settings file (defaults to ./wsterm.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Turn the probe marker into a round-trip timing probe.
    #[arg(long)]
    echo_probe: bool,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let (ui_tx, ui_rx) = unbounded::<UiEvent>();

    let mut settings = match load_settings(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            let _ = ui_tx.send(UiEvent::Error(format!("{err}; using defaults")));
            Settings::default()
        }
    };
    if args.echo_probe {
        settings.echo_probe = true;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = backend_bridge::runtime::launch();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("WebSocket Terminal")
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([560.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "WebSocket Terminal",
        options,
        Box::new(move |cc| {
            let (factory, runtime) = backend_bridge::runtime::transport_factory(
                runtime,
                ui_tx,
                cc.egui_ctx.clone(),
            );
            Ok(Box::new(TerminalApp::new(ui_rx, factory, &settings, runtime)))
        }),
    )
}

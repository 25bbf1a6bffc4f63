use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, AddressMirror, AddressStore, ConnectionController, FileAddressStore, LogSink,
    TransportFactory, WsTransportFactory,
};
use shared::domain::LogLine;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing_subscriber::EnvFilter;

/// Line-oriented WebSocket terminal. Lines typed on stdin are sent to the
/// server; `/connect [url]`, `/disconnect` and `/quit` control the session.
#[derive(Parser, Debug)]
#[command(name = "wsterm")]
struct Args {
    /// Connect to this address on start.
    #[arg(long)]
    url: Option<String>,
    /// Settings file (defaults to ./wsterm.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Turn the probe marker into a round-trip timing probe.
    #[arg(long)]
    echo_probe: bool,
    /// Print log lines as JSON objects.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Connect(Option<&'a str>),
    Disconnect,
    Quit,
    Send(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    if line.starts_with("//") {
        return Command::Send(&line[1..]);
    }
    let trimmed = line.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some(("/connect", target)) => Command::Connect(Some(target.trim())),
        _ => match trimmed {
            "/connect" => Command::Connect(None),
            "/disconnect" => Command::Disconnect,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Send(line),
        },
    }
}

struct ConsoleLog {
    json: bool,
}

fn format_line(line: &LogLine, json: bool) -> String {
    if !json {
        return line.render();
    }
    match serde_json::to_string(line) {
        Ok(encoded) => encoded,
        Err(err) => {
            tracing::error!("failed to encode log line: {err}");
            line.render()
        }
    }
}

impl LogSink for ConsoleLog {
    fn append(&mut self, line: LogLine) {
        println!("{}", format_line(&line, self.json));
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    if args.echo_probe {
        settings.echo_probe = true;
    }
    init_tracing(&settings.log_filter);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let factory = WsTransportFactory::new(tokio::runtime::Handle::current(), event_tx);
    let mut controller = ConnectionController::new(
        factory,
        ConsoleLog { json: args.json },
        settings.controller_options(),
    );

    let mut mirror = settings.remember_address.then(|| {
        AddressMirror::new(
            FileAddressStore::in_dir(&settings.state_dir),
            settings.default_address.clone(),
        )
    });
    let mut address = match mirror.as_mut() {
        Some(mirror) => mirror.restore(),
        None => settings.default_address.clone(),
    };

    controller.welcome();
    if let Some(url) = args.url {
        address = url;
        connect_remembering(&mut controller, &mut mirror, &address);
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut quitting = false;
    loop {
        tokio::select! {
            line = stdin.next_line(), if !quitting => {
                let command_line = line.context("failed to read stdin")?;
                let Some(command_line) = command_line else {
                    quitting = true;
                    if !controller.disconnect() {
                        break;
                    }
                    continue;
                };
                match parse_command(&command_line) {
                    Command::Connect(target) => {
                        if let Some(target) = target {
                            address = target.to_string();
                        }
                        connect_remembering(&mut controller, &mut mirror, &address);
                    }
                    Command::Disconnect => {
                        controller.disconnect();
                    }
                    Command::Quit => {
                        quitting = true;
                        if !controller.disconnect() {
                            break;
                        }
                    }
                    Command::Send(message) => {
                        controller.send(message);
                    }
                }
            }
            Some((id, event)) = event_rx.recv() => {
                controller.handle_event(id, event);
                if quitting && controller.active_connection().is_none() {
                    break;
                }
            }
            else => break,
        }
    }

    Ok(())
}

/// Remembers the address only once the controller accepted it.
fn connect_remembering<F, L, S>(
    controller: &mut ConnectionController<F, L>,
    mirror: &mut Option<AddressMirror<S>>,
    address: &str,
) where
    F: TransportFactory,
    L: LogSink,
    S: AddressStore,
{
    if controller.connect(address).is_err() {
        return;
    }
    if let Some(mirror) = mirror.as_mut() {
        mirror.edit(address.trim());
        mirror.flush();
    }
}

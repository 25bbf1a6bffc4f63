//! Network runtime that hosts WebSocket tasks off the UI thread.

use anyhow::Context;
use crossbeam_channel::Sender;
use eframe::egui;
use tokio::runtime::Runtime;

use client_core::WsTransportFactory;

use crate::backend_bridge::transport::{BridgeFactory, UiEventSink};
use crate::controller::events::UiEvent;

pub fn launch() -> anyhow::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("wsterm-net")
        .enable_all()
        .build()
        .context("failed to build network runtime")
}

/// Pairs the runtime with a factory; the runtime must outlive every transport.
pub fn transport_factory(
    runtime: anyhow::Result<Runtime>,
    ui_tx: Sender<UiEvent>,
    egui_ctx: egui::Context,
) -> (BridgeFactory, Option<Runtime>) {
    match runtime {
        Ok(runtime) => {
            let sink = UiEventSink::new(ui_tx, Some(egui_ctx));
            let factory = WsTransportFactory::new(runtime.handle().clone(), sink);
            (BridgeFactory::Ready(factory), Some(runtime))
        }
        Err(err) => {
            tracing::error!("network runtime unavailable: {err:#}");
            let _ = ui_tx.send(UiEvent::Error(format!(
                "Network runtime unavailable: {err:#}"
            )));
            (BridgeFactory::Unavailable(format!("{err:#}")), None)
        }
    }
}

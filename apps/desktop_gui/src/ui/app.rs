use std::time::{Duration, Instant};

use client_core::{
    AddressMirror, ConnectionController, FileAddressStore, SendOutcome, Settings, TerminalLog,
};
use crossbeam_channel::Receiver;
use eframe::egui;
use shared::{domain::ConnectionState, protocol::DEFAULT_ECHO_ADDRESS};
use tokio::runtime::Runtime;

use crate::backend_bridge::transport::BridgeFactory;
use crate::controller::{events::UiEvent, orchestration::apply_ui_event};
use crate::ui::log_view::{self, LogRows};

const ADDRESS_SAVE_DELAY: Duration = Duration::from_millis(500);
const IDLE_REPAINT: Duration = Duration::from_millis(250);

pub struct TerminalApp {
    ui_rx: Receiver<UiEvent>,
    controller: ConnectionController<BridgeFactory, TerminalLog>,
    mirror: Option<AddressMirror<FileAddressStore>>,
    last_edit: Option<Instant>,
    address: String,
    outgoing: String,
    log_rows: LogRows,
    _runtime: Option<Runtime>,
}

impl TerminalApp {
    pub fn new(
        ui_rx: Receiver<UiEvent>,
        factory: BridgeFactory,
        settings: &Settings,
        runtime: Option<Runtime>,
    ) -> Self {
        let mut mirror = settings.remember_address.then(|| {
            AddressMirror::new(
                FileAddressStore::in_dir(&settings.state_dir),
                settings.default_address.clone(),
            )
        });
        let address = match mirror.as_mut() {
            Some(mirror) => mirror.restore(),
            None => settings.default_address.clone(),
        };

        let mut controller =
            ConnectionController::new(factory, TerminalLog::new(), settings.controller_options());
        controller.welcome();

        Self {
            ui_rx,
            controller,
            mirror,
            last_edit: None,
            address,
            outgoing: String::new(),
            log_rows: LogRows::default(),
            _runtime: runtime,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(&mut self.controller, event);
        }
    }

    fn address_edited(&mut self) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.edit(self.address.trim());
            self.last_edit = Some(Instant::now());
        }
    }

    fn flush_address(&mut self, force: bool) {
        let Some(edited_at) = self.last_edit else {
            return;
        };
        if !force && !save_due(edited_at, Instant::now()) {
            return;
        }
        self.last_edit = None;
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.flush();
        }
    }

    fn try_connect(&mut self) {
        self.flush_address(true);
        let _ = self.controller.connect(&self.address);
    }

    fn try_send(&mut self) {
        if self.controller.send(&self.outgoing) == SendOutcome::Sent {
            self.outgoing.clear();
        }
    }

    fn show_address_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("address_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label("Server");
                let controls = self.controller.controls().clone();
                let button_width = 110.0;
                let response = ui.add_sized(
                    [(ui.available_width() - button_width - 110.0).max(120.0), 24.0],
                    egui::TextEdit::singleline(&mut self.address)
                        .hint_text(DEFAULT_ECHO_ADDRESS),
                );
                if response.changed() {
                    self.address_edited();
                }
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let mut connect_clicked = false;
                if controls.connect_visible {
                    connect_clicked = ui
                        .add_enabled(
                            controls.connect_enabled,
                            egui::Button::new(controls.connect_label)
                                .min_size(egui::vec2(button_width, 24.0)),
                        )
                        .clicked();
                }
                if controls.disconnect_visible
                    && ui
                        .add(
                            egui::Button::new("Disconnect")
                                .min_size(egui::vec2(button_width, 24.0)),
                        )
                        .clicked()
                {
                    self.controller.disconnect();
                }

                let (label, color) = state_badge(self.controller.state());
                ui.label(egui::RichText::new(label).color(color));

                if connect_clicked || submitted {
                    self.try_connect();
                }
            });
            ui.add_space(4.0);
        });
    }

    fn show_composer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("composer_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let send_width = 88.0;
                let response = ui.add_sized(
                    [(ui.available_width() - send_width).max(120.0), 24.0],
                    egui::TextEdit::singleline(&mut self.outgoing)
                        .font(egui::TextStyle::Monospace)
                        .hint_text("Message (Enter to send)"),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let clicked = ui
                    .add(egui::Button::new("Send").min_size(egui::vec2(send_width, 24.0)))
                    .clicked();
                if submitted || clicked {
                    self.try_send();
                    response.request_focus();
                }
            });
            ui.add_space(4.0);
        });
    }
}

impl eframe::App for TerminalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.flush_address(false);
        self.process_ui_events();

        self.show_address_bar(ctx);
        self.show_composer(ctx);
        self.log_rows.sync(self.controller.log().lines());
        egui::CentralPanel::default().show(ctx, |ui| {
            log_view::show_log(ui, &self.log_rows);
        });

        ctx.request_repaint_after(IDLE_REPAINT);
    }
}

impl Drop for TerminalApp {
    fn drop(&mut self) {
        self.flush_address(true);
    }
}

fn save_due(edited_at: Instant, now: Instant) -> bool {
    now.saturating_duration_since(edited_at) >= ADDRESS_SAVE_DELAY
}

fn state_badge(state: ConnectionState) -> (&'static str, egui::Color32) {
    match state {
        ConnectionState::Disconnected => ("disconnected", egui::Color32::GRAY),
        ConnectionState::Connecting => ("connecting", egui::Color32::YELLOW),
        ConnectionState::Connected => ("connected", egui::Color32::GREEN),
    }
}

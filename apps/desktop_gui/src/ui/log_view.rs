use eframe::egui;
use shared::domain::{LogKind, LogLine};

pub fn kind_color(kind: LogKind, visuals: &egui::Visuals) -> egui::Color32 {
    match kind {
        LogKind::Sent => egui::Color32::from_rgb(88, 166, 255),
        LogKind::Received => visuals.text_color(),
        LogKind::Info => visuals.weak_text_color(),
        LogKind::Warning => egui::Color32::from_rgb(229, 192, 123),
        LogKind::Error => egui::Color32::from_rgb(224, 108, 117),
    }
}

/// Rendered log split into single-height rows, extended as the log grows.
#[derive(Debug, Default)]
pub struct LogRows {
    rows: Vec<(LogKind, String)>,
    consumed: usize,
}

impl LogRows {
    /// Appends rows for lines added since the last sync; the log is append-only.
    pub fn sync(&mut self, lines: &[LogLine]) {
        for line in lines.iter().skip(self.consumed) {
            let rendered = line.render();
            let mut pieces = rendered.lines().peekable();
            if pieces.peek().is_none() {
                self.rows.push((line.kind, String::new()));
            }
            for piece in pieces {
                self.rows.push((line.kind, piece.to_string()));
            }
        }
        self.consumed = lines.len();
    }

    pub fn rows(&self) -> &[(LogKind, String)] {
        &self.rows
    }
}

/// Monospace log that stays pinned to the newest line.
pub fn show_log(ui: &mut egui::Ui, rows: &LogRows) {
    let rows = rows.rows();
    let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show_rows(ui, row_height, rows.len(), |ui, range| {
            for (kind, text) in &rows[range] {
                let color = kind_color(*kind, ui.visuals());
                ui.add(
                    egui::Label::new(egui::RichText::new(text).monospace().color(color))
                        .extend(),
                );
            }
        });
}

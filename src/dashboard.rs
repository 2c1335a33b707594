// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use chrono::Local;
use polarcup_client::{
    lock_diagnostics, lock_display, DiagnosticLevel, DiagnosticMessage, DisplayModel, PollerHandle,
    SharedDiagnostics, SharedDisplay, StatusClass, StatusContainer,
};

const REPAINT_INTERVAL: Duration = Duration::from_millis(500);
const PLACEHOLDER: &str = "--";

/// Fill and accent colors for the cooling-status container
pub fn status_colors(class: Option<StatusClass>) -> (egui::Color32, egui::Color32) {
    match class {
        Some(StatusClass::OptimalTemp) => (
            egui::Color32::from_rgba_unmultiplied(30, 90, 50, 230),
            egui::Color32::from_rgb(120, 230, 140),
        ),
        Some(StatusClass::CoolingActive) => (
            egui::Color32::from_rgba_unmultiplied(25, 60, 110, 230),
            egui::Color32::from_rgb(110, 180, 255),
        ),
        Some(StatusClass::NeedsCooling) => (
            egui::Color32::from_rgba_unmultiplied(110, 45, 30, 230),
            egui::Color32::from_rgb(255, 150, 100),
        ),
        None => (
            egui::Color32::from_rgba_unmultiplied(40, 45, 50, 230),
            egui::Color32::from_rgb(150, 150, 150),
        ),
    }
}

fn level_icon(level: DiagnosticLevel) -> (&'static str, egui::Color32) {
    match level {
        DiagnosticLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 180, 255)),
        DiagnosticLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 200, 100)),
        DiagnosticLevel::Error => ("✕", egui::Color32::from_rgb(255, 100, 100)),
    }
}

fn text_or_placeholder(text: &str) -> &str {
    if text.is_empty() {
        PLACEHOLDER
    } else {
        text
    }
}

/// Copy the diagnostic log out, recovering it if a writer panicked
fn snapshot_diagnostics(diagnostics: &SharedDiagnostics) -> Vec<DiagnosticMessage> {
    lock_diagnostics(diagnostics).iter().cloned().collect()
}

/// Desktop view of the Polar Cup display model
pub struct DashboardApp {
    display: SharedDisplay,
    diagnostics: SharedDiagnostics,
    poller: PollerHandle,
    source_label: String,
    poll_interval: Duration,
    show_diagnostics: bool,
}

impl DashboardApp {
    pub fn new(
        display: SharedDisplay,
        diagnostics: SharedDiagnostics,
        poller: PollerHandle,
        source_label: String,
        poll_interval: Duration,
        show_diagnostics: bool,
    ) -> Self {
        Self {
            display,
            diagnostics,
            poller,
            source_label,
            poll_interval,
            show_diagnostics,
        }
    }

    fn render_readings(ui: &mut egui::Ui, model: &DisplayModel) {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new("TEMPERATURA")
                    .color(egui::Color32::from_rgb(150, 150, 150))
                    .size(11.0)
                    .strong());
                ui.label(egui::RichText::new(text_or_placeholder(model.temperature.text()))
                    .color(egui::Color32::from_rgb(200, 220, 255))
                    .size(40.0)
                    .strong());
            });

            ui.add_space(24.0);

            ui.vertical(|ui| {
                ui.label(egui::RichText::new("CANTIDAD")
                    .color(egui::Color32::from_rgb(150, 150, 150))
                    .size(11.0)
                    .strong());
                ui.label(egui::RichText::new(text_or_placeholder(model.quantity.text()))
                    .color(egui::Color32::from_rgb(200, 220, 255))
                    .size(40.0)
                    .strong());
            });
        });
    }

    fn render_cooling_status(ui: &mut egui::Ui, status: &StatusContainer) {
        let (fill, accent) = status_colors(status.active_class());

        egui::Frame::new()
            .fill(fill)
            .stroke(egui::Stroke::new(1.0, accent))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::same(12))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());

                ui.label(egui::RichText::new(text_or_placeholder(status.status_text.text()))
                    .color(accent)
                    .size(20.0)
                    .strong());

                // Time line is empty unless cooling is active
                if !status.time_text.text().is_empty() {
                    ui.label(egui::RichText::new(status.time_text.text())
                        .color(egui::Color32::from_rgb(220, 220, 220))
                        .size(14.0));
                }
            });
    }

    fn render_footer(&mut self, ui: &mut egui::Ui, model: &DisplayModel) {
        ui.horizontal(|ui| {
            let updated = model.last_updated.map_or_else(
                || "sin datos".to_string(),
                |t| t.with_timezone(&Local).format("%H:%M:%S").to_string(),
            );
            ui.label(egui::RichText::new(format!("Actualizado: {updated}"))
                .color(egui::Color32::from_rgb(120, 120, 120))
                .size(10.0)
                .monospace());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.toggle_value(&mut self.show_diagnostics, "Diagnostics");
            });
        });

        let state = if self.poller.is_running() { "polling" } else { "stopped" };
        ui.label(egui::RichText::new(format!(
            "{} · {} every {} ms",
            self.source_label,
            state,
            self.poll_interval.as_millis()
        ))
        .color(egui::Color32::from_rgb(100, 100, 100))
        .size(9.0));
    }

    fn render_diagnostics_window(&mut self, ctx: &egui::Context, messages: &[DiagnosticMessage]) {
        egui::Window::new("Diagnostics")
            .open(&mut self.show_diagnostics)
            .default_width(360.0)
            .resizable(true)
            .show(ctx, |ui| {
                if messages.is_empty() {
                    ui.label(egui::RichText::new("No messages")
                        .color(egui::Color32::from_rgb(100, 100, 100))
                        .italics());
                    return;
                }

                egui::ScrollArea::vertical()
                    .max_height(240.0)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        // Newest first
                        for diagnostic in messages.iter().rev() {
                            ui.horizontal(|ui| {
                                let (icon, color) = level_icon(diagnostic.level);

                                ui.label(egui::RichText::new(icon).color(color));

                                let time_str = diagnostic
                                    .timestamp
                                    .with_timezone(&Local)
                                    .format("%H:%M:%S")
                                    .to_string();
                                ui.label(egui::RichText::new(time_str)
                                    .color(egui::Color32::from_rgb(100, 100, 100))
                                    .monospace());

                                ui.label(egui::RichText::new(&diagnostic.message)
                                    .color(egui::Color32::from_rgb(200, 200, 200)));
                            });
                        }
                    });
            });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll results arrive on another thread, so repaint on a timer
        ctx.request_repaint_after(REPAINT_INTERVAL);

        // Copy out under the locks, then draw without holding them
        let model = lock_display(&self.display).clone();
        let messages = snapshot_diagnostics(&self.diagnostics);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(egui::RichText::new("◈ POLAR CUP")
                .color(egui::Color32::from_rgb(100, 180, 220))
                .size(14.0)
                .strong());
            ui.separator();
            ui.add_space(8.0);

            Self::render_readings(ui, &model);
            ui.add_space(12.0);
            Self::render_cooling_status(ui, &model.cooling_status);

            ui.add_space(12.0);
            ui.separator();
            self.render_footer(ui, &model);
        });

        self.render_diagnostics_window(ctx, &messages);
    }
}

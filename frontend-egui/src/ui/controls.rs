//! Start/stop toggle.

use eframe::egui;

pub struct Controls;

impl Controls {
    /// Draw the toggle button. Returns true when it was clicked.
    pub fn show(ui: &mut egui::Ui, running: bool) -> bool {
        let text = if running { "Stop service" } else { "Start service" };
        let mut button = egui::Button::new(egui::RichText::new(text).size(16.0))
            .min_size(egui::vec2(180.0, 32.0));
        if running {
            button = button.fill(egui::Color32::from_rgb(200, 40, 40));
        }
        ui.add(button).clicked()
    }
}

//! Modal-style windows: error messages and the quit confirmation.

use eframe::egui;

/// What the user chose in the quit prompt this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitChoice {
    Pending,
    Confirm,
    Cancel,
}

#[derive(Default)]
pub struct Dialogs {
    pub error: Option<String>,
    pub confirm_quit: bool,
}

impl Dialogs {
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn show(&mut self, ctx: &egui::Context) -> QuitChoice {
        if let Some(message) = &self.error {
            let mut dismissed = false;
            centered_window("Error").show(ctx, |ui| {
                ui.label(message);
                ui.add_space(6.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
            if dismissed {
                self.error = None;
            }
        }

        if !self.confirm_quit {
            return QuitChoice::Pending;
        }

        let mut choice = QuitChoice::Pending;
        centered_window("Quit").show(ctx, |ui| {
            ui.label("The service is still running. Are you sure you want to quit?");
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    choice = QuitChoice::Confirm;
                }
                if ui.button("Cancel").clicked() {
                    choice = QuitChoice::Cancel;
                }
            });
        });
        if choice != QuitChoice::Pending {
            self.confirm_quit = false;
        }
        choice
    }
}

fn centered_window(title: &str) -> egui::Window<'static> {
    egui::Window::new(title.to_string())
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
}

//! Status, progress and URL labels.

use eframe::egui;

const URL_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);
const STARTING_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 165, 0);
const RUNNING_COLOR: egui::Color32 = egui::Color32::from_rgb(80, 200, 120);
const HINT_COLOR: egui::Color32 = egui::Color32::GRAY;

pub struct StatusPanel {
    pub status: String,
    pub status_color: Option<egui::Color32>,
    pub progress: String,
    pub url: String,
}

impl Default for StatusPanel {
    fn default() -> Self {
        Self {
            status: "Status: Stopped".to_string(),
            status_color: None,
            progress: "Click Start to launch the service".to_string(),
            url: "URL will appear here".to_string(),
        }
    }
}

impl StatusPanel {
    pub fn starting(&mut self) {
        self.status = "Status: Starting...".to_string();
        self.status_color = Some(STARTING_COLOR);
        self.progress = "Launching start command...".to_string();
        self.url = "Waiting for service...".to_string();
    }

    pub fn progress(&mut self, message: String) {
        self.progress = message;
    }

    pub fn ready(&mut self, url: &str) {
        self.status = "Status: Running".to_string();
        self.status_color = Some(RUNNING_COLOR);
        self.url = url.to_string();
    }

    pub fn stopped(&mut self) {
        self.status = "Status: Stopped".to_string();
        self.status_color = None;
        self.progress = "Click Start to launch the service".to_string();
        self.url = "Service stopped".to_string();
    }

    /// URL to open when the link label is clicked, if it currently holds one.
    pub fn link_target(&self) -> Option<String> {
        self.url
            .starts_with("http")
            .then(|| backend::browser_url(&self.url))
    }

    /// Draw the labels. Returns the URL to open if the link was clicked.
    pub fn show(&self, ui: &mut egui::Ui) -> Option<String> {
        let mut status = egui::RichText::new(&self.status).size(18.0);
        if let Some(color) = self.status_color {
            status = status.color(color);
        }
        ui.label(status);

        ui.label(
            egui::RichText::new(&self.progress)
                .size(14.0)
                .color(HINT_COLOR),
        );

        let link = ui
            .add(
                egui::Label::new(egui::RichText::new(&self.url).size(15.0).color(URL_COLOR))
                    .sense(egui::Sense::click()),
            )
            .on_hover_cursor(egui::CursorIcon::PointingHand);

        if link.clicked() {
            self.link_target()
        } else {
            None
        }
    }
}

//! The launcher window: wires the supervisor to the labels and buttons.

use backend::{LaunchSpec, ServiceProfile, Supervisor, SupervisorError, SupervisorEvent};
use eframe::{egui, App};
use tracing::{info, warn};

use crate::browser::open_in_browser;
use crate::cli::CliArgs;
use crate::ui::controls::Controls;
use crate::ui::dialogs::{Dialogs, QuitChoice};
use crate::ui::status_panel::StatusPanel;

pub struct LauncherApp {
    supervisor: Supervisor,
    status_panel: StatusPanel,
    dialogs: Dialogs,
    auto_open: bool,
    quitting: bool,
}

impl LauncherApp {
    pub fn new(cc: &eframe::CreationContext<'_>, args: &CliArgs) -> Self {
        let launch = LaunchSpec::index_tts(args.project_dir());
        info!(project_dir = %launch.project_dir.display(), "launcher ready");

        // The reader thread wakes the UI so events are drained promptly.
        let ctx = cc.egui_ctx.clone();
        let supervisor =
            Supervisor::new(launch, ServiceProfile::default()).with_waker(move || ctx.request_repaint());

        Self::with_supervisor(supervisor, !args.no_browser)
    }

    fn with_supervisor(supervisor: Supervisor, auto_open: bool) -> Self {
        Self {
            supervisor,
            status_panel: StatusPanel::default(),
            dialogs: Dialogs::default(),
            auto_open,
            quitting: false,
        }
    }

    fn toggle(&mut self) {
        if self.supervisor.is_running() {
            self.stop();
        } else {
            match self.supervisor.start() {
                Ok(()) => self.status_panel.starting(),
                Err(e) => {
                    warn!(error = %e, "start failed");
                    self.dialogs.show_error(format!("Failed to start: {e}"));
                }
            }
        }
    }

    fn stop(&mut self) {
        if let Err(e) = self.supervisor.stop() {
            self.report_stop_error(&e);
        }
        self.apply_events();
    }

    /// The window closes in the same frame on quit, so a dialog would never
    /// be seen there; the error is only logged.
    fn report_stop_error(&mut self, e: &SupervisorError) {
        warn!(error = %e, quitting = self.quitting, "stop reported an error");
        if !self.quitting {
            self.dialogs
                .show_error(format!("Error while stopping the service: {e}"));
        }
    }

    fn apply_events(&mut self) {
        for event in self.supervisor.poll_events() {
            match event {
                SupervisorEvent::Status(message) => self.status_panel.progress(message),
                SupervisorEvent::Ready { url, browser_url } => {
                    self.status_panel.ready(&url);
                    if self.auto_open {
                        open_in_browser(browser_url);
                    }
                }
                SupervisorEvent::Stopped { unexpected } => {
                    if unexpected {
                        info!("service stopped by itself");
                    }
                    self.status_panel.stopped();
                }
            }
        }
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.viewport().close_requested())
            && self.supervisor.is_running()
            && !self.quitting
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.dialogs.confirm_quit = true;
        }
    }
}

impl App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_events();
        self.handle_close_request(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                if let Some(url) = self.status_panel.show(ui) {
                    open_in_browser(url);
                }
                ui.add_space(10.0);
                if Controls::show(ui, self.supervisor.is_running()) {
                    self.toggle();
                }
            });
        });

        match self.dialogs.show(ctx) {
            QuitChoice::Confirm => {
                self.quitting = true;
                self.stop();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            QuitChoice::Cancel | QuitChoice::Pending => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_app() -> LauncherApp {
        let launch = LaunchSpec::new("/nonexistent/index-tts", "true", Vec::<String>::new());
        LauncherApp::with_supervisor(Supervisor::new(launch, ServiceProfile::default()), false)
    }

    #[test]
    fn stop_error_shows_dialog_while_window_stays_open() {
        let mut app = idle_app();
        app.report_stop_error(&SupervisorError::AlreadyRunning);
        assert!(app.dialogs.error.is_some());
    }

    #[test]
    fn stop_error_on_quit_is_only_logged() {
        let mut app = idle_app();
        app.quitting = true;
        app.report_stop_error(&SupervisorError::AlreadyRunning);
        assert!(app.dialogs.error.is_none());
    }

    #[test]
    fn failed_start_shows_dialog_and_keeps_labels() {
        let mut app = idle_app();
        app.toggle();
        assert!(app.dialogs.error.as_deref().unwrap().contains("does not exist"));
        assert!(!app.supervisor.is_running());
        assert_eq!(app.status_panel.status, "Status: Stopped");
    }
}

pub mod controls;
pub mod dialogs;
pub mod status_panel;

use eframe::egui;

use crate::config::AppConfig;
use crate::state::{self, AppState};
use crate::ui::{panels, results, Action};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DirectorioApp {
    pub state: AppState,
}

impl DirectorioApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Reload => self.state.reload(),
            Action::SaveCsv => state::save_csv_dialog(&mut self.state),
            Action::SaveHtml => state::save_html_dialog(&mut self.state),
        }
    }
}

impl eframe::App for DirectorioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        let top_action = egui::TopBottomPanel::top("top_bar")
            .show(ctx, |ui| panels::top_bar(ui, &self.state))
            .inner;

        // ---- Left side panel: search and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables and cards ----
        let central_action = egui::CentralPanel::default()
            .show(ctx, |ui| results::central_panel(ui, &self.state))
            .inner;

        for action in [top_action, central_action].into_iter().flatten() {
            self.apply(action);
        }
    }
}

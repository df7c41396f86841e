use eframe::egui;

use covid_dashboard::config::DashboardConfig;

use crate::state::AppState;
use crate::ui::{overview, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CovidDashboardApp {
    pub state: AppState,
}

impl CovidDashboardApp {
    /// Build the app and load the configured data file.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        let path = state.data_path.clone();
        state.load(&path);
        Self { state }
    }
}

impl eframe::App for CovidDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, correlation, insights ----
        egui::CentralPanel::default().show(ctx, |ui| {
            overview::central_panel(ui, &mut self.state);
        });
    }
}

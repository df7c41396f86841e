mod app;
mod color;
mod state;
mod ui;

use app::CovidDashboardApp;
use covid_dashboard::config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match DashboardConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration, using defaults: {e:#}");
            DashboardConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 860.0])
            .with_min_inner_size([700.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "COVID-19 Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CovidDashboardApp::new(config)))),
    )
}

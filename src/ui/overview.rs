use eframe::egui::{self, RichText, ScrollArea, Ui};

use covid_dashboard::report::{format_optional_count, CountryReport, CountrySummary, NOT_AVAILABLE};

use crate::state::{AppState, TrendTab};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – overview of the selected location
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("COVID-19 Data Analysis and Visualization Dashboard");
    ui.label(
        "Daily and cumulative cases and deaths per country, with rolling averages \
         and the relationships between them.",
    );
    ui.separator();

    // Taken out for the frame so the widgets below can borrow `state` mutably.
    let Some(report) = state.report.take() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data file to begin  (File → Open…)");
        });
        return;
    };
    let summary = report.summary();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(format!("COVID-19 Overview: {}", report.location()));
            headline_metrics(ui, &summary);
            ui.add_space(8.0);

            ui.horizontal(|ui: &mut Ui| {
                ui.selectable_value(&mut state.tab, TrendTab::Cases, "📈 Cases Trend");
                ui.selectable_value(&mut state.tab, TrendTab::Deaths, "⚰ Deaths Trend");
            });
            plot::trend_plot(ui, state, &report);
            ui.add_space(8.0);

            ui.heading("Correlation Between Key Variables");
            match &state.correlation {
                Some(matrix) => plot::correlation_heatmap(ui, matrix),
                None => {
                    ui.label(format!("Correlation: {NOT_AVAILABLE}"));
                }
            }

            ui.separator();
            insights(ui, &report, &summary);
        });

    state.report = Some(report);
}

fn headline_metrics(ui: &mut Ui, summary: &CountrySummary) {
    let peak = summary
        .peak_new_cases
        .map(|p| p.value as i64);
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total Cases", &format_optional_count(summary.total_cases));
        metric(&mut cols[1], "Total Deaths", &format_optional_count(summary.total_deaths));
        metric(&mut cols[2], "Peak New Cases", &format_optional_count(peak));
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(value).size(24.0).strong());
    });
}

fn insights(ui: &mut Ui, report: &CountryReport, summary: &CountrySummary) {
    ui.heading("Insights & Key Observations");
    let location = report.location();
    let peak = summary.peak_new_cases.map(|p| p.value as i64);

    ui.label(format!(
        "• Peak daily new cases in {location} reached {}.",
        format_optional_count(peak)
    ));
    ui.label(format!(
        "• The highest surge occurred around {}.",
        summary.surge_month().unwrap_or_else(|| NOT_AVAILABLE.to_string())
    ));
    ui.label(format!(
        "• Total confirmed cases: {}",
        format_optional_count(summary.total_cases)
    ));
    ui.label(format!(
        "• Total deaths recorded: {}",
        format_optional_count(summary.total_deaths)
    ));
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        ui.label(format!(
            "• {} observations from {first} to {last}.",
            summary.observations
        ));
    }
}

use chrono::{Datelike, NaiveDate};
use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, Line, Plot};

use covid_dashboard::data::metrics::CorrelationMatrix;
use covid_dashboard::data::schema;
use covid_dashboard::report::CountryReport;

use crate::color;
use crate::state::{AppState, TrendTab};

// ---------------------------------------------------------------------------
// Date axis
// ---------------------------------------------------------------------------

fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Points of a series on the date axis, skipping missing values and dates
/// outside the active window.
fn points(state: &AppState, dates: &[NaiveDate], values: &[Option<f64>]) -> Vec<[f64; 2]> {
    dates
        .iter()
        .zip(values)
        .filter(|(d, _)| state.in_range(**d))
        .filter_map(|(d, v)| v.map(|v| [date_to_x(*d), v]))
        .collect()
}

// ---------------------------------------------------------------------------
// Trend chart (daily values + rolling average)
// ---------------------------------------------------------------------------

/// Render the daily series and its rolling average for the selected tab.
pub fn trend_plot(ui: &mut Ui, state: &AppState, report: &CountryReport) {
    let (field, average, noun) = match state.tab {
        TrendTab::Cases => (schema::NEW_CASES, &report.new_cases_avg, "Cases"),
        TrendTab::Deaths => (schema::NEW_DEATHS, &report.new_deaths_avg, "Deaths"),
    };

    ui.heading(format!(
        "Daily and {}-Day Average New {noun}: {}",
        report.window,
        report.location()
    ));

    let Some(average) = average else {
        ui.label(format!("No '{field}' column in this dataset."));
        return;
    };

    let dates = report.view.dates();
    let daily = report.view.series(field);
    let (daily_color, avg_color) = color::trend_colors(state.tab, ui.visuals().dark_mode);

    Plot::new(("trend_plot", field))
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label("Date")
        .y_axis_label(noun)
        .x_axis_formatter(|mark, _range| {
            x_to_date(mark.value)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .label_formatter(|name, value| {
            let date = x_to_date(value.x)
                .map(|d| d.to_string())
                .unwrap_or_default();
            if name.is_empty() {
                date
            } else {
                format!("{name}\n{date}: {:.1}", value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points(state, &dates, &daily))
                    .name(format!("Daily {noun}"))
                    .color(daily_color)
                    .width(1.0),
            );
            plot_ui.line(
                Line::new(points(state, &dates, average))
                    .name(format!("{}-Day Avg", report.window))
                    .color(avg_color)
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Render the correlation matrix as a coloured table.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let fields = matrix.fields();
    let n = fields.len();

    ui.push_id("correlation", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(false)
            .column(Column::auto().at_least(130.0))
            .columns(Column::exact(110.0), n)
            .header(22.0, |mut header| {
                header.col(|_ui| {});
                for f in fields {
                    header.col(|ui| {
                        ui.strong(f);
                    });
                }
            })
            .body(|mut body| {
                for (i, row_name) in fields.iter().enumerate() {
                    body.row(24.0, |mut row| {
                        row.col(|ui| {
                            ui.strong(row_name);
                        });
                        for j in 0..n {
                            let r = matrix.at(i, j);
                            row.col(|ui| {
                                ui.painter().rect_filled(ui.max_rect(), 0.0, color::coolwarm(r));
                                let text = r.map(|r| format!("{r:.2}")).unwrap_or_else(|| "n/a".into());
                                ui.label(RichText::new(text).color(color::text_on(r)));
                            });
                        }
                    });
                }
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_axis_round_trips_whole_days() {
        let d = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
        assert_eq!(x_to_date(date_to_x(d)), Some(d));
        assert_eq!(x_to_date(date_to_x(d) + 0.4), Some(d));
    }
}

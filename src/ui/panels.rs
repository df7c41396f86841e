use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ui.strong("Select Country");
    let current = state.selected_location.clone().unwrap_or_default();
    let mut chosen: Option<String> = None;
    egui::ComboBox::from_id_salt("country")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ScrollArea::vertical().max_height(400.0).show(ui, |ui: &mut Ui| {
                for loc in dataset.locations() {
                    if ui.selectable_label(current == *loc, loc).clicked() {
                        chosen = Some(loc.clone());
                    }
                }
            });
        });
    if let Some(loc) = chosen {
        state.select_location(&loc);
    }

    ui.separator();
    date_range_controls(ui, state);

    ui.separator();
    let report = dataset.load_report();
    ui.label(format!("{} observations", dataset.len()));
    ui.label(format!("{} locations", dataset.locations().len()));
    if report.rows_dropped > 0 {
        ui.label(format!("{} rows skipped (bad date)", report.rows_dropped));
    }
    if report.invalid_numeric_cells > 0 {
        ui.label(format!("{} invalid count cells", report.invalid_numeric_cells));
    }
}

/// Optional date window restricting the trend charts.
fn date_range_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(report) = &state.report else {
        return;
    };
    let (Some(first), Some(last)) = (report.view.first_date(), report.view.last_date()) else {
        return;
    };

    let mut enabled = state.date_range.is_some();
    if ui.checkbox(&mut enabled, "Limit date range").changed() {
        state.date_range = enabled.then_some((first, last));
    }

    if let Some((mut start, mut end)) = state.date_range {
        ui.horizontal(|ui: &mut Ui| {
            ui.label("From");
            ui.add(DatePickerButton::new(&mut start).id_salt("range_start"));
        });
        ui.horizontal(|ui: &mut Ui| {
            ui.label("To");
            ui.add(DatePickerButton::new(&mut end).id_salt("range_end"));
        });
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        state.date_range = Some((start, end));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            let can_export = state.report.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export summary…"))
                .clicked()
            {
                export_summary_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(state.data_path.display().to_string());

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open COVID-19 data")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

pub fn export_summary_dialog(state: &mut AppState) {
    let Some(report) = &state.report else {
        return;
    };
    let summary = report.summary();
    let file: Option<PathBuf> = rfd::FileDialog::new()
        .set_title("Export summary")
        .set_file_name(format!("{}_summary.json", summary.location.replace(' ', "_")))
        .add_filter("JSON", &["json"])
        .save_file();

    let Some(path) = file else {
        return;
    };
    let result = serde_json::to_string_pretty(&summary)
        .map_err(anyhow::Error::from)
        .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));
    match result {
        Ok(()) => {
            log::info!("Exported summary for {} to {}", summary.location, path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to export summary: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

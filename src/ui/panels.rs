use std::path::Path;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;
use sales_dashboard::data::filter::{self, DateRange, FILTER_DIMENSIONS};
use sales_dashboard::data::loader::FileFormat;
use sales_dashboard::report;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let dimensions: Vec<_> = FILTER_DIMENSIONS
        .into_iter()
        .filter(|c| dataset.has(*c))
        .map(|c| (c, dataset.unique_values(c)))
        .collect();
    let observed = filter::observed_date_range(dataset);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Per-column filter widgets (collapsible) ----
            for (column, all_values) in &dimensions {
                let n_selected = state
                    .selection
                    .allowed
                    .get(column)
                    .map_or(0, |s| s.len());
                let header_text = format!("{column}  ({n_selected}/{})", all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column.name())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(*column);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(*column);
                            }
                        });

                        for val in all_values {
                            let mut checked = state
                                .selection
                                .allowed
                                .get(column)
                                .is_some_and(|s| s.contains(val));
                            if ui.checkbox(&mut checked, val.label()).changed() {
                                state.toggle_filter_value(*column, val);
                            }
                        }
                    });
            }

            // ---- Date window ----
            if let Some((min, max)) = observed {
                ui.separator();
                ui.strong("Invoice Date");

                let mut start = state.selection.date_range.start.unwrap_or(min);
                let mut end = state.selection.date_range.end.unwrap_or(max);
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    ui.add(DatePickerButton::new(&mut start).id_salt("date_from"));
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    ui.add(DatePickerButton::new(&mut end).id_salt("date_to"));
                });

                let picked = DateRange::new(start.clamp(min, max), end.clamp(min, max));
                if picked != state.selection.date_range {
                    state.set_date_range(picked);
                }
                if ui.small_button("Full range").clicked() {
                    state.set_date_range(DateRange::new(min, max));
                }
            }
        });
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
            let has_data = state.dataset.is_some();
            if ui
                .add_enabled(has_data, egui::Button::new("Save CSV…"))
                .clicked()
            {
                save_csv_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_data, egui::Button::new("Save report…"))
                .clicked()
            {
                save_report_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{}: {} records loaded, {} visible",
                state.source_name.as_deref().unwrap_or("dataset"),
                ds.len(),
                state.filtered.len()
            ));
        }

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
        .set_title("Open sales data")
        .add_filter("Supported files", &FileFormat::EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn save_csv_dialog(state: &mut AppState) {
    let name = report::export_file_name(state.settings.csv_prefix, "csv", today());
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name(name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    let result = state
        .csv_export()
        .context("encoding CSV")
        .and_then(|bytes| write_file(&path, &bytes));
    finish_save(state, &path, result);
}

pub fn save_report_dialog(state: &mut AppState) {
    let name = report::export_file_name(state.settings.report_prefix, "txt", today());
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save summary report")
        .set_file_name(name)
        .add_filter("Text", &["txt"])
        .save_file()
    else {
        return;
    };

    let result = write_file(&path, state.report().as_bytes());
    finish_save(state, &path, result);
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn finish_save(state: &mut AppState, path: &Path, result: anyhow::Result<()>) {
    match result {
        Ok(()) => log::info!("Saved {}", path.display()),
        Err(e) => {
            log::error!("Failed to save: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};
use rust_decimal::prelude::ToPrimitive;
use sales_dashboard::data::aggregate::{GroupedSum, Summary};
use sales_dashboard::data::{Column, SalesTable};
use sales_dashboard::report::{format_count, format_currency, format_units};

use crate::color::ColorMap;
use crate::state::AppState;
use crate::ui::panels;

const CHART_HEIGHT: f32 = 280.0;
const LINE_COLOR: Color32 = Color32::from_rgb(0x66, 0x7e, 0xea);

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render metrics, charts, preview and downloads in the central panel.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        welcome(ui);
        return;
    }

    let view = state.dashboard();

    metric_cards(ui, &view.summary);
    ui.add_space(8.0);

    ui.columns(2, |cols: &mut [Ui]| {
        section(&mut cols[0], "Revenue by Region", |ui: &mut Ui| {
            match &view.by_region {
                Some(groups) => {
                    // Horizontal bars read bottom-up, so the largest lands on top.
                    let mut sorted = plot_values(groups);
                    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
                    bar_chart(ui, "region_chart", &sorted, true);
                }
                None => missing_column(ui, Column::Region),
            }
        });
        section(&mut cols[1], "Sales Method Distribution", |ui: &mut Ui| {
            match &view.by_sales_method {
                Some(groups) => {
                    share_legend(ui, groups);
                    bar_chart(ui, "method_chart", &plot_values(groups), false);
                }
                None => missing_column(ui, Column::SalesMethod),
            }
        });
    });

    section(ui, "Top Products by Revenue", |ui: &mut Ui| {
        match &view.top_products {
            Some(groups) => bar_chart(ui, "product_chart", &plot_values(groups), false),
            None => missing_column(ui, Column::Product),
        }
    });

    if let Some(monthly) = &view.monthly {
        section(ui, "Monthly Sales Trend", |ui: &mut Ui| {
            monthly_chart(ui, monthly);
        });
    }

    data_preview(ui, &state.filtered, state.settings.preview_rows);

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Download CSV").clicked() {
            panels::save_csv_dialog(state);
        }
        if ui.button("Download Report").clicked() {
            panels::save_report_dialog(state);
        }
    });
}

fn welcome(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading("Open a sales file to get started  (File → Open…)");
        ui.add_space(16.0);
        ui.label("Expected columns (any subset; Total Sales and Units Sold are required):");
        ui.add_space(8.0);
        egui::Grid::new("expected_columns")
            .striped(true)
            .show(ui, |ui: &mut Ui| {
                for column in Column::ALL {
                    ui.label(column.name());
                    ui.end_row();
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

fn metric_cards(ui: &mut Ui, summary: &Summary) {
    let cards = [
        ("Total Revenue", format_currency(summary.total_sales)),
        ("Units Sold", format_units(summary.total_units)),
        ("Transactions", format_count(summary.transactions)),
        ("Avg Margin", format!("{:.1}%", summary.mean_margin * 100.0)),
    ];

    ui.columns(cards.len(), |cols: &mut [Ui]| {
        for (ui, (label, value)) in cols.iter_mut().zip(cards) {
            egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(RichText::new(value).size(24.0).strong());
                    ui.label(label);
                });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn section(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.strong(title);
        ui.separator();
        add_contents(ui);
    });
    ui.add_space(8.0);
}

fn missing_column(ui: &mut Ui, column: Column) {
    ui.label(format!("No \"{column}\" column in this file."));
}

/// One bar per group; category names on the value-less axis.
fn bar_chart(ui: &mut Ui, id: &str, groups: &[(String, f64)], horizontal: bool) {
    let colors = ColorMap::new(groups.iter().map(|(l, _)| l.as_str()));
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::new(i as f64, *value)
                .name(label)
                .fill(colors.color_for(label))
                .width(0.7)
        })
        .collect();

    let mut chart = BarChart::new(bars);
    if horizontal {
        chart = chart.horizontal();
    }

    let labels: Vec<String> = groups.iter().map(|(l, _)| l.clone()).collect();
    let formatter =
        move |mark: GridMark, _range: &RangeInclusive<f64>| category_label(&labels, mark.value);

    let plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false);
    let plot = if horizontal {
        plot.y_axis_formatter(formatter)
    } else {
        plot.x_axis_formatter(formatter)
    };
    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Chart coordinates for grouped revenue.
fn plot_values(groups: &GroupedSum) -> Vec<(String, f64)> {
    groups
        .groups
        .iter()
        .map(|(label, value)| (label.clone(), value.to_f64().unwrap_or_default()))
        .collect()
}

fn share_legend(ui: &mut Ui, groups: &GroupedSum) {
    let values = plot_values(groups);
    let total: f64 = values.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        return;
    }
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, value) in &values {
            ui.label(format!("{label}: {:.1}%", value / total * 100.0));
        }
    });
}

fn monthly_chart(ui: &mut Ui, monthly: &GroupedSum) {
    let coords: Vec<[f64; 2]> = plot_values(monthly)
        .iter()
        .enumerate()
        .map(|(i, (_, v))| [i as f64, *v])
        .collect();
    let line_points: PlotPoints = coords.iter().copied().collect();
    let marker_points: PlotPoints = coords.into_iter().collect();

    let labels: Vec<String> = monthly.groups.iter().map(|(l, _)| l.clone()).collect();

    Plot::new("monthly_chart")
        .height(CHART_HEIGHT)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(line_points)
                    .name("Total Sales")
                    .color(LINE_COLOR)
                    .width(3.0),
            );
            plot_ui.points(Points::new(marker_points).color(LINE_COLOR).radius(4.0));
        });
}

/// Axis label for a category index; blank between categories.
fn category_label(labels: &[String], value: f64) -> String {
    if value < 0.0 || (value - value.round()).abs() > 1e-6 {
        return String::new();
    }
    labels.get(value.round() as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Data preview
// ---------------------------------------------------------------------------

fn data_preview(ui: &mut Ui, table: &SalesTable, max_rows: usize) {
    egui::CollapsingHeader::new("View Data")
        .id_salt("data_preview")
        .show(ui, |ui: &mut Ui| {
            ScrollArea::both()
                .max_height(320.0)
                .show(ui, |ui: &mut Ui| {
                    egui::Grid::new("preview_grid")
                        .striped(true)
                        .show(ui, |ui: &mut Ui| {
                            for column in table.columns() {
                                ui.strong(column.as_str());
                            }
                            ui.end_row();

                            for row in table.rows().iter().take(max_rows) {
                                for column in table.columns() {
                                    ui.label(row.get_named(column).export_text());
                                }
                                ui.end_row();
                            }
                        });
                });
        });
}

use std::path::Path;

use sales_dashboard::data::aggregate::{self, Dashboard, TOP_PRODUCTS};
use sales_dashboard::data::filter::{self, DateRange, FilterSelection};
use sales_dashboard::data::{self as pipeline, CellValue, Column, LoadError, SalesTable};
use sales_dashboard::report;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Dashboard tunables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Products shown in the ranking chart.
    pub top_products: usize,
    /// Rows shown in the data preview.
    pub preview_rows: usize,
    pub csv_prefix: &'static str,
    pub report_prefix: &'static str,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            top_products: TOP_PRODUCTS,
            preview_rows: 100,
            csv_prefix: "sales_data",
            report_prefix: "sales_report",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
///
/// Every user action goes through one of the methods below and leaves a
/// fresh `filtered` snapshot behind.
#[derive(Default)]
pub struct AppState {
    /// Cleaned dataset (None until user loads a file).
    pub dataset: Option<SalesTable>,

    /// File name of the loaded dataset.
    pub source_name: Option<String>,

    /// Per-column filter selections and the date window.
    pub selection: FilterSelection,

    /// Rows passing the current filters.
    pub filtered: SalesTable,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub settings: Settings,
}

impl AppState {
    /// Ingest an uploaded byte stream. Failures become the status message and
    /// leave any previously loaded dataset in place.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let result = pipeline::ingest(bytes, ext);
        self.install(name, result);
    }

    /// Ingest a file from disk.
    pub fn load_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let result = pipeline::ingest_path(path);
        self.install(&name, result);
    }

    fn install(&mut self, name: &str, result: Result<SalesTable, LoadError>) {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records from {name} with columns {:?}",
                    dataset.len(),
                    dataset.columns()
                );
                self.source_name = Some(name.to_string());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Install a cleaned dataset and reset filters to "everything selected".
    pub fn set_dataset(&mut self, dataset: SalesTable) {
        self.selection = FilterSelection::from_table(&dataset);
        self.filtered = filter::apply(&dataset, &self.selection);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute the filtered snapshot after a selection change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filtered = filter::apply(ds, &self.selection);
            log::debug!("{} of {} records pass the filters", self.filtered.len(), ds.len());
        }
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: Column, value: &CellValue) {
        let selected = self.selection.allowed.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: Column) {
        if let Some(ds) = &self.dataset {
            if ds.has(column) {
                self.selection.allowed.insert(column, ds.unique_values(column));
                self.refilter();
            }
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: Column) {
        self.selection.allowed.insert(column, Default::default());
        self.refilter();
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.selection.date_range = range;
        self.refilter();
    }

    /// Aggregates over the current snapshot. Recomputed on every call.
    pub fn dashboard(&self) -> Dashboard {
        aggregate::dashboard(&self.filtered, self.settings.top_products)
    }

    pub fn csv_export(&self) -> csv::Result<Vec<u8>> {
        report::to_csv(&self.filtered)
    }

    pub fn report(&self) -> String {
        report::summary_report(&aggregate::summarize(&self.filtered))
    }
}

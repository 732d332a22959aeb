/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .xls bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse bytes → raw SalesTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ cleaner  │  canonical headers, typed cells, drop invalid rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  FilterSelection → filtered SalesTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  summary metrics + grouped sums
///   └───────────┘
/// ```
use std::path::Path;

pub mod aggregate;
pub mod cleaner;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod parse;

pub use error::{CleaningError, LoadError};
pub use model::{CellValue, Column, Row, SalesTable};

/// Load and clean an upload. An empty cleaned table is reported as
/// [`LoadError::Cleaning`].
pub fn ingest(bytes: &[u8], extension: &str) -> Result<SalesTable, LoadError> {
    finish(loader::load_bytes(bytes, extension)?)
}

/// [`ingest`] for a file on disk.
pub fn ingest_path(path: &Path) -> Result<SalesTable, LoadError> {
    finish(loader::load_path(path)?)
}

fn finish(raw: SalesTable) -> Result<SalesTable, LoadError> {
    let cleaned = cleaner::clean(raw);
    if cleaned.is_empty() {
        return Err(LoadError::Cleaning);
    }
    Ok(cleaned)
}

use std::collections::BTreeMap;

use super::error::CleaningError;
use super::model::{Column, Row, SalesTable};

/// Columns a row must have a value for to survive cleaning.
pub const REQUIRED_COLUMNS: [Column; 2] = [Column::TotalSales, Column::UnitsSold];

/// Normalize a raw table into a cleaned one.
///
/// Faults are logged and turn into an empty table, so callers only need to
/// check [`SalesTable::is_empty`].
pub fn clean(raw: SalesTable) -> SalesTable {
    match try_clean(raw) {
        Ok(table) => table,
        Err(e) => {
            log::error!("Error cleaning data: {e}");
            SalesTable::default()
        }
    }
}

/// Normalize a raw table, reporting faults instead of swallowing them.
///
/// 1. trim headers; known headers take their canonical spelling
/// 2. parse every known column with its role's strategy (see [`super::parse`])
/// 3. drop rows missing `Total Sales` or `Units Sold`
///
/// Unknown columns are carried through untouched.
pub fn try_clean(raw: SalesTable) -> Result<SalesTable, CleaningError> {
    let renames = canonical_headers(raw.columns())?;
    let columns: Vec<String> = renames.iter().map(|(_, new)| new.clone()).collect();
    let cleaned = SalesTable::new(columns.clone(), Vec::new());

    for required in REQUIRED_COLUMNS {
        if !cleaned.has(required) {
            return Err(CleaningError::MissingColumn(required.name()));
        }
    }

    let (_, raw_rows) = raw.into_parts();
    let total = raw_rows.len();
    let rows: Vec<Row> = raw_rows
        .into_iter()
        .map(|row| clean_row(row, &renames))
        .filter(|row| REQUIRED_COLUMNS.iter().all(|c| !row.get(*c).is_null()))
        .collect();

    let dropped = total - rows.len();
    if dropped > 0 {
        log::info!("Dropped {dropped} of {total} rows missing Total Sales or Units Sold");
    }
    Ok(SalesTable::new(columns, rows))
}

/// Pair every raw header with the name it takes in the cleaned table.
fn canonical_headers(raw: &[String]) -> Result<Vec<(String, String)>, CleaningError> {
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    let mut pairs = Vec::with_capacity(raw.len());

    for name in raw {
        let canonical = match Column::from_header(name) {
            Some(column) => column.name().to_string(),
            None => name.trim().to_string(),
        };
        if let Some(first) = owners.insert(canonical.clone(), name) {
            return Err(CleaningError::DuplicateColumn {
                first: first.to_string(),
                second: name.clone(),
                canonical,
            });
        }
        pairs.push((name.clone(), canonical));
    }
    Ok(pairs)
}

fn clean_row(mut row: Row, renames: &[(String, String)]) -> Row {
    renames
        .iter()
        .map(|(old, new)| {
            let cell = row.take_named(old);
            let cell = match Column::from_name(new) {
                Some(column) => column.role().parse(cell),
                None => cell,
            };
            (new.clone(), cell)
        })
        .collect()
}

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{CellValue, Column, SalesTable};

/// Categorical columns the user can filter on.
pub const FILTER_DIMENSIONS: [Column; 2] = [Column::Region, Column::SalesMethod];

// ---------------------------------------------------------------------------
// Filter predicate: allowed values per column plus a date window
// ---------------------------------------------------------------------------

/// Inclusive date window. Only constrains rows once both ends are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start?, self.end?))
    }
}

/// Per-column selection state plus the date window.
///
/// A column absent from `allowed` is unconstrained; a column mapped to an
/// empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub allowed: BTreeMap<Column, BTreeSet<CellValue>>,
    pub date_range: DateRange,
}

impl FilterSelection {
    /// Everything selected: every observed value of each filter dimension and
    /// the full observed date range.
    pub fn from_table(table: &SalesTable) -> Self {
        let allowed = FILTER_DIMENSIONS
            .into_iter()
            .filter(|c| table.has(*c))
            .map(|c| (c, table.unique_values(c)))
            .collect();
        let date_range = observed_date_range(table)
            .map(|(start, end)| DateRange::new(start, end))
            .unwrap_or_default();
        FilterSelection {
            allowed,
            date_range,
        }
    }

    fn admits(&self, table: &SalesTable, index: usize) -> bool {
        let row = &table.rows()[index];

        let values_ok = self
            .allowed
            .iter()
            .filter(|(column, _)| table.has(**column))
            .all(|(column, selected)| selected.contains(row.get(*column)));

        let date_ok = match self.date_range.bounds() {
            Some((start, end)) if table.has(Column::InvoiceDate) => row
                .get(Column::InvoiceDate)
                .as_date()
                .is_some_and(|d| start <= d && d <= end),
            _ => true,
        };

        values_ok && date_ok
    }
}

/// Earliest and latest `Invoice Date` in the table, if any.
pub fn observed_date_range(table: &SalesTable) -> Option<(NaiveDate, NaiveDate)> {
    if !table.has(Column::InvoiceDate) {
        return None;
    }
    let mut dates = table
        .rows()
        .iter()
        .filter_map(|r| r.get(Column::InvoiceDate).as_date());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Return indices of rows that pass every active filter.
///
/// A row passes a column filter when:
/// * The column is not in the table or not in `allowed` → passes (no constraint)
/// * The selected set for that column is empty → fails
/// * The row's value for that column (null included) is selected → passes
///
/// The date window applies only when the table has `Invoice Date` and both
/// bounds are set; rows with a null date then fail.
pub fn filtered_indices(table: &SalesTable, selection: &FilterSelection) -> Vec<usize> {
    (0..table.len())
        .filter(|&i| selection.admits(table, i))
        .collect()
}

/// The filtered record set as a new table.
pub fn apply(table: &SalesTable, selection: &FilterSelection) -> SalesTable {
    table.subset(&filtered_indices(table, selection))
}

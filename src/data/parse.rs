//! Parsing strategies used by the cleaner, one per [`ColumnRole`].
//!
//! Every strategy maps an unparseable cell to null instead of failing.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::model::{CellValue, ColumnRole};

/// Date layouts tried in order. Month-first wins for ambiguous slash dates,
/// and two-digit years are tried before four-digit ones.
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%B %d, %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

impl ColumnRole {
    /// Apply this role's strategy to a single cell.
    pub fn parse(self, cell: CellValue) -> CellValue {
        match self {
            ColumnRole::Text => cell,
            ColumnRole::Currency => parse_currency(&cell).map_or(CellValue::Null, CellValue::Money),
            ColumnRole::Numeric => parse_number(&cell).map_or(CellValue::Null, CellValue::Float),
            ColumnRole::Percent => parse_percent(&cell).map_or(CellValue::Null, CellValue::Float),
            ColumnRole::Date => parse_date(&cell).map_or(CellValue::Null, CellValue::Date),
        }
    }
}

/// `"$1,234.50"` → `1234.50`, `"-$5"` → `-5`. Numeric cells are converted
/// to decimals; non-finite floats are rejected.
pub fn parse_currency(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Text(s) => Decimal::from_str(s.replace(['$', ','], "").trim()).ok(),
        CellValue::Money(d) => Some(*d),
        CellValue::Integer(i) => Some(Decimal::from(*i)),
        CellValue::Float(v) => Decimal::from_f64(*v),
        _ => None,
    }
}

/// Plain number, no separators stripped.
pub fn parse_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Text(s) => parse_finite(s),
        other => numeric_cell(other),
    }
}

/// `"12.5%"` → `0.125`; `"12.5"` → `0.125`.
///
/// Numeric cells are already fractions (spreadsheets store `12.5%` as
/// `0.125`, and so does a cleaned table) and pass through unchanged.
pub fn parse_percent(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Text(s) => {
            let s = s.trim();
            parse_finite(s.strip_suffix('%').unwrap_or(s)).map(|v| v / 100.0)
        }
        other => numeric_cell(other),
    }
}

/// Flexible date inference over [`DATE_FORMATS`] and [`DATETIME_FORMATS`].
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => {
            let s = s.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                        .map(|dt| dt.date())
                })
        }
        _ => None,
    }
}

fn numeric_cell(cell: &CellValue) -> Option<f64> {
    cell.as_f64().filter(|v| v.is_finite())
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

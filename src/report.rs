//! Download artifacts: CSV re-export of the filtered table and the plain-text
//! summary report.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::data::aggregate::Summary;
use crate::data::SalesTable;

/// The table as CSV: header row, columns in source order, nulls as empty cells.
pub fn to_csv(table: &SalesTable) -> csv::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(table.columns().iter().map(|c| row.get_named(c).export_text()))?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Plain-text sales report for the filtered table.
pub fn summary_report(summary: &Summary) -> String {
    let date_range = match summary.date_range {
        Some((start, end)) => format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")),
        None => "n/a".to_string(),
    };
    format!(
        "# Sales Report\n\
         \n\
         Total Revenue: {}\n\
         Total Units: {}\n\
         Transactions: {}\n\
         Date Range: {date_range}\n",
        format_currency(summary.total_sales),
        format_units(summary.total_units),
        format_count(summary.transactions),
    )
}

/// `"{prefix}_{YYYYMMDD}.{extension}"`
pub fn export_file_name(prefix: &str, extension: &str, date: NaiveDate) -> String {
    format!("{prefix}_{}.{extension}", date.format("%Y%m%d"))
}

/// `1225000` → `"$1,225,000.00"`, `-5` → `"-$5.00"`
pub fn format_currency(value: Decimal) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    let cents = value.abs().round_dp(2).to_f64().unwrap_or_default();
    format!("{sign}${}", format_num::format_num!(",.2f", cents))
}

/// `2450.0` → `"2,450"`
pub fn format_units(value: f64) -> String {
    format_num::format_num!(",.0f", value)
}

pub fn format_count(n: usize) -> String {
    format_num::format_num!(",.0f", n as f64)
}

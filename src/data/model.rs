use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the sales table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Currency amount, kept exact.
    Money(Decimal),
    Date(NaiveDate),
    Text(String),
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Money(_) => 4,
                Date(_) => 5,
                Text(_) => 6,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Money(a), Money(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Money(d) => write!(f, "{d}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Money(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Exact view of a currency cell.
    pub fn as_money(&self) -> Option<Decimal> {
        match self {
            CellValue::Money(d) => Some(*d),
            CellValue::Integer(i) => Some(Decimal::from(*i)),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text shown next to a filter checkbox.
    pub fn label(&self) -> String {
        match self {
            CellValue::Null => "(blank)".to_string(),
            other => other.to_string(),
        }
    }

    /// Text written to CSV exports: like `Display`, but nulls are empty.
    pub fn export_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Known columns and their parsing roles
// ---------------------------------------------------------------------------

/// How the cleaner interprets the cells of a known column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Free text, left untouched.
    Text,
    /// `$` and `,` stripped, then parsed as a decimal.
    Currency,
    /// Trailing `%` stripped, parsed, divided by 100.
    Percent,
    /// Plain number.
    Numeric,
    /// Calendar date.
    Date,
}

/// The fixed set of columns the dashboard understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Column {
    Retailer,
    Region,
    Product,
    PricePerUnit,
    UnitsSold,
    TotalSales,
    OperatingProfit,
    OperatingMargin,
    SalesMethod,
    InvoiceDate,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Retailer,
        Column::Region,
        Column::Product,
        Column::PricePerUnit,
        Column::UnitsSold,
        Column::TotalSales,
        Column::OperatingProfit,
        Column::OperatingMargin,
        Column::SalesMethod,
        Column::InvoiceDate,
    ];

    /// Canonical header spelling.
    pub fn name(self) -> &'static str {
        match self {
            Column::Retailer => "Retailer",
            Column::Region => "Region",
            Column::Product => "Product",
            Column::PricePerUnit => "Price per Unit",
            Column::UnitsSold => "Units Sold",
            Column::TotalSales => "Total Sales",
            Column::OperatingProfit => "Operating Profit",
            Column::OperatingMargin => "Operating Margin",
            Column::SalesMethod => "Sales Method",
            Column::InvoiceDate => "Invoice Date",
        }
    }

    pub fn role(self) -> ColumnRole {
        match self {
            Column::Retailer | Column::Region | Column::Product | Column::SalesMethod => {
                ColumnRole::Text
            }
            Column::PricePerUnit | Column::TotalSales | Column::OperatingProfit => {
                ColumnRole::Currency
            }
            Column::UnitsSold => ColumnRole::Numeric,
            Column::OperatingMargin => ColumnRole::Percent,
            Column::InvoiceDate => ColumnRole::Date,
        }
    }

    /// Exact lookup by canonical name.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Lenient lookup for raw headers: surrounding whitespace and case are ignored.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(header))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Schema – which known columns a table carries
// ---------------------------------------------------------------------------

/// The set of known columns present in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema(BTreeSet<Column>);

impl Schema {
    /// Build a schema from header names. Only exact canonical names count.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Schema(names.into_iter().filter_map(Column::from_name).collect())
    }

    pub fn has(&self, column: Column) -> bool {
        self.0.contains(&column)
    }
}

// ---------------------------------------------------------------------------
// Row – one record of the table
// ---------------------------------------------------------------------------

static NULL_CELL: CellValue = CellValue::Null;

/// One record: column name → cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
}

impl Row {
    /// Cell of a known column; missing cells read as null.
    pub fn get(&self, column: Column) -> &CellValue {
        self.get_named(column.name())
    }

    pub fn get_named(&self, name: &str) -> &CellValue {
        self.cells.get(name).unwrap_or(&NULL_CELL)
    }

    pub fn take_named(&mut self, name: &str) -> CellValue {
        self.cells.remove(name).unwrap_or(CellValue::Null)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Row {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// SalesTable – raw or cleaned record set
// ---------------------------------------------------------------------------

/// An in-memory table: ordered column names, rows, and the derived schema.
///
/// The same type carries both the raw record set produced by the loader and
/// the cleaned one produced by the cleaner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    schema: Schema,
}

impl SalesTable {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let schema = Schema::from_names(columns.iter().map(String::as_str));
        SalesTable {
            columns,
            rows,
            schema,
        }
    }

    /// Ordered column names, as they appear in the source.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn has(&self, column: Column) -> bool {
        self.schema.has(column)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }

    /// A new table holding the rows at `indices`, same columns.
    pub fn subset(&self, indices: &[usize]) -> SalesTable {
        SalesTable {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
            schema: self.schema.clone(),
        }
    }

    /// Sorted set of distinct values of a known column. Empty if absent.
    pub fn unique_values(&self, column: Column) -> BTreeSet<CellValue> {
        if !self.has(column) {
            return BTreeSet::new();
        }
        self.rows.iter().map(|r| r.get(column).clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case_and_whitespace() {
        assert_eq!(Column::from_header("  total sales "), Some(Column::TotalSales));
        assert_eq!(Column::from_header("INVOICE DATE"), Some(Column::InvoiceDate));
        assert_eq!(Column::from_header("Discount"), None);
        assert_eq!(Column::from_name("total sales"), None);
    }

    #[test]
    fn schema_only_counts_canonical_names() {
        let table = SalesTable::new(
            vec!["Region".into(), " Product".into(), "Notes".into()],
            Vec::new(),
        );
        assert!(table.has(Column::Region));
        assert!(!table.has(Column::Product));
        assert!(!table.has(Column::Retailer));
    }

    #[test]
    fn missing_cells_read_as_null() {
        let row: Row = [("Region", CellValue::Text("West".into()))]
            .into_iter()
            .collect();
        assert_eq!(row.get(Column::Region), &CellValue::Text("West".into()));
        assert!(row.get(Column::Product).is_null());
    }

    #[test]
    fn unique_values_are_sorted_and_include_null() {
        let rows = vec![
            Row::from_iter([("Region", CellValue::Text("West".into()))]),
            Row::from_iter([("Region", CellValue::Null)]),
            Row::from_iter([("Region", CellValue::Text("South".into()))]),
            Row::from_iter([("Region", CellValue::Text("West".into()))]),
        ];
        let table = SalesTable::new(vec!["Region".into()], rows);
        let values: Vec<CellValue> = table.unique_values(Column::Region).into_iter().collect();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Text("South".into()),
                CellValue::Text("West".into()),
            ]
        );
        assert!(table.unique_values(Column::SalesMethod).is_empty());
    }

    #[test]
    fn export_text_renders_dates_and_nulls() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 7).unwrap();
        assert_eq!(CellValue::Date(date).export_text(), "2021-03-07");
        assert_eq!(CellValue::Null.export_text(), "");
        assert_eq!(CellValue::Float(600000.0).export_text(), "600000");
        assert_eq!(CellValue::Float(0.125).export_text(), "0.125");
        assert_eq!(CellValue::Money(Decimal::new(5000, 2)).export_text(), "50.00");
    }

    #[test]
    fn blank_cells_get_a_readable_label() {
        assert_eq!(CellValue::Null.label(), "(blank)");
        assert_eq!(CellValue::Text("West".into()).label(), "West");
    }

    #[test]
    fn money_compares_by_value() {
        assert_eq!(
            CellValue::Money(Decimal::new(5000, 2)),
            CellValue::Money(Decimal::from(50))
        );
        assert!(CellValue::Money(Decimal::from(5)) < CellValue::Money(Decimal::new(55, 1)));
    }
}

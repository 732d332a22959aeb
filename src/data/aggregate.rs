use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::filter::observed_date_range;
use super::model::{Column, Row, SalesTable};

/// Number of products shown in the product ranking.
pub const TOP_PRODUCTS: usize = 10;

/// Headline numbers for the filtered table.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_sales: Decimal,
    pub total_units: f64,
    pub transactions: usize,
    /// Mean `Operating Margin` as a fraction; 0 when there is nothing to average.
    pub mean_margin: f64,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

/// `Total Sales` summed per group label, in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSum {
    pub groups: Vec<(String, Decimal)>,
}

impl GroupedSum {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<Decimal> {
        self.groups
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }
}

/// Every view the dashboard renders. A view is `None` when its source column
/// is missing from the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub summary: Summary,
    pub by_region: Option<GroupedSum>,
    pub by_sales_method: Option<GroupedSum>,
    pub top_products: Option<GroupedSum>,
    pub monthly: Option<GroupedSum>,
}

/// Compute all views over a (filtered) table.
pub fn dashboard(table: &SalesTable, top_n: usize) -> Dashboard {
    Dashboard {
        summary: summarize(table),
        by_region: sum_by(table, Column::Region),
        by_sales_method: sum_by(table, Column::SalesMethod),
        top_products: top_n_by(table, Column::Product, top_n),
        monthly: monthly_sales(table),
    }
}

pub fn summarize(table: &SalesTable) -> Summary {
    let margin = if table.has(Column::OperatingMargin) {
        mean(
            table
                .rows()
                .iter()
                .filter_map(|r| r.get(Column::OperatingMargin).as_f64()),
        )
    } else {
        0.0
    };

    Summary {
        total_sales: table.rows().iter().map(sales).sum(),
        total_units: table
            .rows()
            .iter()
            .filter_map(|r| r.get(Column::UnitsSold).as_f64())
            .sum(),
        transactions: table.len(),
        mean_margin: margin,
        date_range: observed_date_range(table),
    }
}

/// Mean of the values, or 0 for an empty sequence.
pub fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// `Total Sales` per distinct value of `column`, ordered by label.
/// Rows with a null key are skipped.
pub fn sum_by(table: &SalesTable, column: Column) -> Option<GroupedSum> {
    if !table.has(column) {
        return None;
    }
    let mut sums: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in table.rows() {
        let key = row.get(column);
        if key.is_null() {
            continue;
        }
        *sums.entry(key.to_string()).or_default() += sales(row);
    }
    Some(GroupedSum {
        groups: sums.into_iter().collect(),
    })
}

/// The `n` groups of `column` with the highest `Total Sales`, descending.
/// Ties keep the order in which the groups first appear.
pub fn top_n_by(table: &SalesTable, column: Column, n: usize) -> Option<GroupedSum> {
    if !table.has(column) {
        return None;
    }
    let mut groups: Vec<(String, Decimal)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in table.rows() {
        let key = row.get(column);
        if key.is_null() {
            continue;
        }
        let label = key.to_string();
        let slot = *index.entry(label.clone()).or_insert_with(|| {
            groups.push((label, Decimal::ZERO));
            groups.len() - 1
        });
        groups[slot].1 += sales(row);
    }

    // sort_by is stable
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups.truncate(n);
    Some(GroupedSum { groups })
}

/// `Total Sales` per calendar month (`YYYY-MM`), oldest first.
/// Rows without a date are skipped.
pub fn monthly_sales(table: &SalesTable) -> Option<GroupedSum> {
    if !table.has(Column::InvoiceDate) {
        return None;
    }
    let mut sums: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for row in table.rows() {
        if let Some(d) = row.get(Column::InvoiceDate).as_date() {
            *sums.entry((d.year(), d.month())).or_default() += sales(row);
        }
    }
    Some(GroupedSum {
        groups: sums
            .into_iter()
            .map(|((y, m), v)| (format!("{y:04}-{m:02}"), v))
            .collect(),
    })
}

fn sales(row: &Row) -> Decimal {
    row.get(Column::TotalSales).as_money().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn dollars(n: i64) -> CellValue {
        CellValue::Money(Decimal::from(n))
    }

    fn sale(product: &str, total: i64) -> Row {
        Row::from_iter([
            ("Product", CellValue::Text(product.to_string())),
            ("Total Sales", dollars(total)),
            ("Units Sold", CellValue::Float(1.0)),
        ])
    }

    fn products_table(rows: Vec<Row>) -> SalesTable {
        SalesTable::new(
            vec!["Product".into(), "Total Sales".into(), "Units Sold".into()],
            rows,
        )
    }

    #[test]
    fn top_products_are_capped_and_descending() {
        let rows = (0..15).map(|i| sale(&format!("P{i:02}"), i * 10)).collect();
        let top = top_n_by(&products_table(rows), Column::Product, TOP_PRODUCTS).unwrap();

        assert_eq!(top.len(), 10);
        assert_eq!(top.groups[0], ("P14".to_string(), Decimal::from(140)));
        assert!(top.groups.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn top_products_ties_keep_first_seen_order() {
        let rows = vec![
            sale("Zeta", 5),
            sale("Alpha", 5),
            sale("Mid", 7),
            sale("Zeta", 0),
        ];
        let top = top_n_by(&products_table(rows), Column::Product, 10).unwrap();
        let labels: Vec<&str> = top.groups.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["Mid", "Zeta", "Alpha"]);
    }

    #[test]
    fn mean_margin_defaults_to_zero() {
        let absent = products_table(vec![sale("A", 1)]);
        assert_eq!(summarize(&absent).mean_margin, 0.0);

        let all_null = SalesTable::new(
            vec!["Total Sales".into(), "Units Sold".into(), "Operating Margin".into()],
            vec![Row::from_iter([
                ("Total Sales", dollars(1)),
                ("Units Sold", CellValue::Float(1.0)),
                ("Operating Margin", CellValue::Null),
            ])],
        );
        assert_eq!(summarize(&all_null).mean_margin, 0.0);
        assert_eq!(summarize(&SalesTable::default()).mean_margin, 0.0);
    }

    #[test]
    fn mean_margin_skips_nulls() {
        let table = SalesTable::new(
            vec!["Total Sales".into(), "Units Sold".into(), "Operating Margin".into()],
            vec![
                Row::from_iter([
                    ("Total Sales", dollars(1)),
                    ("Units Sold", CellValue::Float(1.0)),
                    ("Operating Margin", CellValue::Float(0.25)),
                ]),
                Row::from_iter([
                    ("Total Sales", dollars(1)),
                    ("Units Sold", CellValue::Float(1.0)),
                    ("Operating Margin", CellValue::Null),
                ]),
                Row::from_iter([
                    ("Total Sales", dollars(1)),
                    ("Units Sold", CellValue::Float(1.0)),
                    ("Operating Margin", CellValue::Float(0.75)),
                ]),
            ],
        );
        assert_eq!(summarize(&table).mean_margin, 0.5);
    }

    #[test]
    fn months_are_chronological() {
        let row = |y, m, total| {
            Row::from_iter([
                (
                    "Invoice Date",
                    CellValue::Date(NaiveDate::from_ymd_opt(y, m, 15).unwrap()),
                ),
                ("Total Sales", dollars(total)),
                ("Units Sold", CellValue::Float(1.0)),
            ])
        };
        let table = SalesTable::new(
            vec!["Invoice Date".into(), "Total Sales".into(), "Units Sold".into()],
            vec![row(2021, 2, 1), row(2020, 12, 2), row(2021, 2, 3), row(2021, 10, 4)],
        );
        let monthly = monthly_sales(&table).unwrap();
        assert_eq!(
            monthly.groups,
            vec![
                ("2020-12".to_string(), Decimal::from(2)),
                ("2021-02".to_string(), Decimal::from(4)),
                ("2021-10".to_string(), Decimal::from(4)),
            ]
        );
    }

    #[test]
    fn views_for_missing_columns_are_omitted() {
        let view = dashboard(&products_table(vec![sale("A", 1)]), TOP_PRODUCTS);
        assert!(view.by_region.is_none());
        assert!(view.by_sales_method.is_none());
        assert!(view.monthly.is_none());
        assert_eq!(view.top_products.unwrap().get("A"), Some(Decimal::from(1)));
        assert_eq!(view.summary.date_range, None);
    }

    #[test]
    fn empty_table_summarizes_to_zero() {
        let summary = summarize(&SalesTable::default());
        assert_eq!(summary.total_sales, Decimal::ZERO);
        assert_eq!(summary.total_units, 0.0);
        assert_eq!(summary.transactions, 0);
    }

    #[test]
    fn revenue_sums_are_exact() {
        let cents = CellValue::Money(Decimal::new(10, 2));
        let rows = (0..3)
            .map(|_| {
                Row::from_iter([
                    ("Product", CellValue::Text("Socks".into())),
                    ("Total Sales", cents.clone()),
                    ("Units Sold", CellValue::Float(1.0)),
                ])
            })
            .collect();
        let table = products_table(rows);
        assert_eq!(summarize(&table).total_sales, Decimal::new(30, 2));
        assert_eq!(
            top_n_by(&table, Column::Product, 1).unwrap().get("Socks"),
            Some(Decimal::new(30, 2))
        );
    }
}

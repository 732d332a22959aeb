use std::collections::BTreeSet;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::error::LoadError;
use super::model::{CellValue, Row, SalesTable};

// ---------------------------------------------------------------------------
// Supported formats
// ---------------------------------------------------------------------------

/// Input format, chosen from the declared file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    /// `.xlsx` / `.xls`; calamine sniffs the actual container.
    Spreadsheet,
}

impl FileFormat {
    /// Extensions accepted by the file dialog.
    pub const EXTENSIONS: [&'static str; 3] = ["csv", "xlsx", "xls"];

    pub fn from_extension(ext: &str) -> Result<Self, LoadError> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "xls" => Ok(FileFormat::Spreadsheet),
            _ => Err(LoadError::UnsupportedExtension(ext)),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => f.write_str("CSV"),
            FileFormat::Spreadsheet => f.write_str("spreadsheet"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse an uploaded byte stream into a raw table. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`          – header row followed by data rows, every cell kept as text
/// * `.xlsx` / `.xls` – first worksheet, first row is the header, native cell types
///
/// Fails with [`LoadError::EmptyInput`] when there are no data rows.
pub fn load_bytes(bytes: &[u8], extension: &str) -> Result<SalesTable, LoadError> {
    let table = match FileFormat::from_extension(extension)? {
        FileFormat::Csv => load_csv(bytes)?,
        FileFormat::Spreadsheet => load_spreadsheet(bytes)?,
    };

    if table.is_empty() {
        return Err(LoadError::EmptyInput);
    }
    log::debug!(
        "Parsed {} raw rows with columns {:?}",
        table.len(),
        table.columns()
    );
    Ok(table)
}

/// Read a file from disk and parse it according to its extension.
pub fn load_path(path: &Path) -> Result<SalesTable, LoadError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    // Reject the extension before touching the disk.
    FileFormat::from_extension(ext)?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_bytes(&bytes, ext)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(bytes: &[u8]) -> Result<SalesTable, LoadError> {
    let parse_err = |reason: String| LoadError::Parse {
        format: FileFormat::Csv,
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers = normalize_headers(
        reader
            .headers()
            .map_err(|e| parse_err(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect(),
    );

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| parse_err(format!("row {}: {e}", row_no + 1)))?;
        if record.len() > headers.len() {
            return Err(parse_err(format!(
                "row {}: expected {} fields, saw {}",
                row_no + 1,
                headers.len(),
                record.len()
            )));
        }

        // Short rows are padded with nulls.
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), csv_cell(record.get(i).unwrap_or(""))))
            .collect();
        rows.push(row);
    }

    Ok(SalesTable::new(headers, rows))
}

fn csv_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(bytes: &[u8]) -> Result<SalesTable, LoadError> {
    let parse_err = |reason: String| LoadError::Parse {
        format: FileFormat::Spreadsheet,
        reason,
    };

    // calamine auto-detects the container: xls, xlsx, xlsb, ods
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| parse_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_err("workbook has no sheets".to_string()))?
        .map_err(|e| parse_err(e.to_string()))?;

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        return Ok(SalesTable::default());
    };
    let headers = normalize_headers(
        header_row
            .iter()
            .map(|cell| match cell {
                Data::String(s) => s.clone(),
                Data::Empty => String::new(),
                other => other.to_string(),
            })
            .collect(),
    );

    let rows: Vec<Row> = sheet_rows
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| -> Row {
            headers
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = cells.get(i).map(spreadsheet_cell).unwrap_or(CellValue::Null);
                    (name.clone(), value)
                })
                .collect()
        })
        .collect();

    Ok(SalesTable::new(headers, rows))
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| CellValue::Date(d.date()))
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Header helpers
// ---------------------------------------------------------------------------

/// Give blank headers a placeholder name and make repeated headers unique
/// (`Region`, `Region.1`, ...). Whitespace is left alone; the cleaner owns that.
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut candidate = base.clone();
            let mut n = 1;
            while seen.contains(&candidate) {
                candidate = format!("{base}.{n}");
                n += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use chrono::NaiveDate;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use std::io::Write;

    /// Two data rows separated by a blank one; mixes native and text cells.
    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let headers = [" Region", "Total Sales", "Units Sold", "Operating Margin", "Invoice Date"];
        for (col, header) in headers.into_iter().enumerate() {
            sheet.write_string(0, col as u16, header).unwrap();
        }
        let percent = Format::new().set_num_format("0.0%");
        let date = Format::new().set_num_format("yyyy-mm-dd");
        let jan_5 = ExcelDateTime::from_ymd(2021, 1, 5).unwrap();

        sheet.write_string(1, 0, "West").unwrap();
        sheet.write_number(1, 1, 600000.0).unwrap();
        sheet.write_number(1, 2, 1200.0).unwrap();
        sheet.write_number_with_format(1, 3, 0.5, &percent).unwrap();
        sheet.write_datetime_with_format(1, 4, &jan_5, &date).unwrap();

        sheet.write_string(3, 0, "South").unwrap();
        sheet.write_string(3, 1, "$625,000").unwrap();
        sheet.write_number(3, 2, 1250.0).unwrap();
        sheet.write_string(3, 3, "12.5%").unwrap();
        sheet.write_string(3, 4, "2021-02-05").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn spreadsheet_cells_keep_native_types() {
        let table = load_bytes(&sample_workbook(), "xlsx").unwrap();

        assert_eq!(
            table.columns(),
            [" Region", "Total Sales", "Units Sold", "Operating Margin", "Invoice Date"]
        );
        assert_eq!(table.len(), 2);

        let west = &table.rows()[0];
        assert_eq!(west.get_named(" Region"), &CellValue::Text("West".into()));
        assert_eq!(west.get(Column::TotalSales), &CellValue::Float(600000.0));
        assert_eq!(west.get(Column::UnitsSold), &CellValue::Float(1200.0));
        assert_eq!(west.get(Column::OperatingMargin), &CellValue::Float(0.5));
        assert_eq!(
            west.get(Column::InvoiceDate),
            &CellValue::Date(NaiveDate::from_ymd_opt(2021, 1, 5).unwrap())
        );

        let south = &table.rows()[1];
        assert_eq!(south.get(Column::TotalSales), &CellValue::Text("$625,000".into()));
        assert_eq!(south.get(Column::OperatingMargin), &CellValue::Text("12.5%".into()));
    }

    #[test]
    fn spreadsheet_cell_conversion() {
        assert_eq!(spreadsheet_cell(&Data::Int(7)), CellValue::Integer(7));
        assert_eq!(spreadsheet_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(spreadsheet_cell(&Data::String(String::new())), CellValue::Null);
        assert_eq!(spreadsheet_cell(&Data::Empty), CellValue::Null);
    }

    #[test]
    fn csv_cells_are_text_and_blanks_are_null() {
        let bytes = b"Region,Total Sales,Units Sold\nWest,\"$600,000\",1200\nSouth,,1250\n";
        let table = load_bytes(bytes, "csv").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), ["Region", "Total Sales", "Units Sold"]);
        let first = &table.rows()[0];
        assert_eq!(first.get(Column::TotalSales), &CellValue::Text("$600,000".into()));
        assert!(table.rows()[1].get(Column::TotalSales).is_null());
    }

    #[test]
    fn extension_is_case_insensitive() {
        let table = load_bytes(b"Region\nWest\n", ".CSV").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = load_bytes(b"Region,Product\nWest\n", "csv").unwrap();
        assert!(table.rows()[0].get(Column::Product).is_null());
    }

    #[test]
    fn long_rows_are_a_parse_error() {
        let err = load_bytes(b"Region\nWest,extra\n", "csv").unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: FileFormat::Csv, .. }));
    }

    #[test]
    fn header_only_csv_is_empty_input() {
        let err = load_bytes(b"Region,Total Sales\n", "csv").unwrap_err();
        assert!(matches!(err, LoadError::EmptyInput));

        let err = load_bytes(b"", "csv").unwrap_err();
        assert!(matches!(err, LoadError::EmptyInput));
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let err = load_bytes(b"Region\n\xff\xfe\n", "csv").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn corrupt_workbook_is_a_parse_error() {
        let err = load_bytes(b"definitely not a zip archive", "xlsx").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Parse {
                format: FileFormat::Spreadsheet,
                ..
            }
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_bytes(b"Region\nWest\n", "json").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "json"));
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let table = load_bytes(b"Region,,Region\nWest,x,East\n", "csv").unwrap();
        assert_eq!(table.columns(), ["Region", "Unnamed: 1", "Region.1"]);
        assert_eq!(
            table.rows()[0].get_named("Region.1"),
            &CellValue::Text("East".into())
        );
    }

    #[test]
    fn load_path_reads_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"Region,Units Sold\nWest,10\n").unwrap();
        file.flush().unwrap();

        let table = load_path(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.has(Column::UnitsSold));
    }

    #[test]
    fn load_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_path(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}

use crate::error::{DashboardError, Result};
use crate::normalizer::{COLUMN_COUNT, DATA_START_ROW};
use crate::types::{RawCell, RawRow, RawTable};
use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub data_rows: usize,
    /// Data rows with fewer cells than the fixed column layout expects.
    pub short_rows: usize,
}

impl LoadReport {
    pub fn from_table(table: &RawTable) -> Self {
        let data = table.get(DATA_START_ROW..).unwrap_or(&[]);
        LoadReport {
            total_rows: table.len(),
            data_rows: data.len(),
            short_rows: data.iter().filter(|r| r.len() < COLUMN_COUNT).count(),
        }
    }
}

/// Read a booking sheet into an untyped table.
///
/// Supported inputs:
/// - `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods`: the first worksheet, with
///   cells placed at their sheet coordinates from `A1`.
/// - `.csv` / `.tsv`: every row is taken verbatim (no header handling, ragged
///   rows allowed); blank fields become `RawCell::Empty`, the rest stay text.
/// - `.json`: an array of arrays of numbers, strings, booleans or `null`.
pub fn load_table(path: &Path) -> Result<(RawTable, LoadReport)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        "csv" => read_delimited(path, b',')?,
        "tsv" => read_delimited(path, b'\t')?,
        "json" => read_json(path)?,
        other => {
            let shown = if other.is_empty() { "<none>" } else { other };
            return Err(DashboardError::UnsupportedFormat(shown.to_string()));
        }
    };

    let report = LoadReport::from_table(&table);
    debug!(
        path = %path.display(),
        total_rows = report.total_rows,
        data_rows = report.data_rows,
        short_rows = report.short_rows,
        "Loaded raw table"
    );
    Ok((table, report))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(open(path)?);

    let mut table: RawTable = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: RawRow = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(field.to_string())
                }
            })
            .collect();
        table.push(row);
    }
    Ok(table)
}

fn read_workbook(path: &Path) -> Result<RawTable> {
    // Surface a missing file as a read error rather than a workbook error.
    open(path)?;
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::EmptyWorkbook(path.to_path_buf()))??;
    Ok(range_to_table(&range))
}

/// Lay a worksheet range out as rows from `A1`. Leading rows and columns
/// outside the used range are padded; trailing empty cells are dropped.
fn range_to_table(range: &Range<Data>) -> RawTable {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let mut table: RawTable = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells: RawRow = vec![RawCell::Empty; start_col as usize];
        cells.extend(row.iter().map(workbook_cell));
        while matches!(cells.last(), Some(RawCell::Empty)) {
            cells.pop();
        }
        table.push(cells);
    }
    table
}

fn workbook_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Int(n) => RawCell::Number(*n as f64),
        Data::Float(n) => RawCell::Number(*n),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::String(s) => RawCell::Text(s.clone()),
        // Serial day number, as the sheet stores it.
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        other => RawCell::Text(other.to_string()),
    }
}

fn read_json(path: &Path) -> Result<RawTable> {
    let reader = BufReader::new(open(path)?);
    let table: RawTable = serde_json::from_reader(reader)?;
    Ok(table)
}

//! In-memory tables and their CSV / XLSX encodings.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::error::{DriveError, Result};
use crate::models::{MIME_TYPE_CSV, MIME_TYPE_XLSX};

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Infer a typed value from delimited text.
    pub fn infer(field: &str) -> Self {
        if field.is_empty() {
            return Value::Empty;
        }
        if let Ok(n) = field.parse::<i64>() {
            return Value::Int(n);
        }
        // "inf" and "NaN" parse as floats but stay text.
        if let Ok(x) = field.parse::<f64>() {
            if x.is_finite() {
                return Value::Float(x);
            }
        }
        match field {
            "true" | "True" | "TRUE" => Value::Bool(true),
            "false" | "False" | "FALSE" => Value::Bool(false),
            _ => Value::Text(field.to_string()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// File formats a table can be stored as, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// Pick the format for a file name; anything but `.csv` and `.xlsx` is rejected.
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("xlsx") => Ok(TableFormat::Xlsx),
            _ => Err(DriveError::UnsupportedFileType(path.to_string())),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            TableFormat::Csv => MIME_TYPE_CSV,
            TableFormat::Xlsx => MIME_TYPE_XLSX,
        }
    }
}

/// Options for decoding downloaded bytes into a table.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Worksheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
    pub delimiter: u8,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            delimiter: b',',
        }
    }
}

/// Named columns over rows of values. Every row has one value per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, rejecting it if its width differs from the header.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DriveError::TableWrite(format!(
                "row has {} values but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Encode in the given format.
    pub fn to_bytes(&self, format: TableFormat) -> Result<Vec<u8>> {
        match format {
            TableFormat::Csv => self.to_csv(b','),
            TableFormat::Xlsx => self.to_xlsx(),
        }
    }

    pub fn to_csv(&self, delimiter: u8) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        let csv_err = |e: csv::Error| DriveError::TableWrite(e.to_string());
        writer.write_record(&self.columns).map_err(csv_err)?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|value| value.to_string()))
                .map_err(csv_err)?;
        }

        writer
            .into_inner()
            .map_err(|e| DriveError::TableWrite(e.to_string()))
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        let xlsx_err = |e: rust_xlsxwriter::XlsxError| DriveError::TableWrite(e.to_string());

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, name) in self.columns.iter().enumerate() {
            sheet.write_string(0, col as u16, name).map_err(xlsx_err)?;
        }

        for (r, row) in self.rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                let col = col as u16;
                match value {
                    Value::Empty => {}
                    Value::Bool(b) => {
                        sheet.write_boolean(r, col, *b).map_err(xlsx_err)?;
                    }
                    Value::Int(n) => {
                        sheet.write_number(r, col, *n as f64).map_err(xlsx_err)?;
                    }
                    Value::Float(x) => {
                        sheet.write_number(r, col, *x).map_err(xlsx_err)?;
                    }
                    Value::Text(s) => {
                        sheet.write_string(r, col, s).map_err(xlsx_err)?;
                    }
                }
            }
        }

        workbook.save_to_buffer().map_err(xlsx_err)
    }

    /// Decode CSV with a header row, inferring cell types.
    pub fn from_csv(bytes: &[u8], delimiter: u8) -> Result<Self> {
        let csv_err = |e: csv::Error| DriveError::TableRead(e.to_string());
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(bytes);

        let columns = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut table = Table::new(columns);
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            table.rows.push(record.iter().map(Value::infer).collect());
        }
        Ok(table)
    }

    /// Decode an XLSX workbook, using its first row as the header.
    pub fn from_xlsx(bytes: &[u8], sheet: Option<&str>) -> Result<Self> {
        let xlsx_err = |e: calamine::XlsxError| DriveError::TableRead(e.to_string());
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec())).map_err(xlsx_err)?;

        let range = match sheet {
            Some(name) => workbook.worksheet_range(name).map_err(xlsx_err)?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| DriveError::TableRead("workbook has no sheets".to_string()))?
                .map_err(xlsx_err)?,
        };

        // The range is clipped to the used cells; read by absolute position from A1
        // so that blank leading rows and columns keep their place.
        let (last_row, last_col) = match range.end() {
            Some(end) => end,
            None => return Ok(Table::default()),
        };

        let columns = (0..=last_col)
            .map(|col| {
                range
                    .get_value((0, col))
                    .map(|cell| cell.to_string())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();

        let mut table = Table::new(columns);
        for row in 1..=last_row {
            table.rows.push(
                (0..=last_col)
                    .map(|col| match range.get_value((row, col)) {
                        Some(cell) => cell_value(cell),
                        None => Value::Empty,
                    })
                    .collect(),
            );
        }
        Ok(table)
    }

    /// Decode downloaded bytes, trying XLSX first and CSV second.
    pub fn parse(bytes: &[u8], options: &ReadOptions) -> Result<Self> {
        let xlsx_error = match Self::from_xlsx(bytes, options.sheet.as_deref()) {
            Ok(table) => return Ok(table),
            Err(e) => e,
        };
        debug!(error = %xlsx_error, "not a spreadsheet, falling back to CSV");

        Self::from_csv(bytes, options.delimiter).map_err(|csv_error| {
            DriveError::TableRead(format!(
                "neither spreadsheet ({}) nor delimited text ({})",
                xlsx_error, csv_error
            ))
        })
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(n) => Value::Int(*n),
        Data::Float(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => Value::Int(*x as i64),
        Data::Float(x) => Value::Float(*x),
        Data::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

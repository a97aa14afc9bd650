//! Record sources: where the loan table comes from.
//!
//! A source returns the complete record list on every fetch. Rows missing
//! any required field are dropped here and never reach the view model.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::config::{ColumnMapping, LoanViewConfig};
use crate::error::LoanError;
use crate::record::LoanRecord;

/// Supplier of the full loan record list.
pub trait RecordSource: Send + Sync {
    /// Human-readable location used in logs and fetch errors.
    fn location(&self) -> String;

    /// Retrieve and parse every record.
    fn fetch_all(&self) -> Result<Vec<LoanRecord>, LoanError>;
}

impl<T: RecordSource + ?Sized> RecordSource for Box<T> {
    fn location(&self) -> String {
        (**self).location()
    }

    fn fetch_all(&self) -> Result<Vec<LoanRecord>, LoanError> {
        (**self).fetch_all()
    }
}

/// CSV file on the local filesystem.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    columns: ColumnMapping,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            columns: ColumnMapping::default(),
        }
    }

    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    pub fn from_config(config: &LoanViewConfig) -> Self {
        Self::new(&config.data_path).with_columns(config.columns.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvFileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_all(&self) -> Result<Vec<LoanRecord>, LoanError> {
        let payload = std::fs::read(&self.path).map_err(|e| LoanError::Fetch {
            location: self.location(),
            reason: e.to_string(),
        })?;
        parse_loan_csv(payload, &self.columns)
    }
}

/// CSV payload already held in memory.
#[derive(Debug, Clone)]
pub struct CsvTextSource {
    payload: String,
    columns: ColumnMapping,
}

impl CsvTextSource {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            columns: ColumnMapping::default(),
        }
    }

    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }
}

impl RecordSource for CsvTextSource {
    fn location(&self) -> String {
        "<memory>".to_string()
    }

    fn fetch_all(&self) -> Result<Vec<LoanRecord>, LoanError> {
        parse_loan_csv(self.payload.clone().into_bytes(), &self.columns)
    }
}

/// Parse a CSV payload into loan records.
///
/// All columns are read as strings and header names are trimmed. Fails when
/// the payload is not CSV or a mapped header is absent. Rows with a null or
/// empty value in any mapped column are skipped.
pub fn parse_loan_csv(payload: Vec<u8>, columns: &ColumnMapping) -> Result<Vec<LoanRecord>, LoanError> {
    let raw = read_csv_as_strings(payload)?;
    require_columns(&raw, &columns.required())?;

    let total_rows = raw.height();
    let complete = columns
        .required()
        .iter()
        .fold(lit(true), |acc, name| {
            acc.and(col(*name).is_not_null().and(col(*name).neq(lit(""))))
        });
    let df = raw.lazy().filter(complete).collect()?;

    let year = df.column(&columns.year)?.str()?;
    let quarter = df.column(&columns.quarter)?.str()?;
    let grade = df.column(&columns.grade)?.str()?;
    let home_ownership = df.column(&columns.home_ownership)?.str()?;
    let term = df.column(&columns.term)?.str()?;
    let balance = df.column(&columns.current_balance)?.str()?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let (Some(y), Some(q), Some(g), Some(h), Some(t), Some(b)) = (
            year.get(i),
            quarter.get(i),
            grade.get(i),
            home_ownership.get(i),
            term.get(i),
            balance.get(i),
        ) else {
            continue;
        };
        records.push(LoanRecord {
            year: y.to_string(),
            quarter: q.to_string(),
            grade: g.to_string(),
            home_ownership: h.to_string(),
            term: t.to_string(),
            current_balance: b.to_string(),
        });
    }

    let dropped = total_rows - records.len();
    if dropped > 0 {
        tracing::debug!(dropped, "skipped rows with missing required fields");
    }
    Ok(records)
}

/// Read CSV bytes with every column as String dtype and trimmed header names.
///
/// Fields past the header width are cut off and invalid UTF-8 is replaced
/// with U+FFFD, so a single malformed row never fails the whole payload.
fn read_csv_as_strings(payload: Vec<u8>) -> Result<DataFrame, LoanError> {
    let parse_options = CsvParseOptions::default()
        .with_truncate_ragged_lines(true)
        .with_encoding(CsvEncoding::LossyUtf8);
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(payload))
        .finish()
        .map_err(|e| LoanError::Parse(e.to_string()))?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    Ok(df)
}

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), LoanError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(LoanError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

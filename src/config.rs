use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LoanError;
use crate::schema::{source, storage};

/// Source CSV header for each loan field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub year: String,
    pub quarter: String,
    pub grade: String,
    pub home_ownership: String,
    pub term: String,
    pub current_balance: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            year: source::YEAR.to_string(),
            quarter: source::QUARTER.to_string(),
            grade: source::GRADE.to_string(),
            home_ownership: source::HOME_OWNERSHIP.to_string(),
            term: source::TERM.to_string(),
            current_balance: source::CURRENT_BALANCE.to_string(),
        }
    }
}

impl ColumnMapping {
    /// Every header a row must have a non-empty value for.
    pub fn required(&self) -> [&str; 6] {
        [
            self.year.as_str(),
            self.quarter.as_str(),
            self.grade.as_str(),
            self.home_ownership.as_str(),
            self.term.as_str(),
            self.current_balance.as_str(),
        ]
    }
}

/// Top-level view configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanViewConfig {
    /// CSV file holding the loan records.
    pub data_path: PathBuf,
    /// Directory for the persisted view state. `None` keeps state in memory.
    pub storage_dir: Option<PathBuf>,
    /// Name of the persisted state blob.
    pub storage_key: String,
    pub columns: ColumnMapping,
}

impl Default for LoanViewConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("loansize.csv"),
            storage_dir: None,
            storage_key: storage::DEFAULT_KEY.to_string(),
            columns: ColumnMapping::default(),
        }
    }
}

impl LoanViewConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, LoanError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LoanError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// File backing the persisted state, when a storage directory is set.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", self.storage_key)))
    }

    pub fn validate(&self) -> Result<(), LoanError> {
        if self.storage_key.trim().is_empty() {
            return Err(LoanError::Config("storage_key must not be empty".into()));
        }
        if let Some(empty) = self.columns.required().iter().find(|c| c.trim().is_empty()) {
            return Err(LoanError::Config(format!(
                "column mapping contains an empty header name ('{empty}')"
            )));
        }
        Ok(())
    }
}

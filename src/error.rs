#[cfg(feature = "python")]
use pyo3::exceptions::{PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Failed to fetch loan data from {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("Failed to parse loan data: {0}")]
    Parse(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Unknown filter dimension: {0}")]
    UnknownDimension(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LoanError {
    /// The view-state form of this error, for failures that belong in the
    /// controller's `error` slot. Storage and config failures return `None`.
    pub fn view_error(&self) -> Option<ViewError> {
        let kind = match self {
            Self::Fetch { .. } | Self::Io(_) => ViewErrorKind::Fetch,
            Self::Parse(_) | Self::MissingColumn(_) | Self::Polars(_) => ViewErrorKind::Parse,
            _ => return None,
        };
        Some(ViewError {
            kind,
            message: self.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewErrorKind {
    Fetch,
    Parse,
}

/// Load failure kept in view state. Recoverable: the previous data stays
/// visible and the caller may retry the fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ViewError {
    pub kind: ViewErrorKind,
    pub message: String,
}

#[cfg(feature = "python")]
impl From<LoanError> for PyErr {
    fn from(err: LoanError) -> PyErr {
        match err {
            LoanError::UnknownDimension(_) => PyValueError::new_err(err.to_string()),
            other => PyRuntimeError::new_err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_and_parse_failures_reach_view_state() {
        let fetch = LoanError::Fetch {
            location: "loansize.csv".into(),
            reason: "not found".into(),
        };
        assert_eq!(fetch.view_error().map(|e| e.kind), Some(ViewErrorKind::Fetch));

        let parse = LoanError::MissingColumn("V1".into());
        let view = parse.view_error().expect("parse failures are surfaced");
        assert_eq!(view.kind, ViewErrorKind::Parse);
        assert_eq!(view.message, "Missing column: V1");
    }

    #[test]
    fn storage_failures_stay_out_of_view_state() {
        assert!(LoanError::Storage("disk full".into()).view_error().is_none());
        assert!(LoanError::Config("bad".into()).view_error().is_none());
    }
}

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::config::LoanViewConfig;
use crate::controller::{LoanViewModel, ViewStatus};
use crate::error::LoanError;
use crate::persistence::StateStore;
use crate::record::Dimension;
use crate::source::CsvFileSource;
use crate::summary::{self, SummaryConfig};

#[pyclass(name = "LoanViewModel")]
pub struct PyLoanViewModel {
    inner: LoanViewModel<CsvFileSource, Box<dyn StateStore>>,
}

#[pymethods]
impl PyLoanViewModel {
    /// Open a view over a loan CSV.
    ///
    /// `columns` overrides source headers by field name, e.g.
    /// `{"current_balance": "balance"}`. With `storage_dir` the view state is
    /// persisted there and restored on the next start.
    #[new]
    #[pyo3(signature = (data_path, storage_dir=None, columns=None))]
    fn new(
        data_path: String,
        storage_dir: Option<String>,
        columns: Option<HashMap<String, String>>,
    ) -> PyResult<Self> {
        let mut config = LoanViewConfig {
            data_path: PathBuf::from(data_path),
            storage_dir: storage_dir.map(PathBuf::from),
            ..Default::default()
        };
        for (field, header) in columns.unwrap_or_default() {
            let slot = match field.as_str() {
                "year" => &mut config.columns.year,
                "quarter" => &mut config.columns.quarter,
                "grade" => &mut config.columns.grade,
                "home_ownership" => &mut config.columns.home_ownership,
                "term" => &mut config.columns.term,
                "current_balance" => &mut config.columns.current_balance,
                _ => {
                    return Err(LoanError::Config(format!("unknown column field '{field}'")).into())
                }
            };
            *slot = header;
        }
        Ok(Self {
            inner: LoanViewModel::from_config(&config)?,
        })
    }

    /// Open a view from a TOML config file.
    #[staticmethod]
    fn from_toml(path: &str) -> PyResult<Self> {
        let config = LoanViewConfig::from_toml_file(path)?;
        Ok(Self {
            inner: LoanViewModel::from_config(&config)?,
        })
    }

    /// Reload records from the CSV. Returns False on failure; see `error`.
    fn fetch_data(&mut self) -> bool {
        self.inner.fetch_data().is_ok()
    }

    fn set_filter(&mut self, dimension: &str, value: String) -> PyResult<()> {
        let dimension: Dimension = dimension.parse()?;
        self.inner.set_filter(dimension, value);
        Ok(())
    }

    fn reset_filters(&mut self) {
        self.inner.reset_filters();
    }

    // ── Properties ──────────────────────────────────────────────────────────

    #[getter]
    fn aggregate(&self) -> BTreeMap<String, f64> {
        self.inner.aggregate().totals().clone()
    }

    #[getter]
    fn aggregate_df(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.inner.aggregate().to_frame()?))
    }

    #[getter]
    fn selection(&self) -> BTreeMap<&'static str, String> {
        Dimension::ALL
            .iter()
            .map(|d| (d.as_str(), self.inner.selection().get(*d).to_string()))
            .collect()
    }

    #[getter]
    fn options(&self) -> BTreeMap<&'static str, Vec<String>> {
        Dimension::ALL
            .iter()
            .map(|d| (d.as_str(), self.inner.options().get(*d).to_vec()))
            .collect()
    }

    #[getter]
    fn error(&self) -> Option<String> {
        self.inner.error().map(|e| e.message.clone())
    }

    #[getter]
    fn record_count(&self) -> usize {
        self.inner.records().len()
    }

    #[getter]
    fn revision(&self) -> u64 {
        self.inner.revision()
    }

    #[getter]
    fn status(&self) -> &'static str {
        match self.inner.status() {
            ViewStatus::NotLoaded => "not_loaded",
            ViewStatus::NoMatches => "no_matches",
            ViewStatus::Ready => "ready",
        }
    }

    /// Chart and table of the current aggregate as an HTML fragment.
    /// Use with `IPython.display.HTML(view.summary_html())` in Jupyter.
    #[pyo3(signature = (title=None))]
    fn summary_html(&self, title: Option<String>) -> String {
        let mut config = SummaryConfig::default();
        if let Some(title) = title {
            config.title = title;
        }
        summary::render_summary_html(self.inner.aggregate(), &config)
    }
}

#[pyfunction]
pub fn format_compact_usd(amount: f64) -> String {
    summary::format_compact_usd(amount)
}

pub mod aggregation;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod options;
pub mod persistence;
pub mod record;
pub mod schema;
pub mod source;
pub mod summary;

#[cfg(feature = "python")]
mod python;

pub use aggregation::{aggregate, AggregateResult};
pub use config::{ColumnMapping, LoanViewConfig};
pub use controller::{LoanViewModel, ViewState, ViewStatus};
pub use error::{LoanError, ViewError, ViewErrorKind};
pub use filter::FilterSelection;
pub use options::{derive_options, FilterOptions, RecordSet};
pub use persistence::{JsonFileStore, MemoryStore, PersistedState, StateStore};
pub use record::{Dimension, LoanRecord};
pub use source::{CsvFileSource, CsvTextSource, RecordSource};

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyModule;

/// Export schema constants as Python submodules
#[cfg(feature = "python")]
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Source columns
    let source = PyModule::new(m.py(), "source")?;
    source.add("YEAR", schema::source::YEAR)?;
    source.add("QUARTER", schema::source::QUARTER)?;
    source.add("GRADE", schema::source::GRADE)?;
    source.add("HOME_OWNERSHIP", schema::source::HOME_OWNERSHIP)?;
    source.add("TERM", schema::source::TERM)?;
    source.add("CURRENT_BALANCE", schema::source::CURRENT_BALANCE)?;
    m.add_submodule(&source)?;

    // Dimension
    let dimension = PyModule::new(m.py(), "dimension")?;
    dimension.add("HOME_OWNERSHIP", schema::dimension::HOME_OWNERSHIP)?;
    dimension.add("QUARTER", schema::dimension::QUARTER)?;
    dimension.add("TERM", schema::dimension::TERM)?;
    dimension.add("YEAR", schema::dimension::YEAR)?;
    m.add_submodule(&dimension)?;

    // Aggregate
    let aggregate = PyModule::new(m.py(), "aggregate")?;
    aggregate.add("GRADE", schema::aggregate::GRADE)?;
    aggregate.add("TOTAL_BALANCE", schema::aggregate::TOTAL_BALANCE)?;
    m.add_submodule(&aggregate)?;

    // Filter
    let filter = PyModule::new(m.py(), "filter")?;
    filter.add("WILDCARD", schema::filter::WILDCARD)?;
    m.add_submodule(&filter)?;

    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyLoanViewModel>()?;
    m.add_function(wrap_pyfunction!(python::format_compact_usd, m)?)?;
    add_schema_exports(m)?;
    Ok(())
}

//! The loan view model: records, selection, options and aggregate kept
//! consistent as one unit.
//!
//! Transitions:
//! - `fetch_data`: replace records (and with them the options), recompute the
//!   aggregate. On failure only `error` changes.
//! - `set_filter` / `reset_filters`: change the selection, recompute the
//!   aggregate. Options are untouched.
//!
//! Each transition bumps `revision` once and writes the whole state to the
//! [`StateStore`].

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::aggregation::{aggregate, AggregateResult};
use crate::config::LoanViewConfig;
use crate::error::{LoanError, ViewError, ViewErrorKind};
use crate::filter::FilterSelection;
use crate::options::{FilterOptions, RecordSet};
use crate::persistence::{JsonFileStore, MemoryStore, PersistedState, StateStore, STATE_VERSION};
use crate::record::{Dimension, LoanRecord};
use crate::source::{CsvFileSource, RecordSource};

/// Observable state of the view.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    records: RecordSet,
    selection: FilterSelection,
    aggregate: AggregateResult,
    error: Option<ViewError>,
    revision: u64,
}

impl ViewState {
    pub fn records(&self) -> &[LoanRecord] {
        self.records.records()
    }

    pub fn options(&self) -> &FilterOptions {
        self.records.options()
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn aggregate(&self) -> &AggregateResult {
        &self.aggregate
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.error.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn status(&self) -> ViewStatus {
        if self.records.is_empty() {
            ViewStatus::NotLoaded
        } else if self.aggregate.is_empty() {
            ViewStatus::NoMatches
        } else {
            ViewStatus::Ready
        }
    }

    fn recompute_aggregate(&mut self) {
        self.aggregate = aggregate(self.records.records(), &self.selection);
    }

    fn to_persisted(&self) -> PersistedState {
        PersistedState {
            version: STATE_VERSION,
            saved_at: Utc::now(),
            records: self.records.records().to_vec(),
            selection: self.selection.clone(),
            aggregate: self.aggregate.clone(),
        }
    }
}

/// What the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// No records have been loaded.
    NotLoaded,
    /// Records are loaded but the filters exclude all of them.
    NoMatches,
    Ready,
}

pub struct LoanViewModel<S, P = MemoryStore> {
    source: S,
    store: P,
    state: ViewState,
}

impl LoanViewModel<CsvFileSource, Box<dyn StateStore>> {
    /// Build from config and restore persisted state.
    pub fn from_config(config: &LoanViewConfig) -> Result<Self, LoanError> {
        config.validate()?;
        let source = CsvFileSource::from_config(config);
        let store: Box<dyn StateStore> = match config.storage_path() {
            Some(path) => Box::new(JsonFileStore::new(path)),
            None => Box::new(MemoryStore::new()),
        };
        Ok(Self::restore(source, store))
    }
}

impl<S: RecordSource, P: StateStore> LoanViewModel<S, P> {
    /// Empty view; nothing is read until [`fetch_data`](Self::fetch_data).
    pub fn new(source: S, store: P) -> Self {
        Self {
            source,
            store,
            state: ViewState::default(),
        }
    }

    /// Adopt the persisted records and selection, or load from the source
    /// when the blob is unusable.
    ///
    /// A blob is usable when it has the current version, at least one record
    /// and a non-empty aggregate. The aggregate itself is never adopted; it is
    /// recomputed from the restored records and selection. A saved selection
    /// of the current version survives a reload.
    pub fn restore(source: S, store: P) -> Self {
        let persisted = match store.load() {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable persisted view state");
                None
            }
        };
        let persisted = persisted.filter(|saved| {
            let current = saved.version == STATE_VERSION;
            if !current {
                warn!(
                    found = saved.version,
                    expected = STATE_VERSION,
                    "ignoring persisted view state from another version"
                );
            }
            current
        });

        let mut view = Self::new(source, store);
        match persisted {
            Some(saved) if !saved.records.is_empty() && !saved.aggregate.is_empty() => {
                view.state.records = RecordSet::new(saved.records);
                view.state.selection = saved.selection;
                view.state.recompute_aggregate();
                debug!(
                    records = view.state.records.len(),
                    groups = view.state.aggregate.len(),
                    "restored persisted view state"
                );
            }
            Some(saved) => {
                view.state.selection = saved.selection;
                // The failure is kept in `error`.
                let _ = view.fetch_data();
            }
            None => {
                let _ = view.fetch_data();
            }
        }
        view
    }

    /// Replace the records from the source and recompute everything derived
    /// from them.
    ///
    /// On failure the error is stored in the view state and returned; records
    /// and aggregate keep their previous values.
    pub fn fetch_data(&mut self) -> Result<(), ViewError> {
        match self.source.fetch_all() {
            Ok(records) => {
                self.state.records = RecordSet::new(records);
                self.state.recompute_aggregate();
                self.state.error = None;
                info!(
                    source = %self.source.location(),
                    records = self.state.records.len(),
                    groups = self.state.aggregate.len(),
                    "loaded loan records"
                );
                self.commit();
                Ok(())
            }
            Err(e) => {
                warn!(source = %self.source.location(), error = %e, "loan data fetch failed");
                let view_error = e.view_error().unwrap_or_else(|| ViewError {
                    kind: ViewErrorKind::Fetch,
                    message: e.to_string(),
                });
                self.state.error = Some(view_error.clone());
                self.commit();
                Err(view_error)
            }
        }
    }

    pub fn set_filter(&mut self, dimension: Dimension, value: impl Into<String>) {
        let value = value.into();
        debug!(%dimension, value = %value, "set filter");
        self.state.selection.set(dimension, value);
        self.state.recompute_aggregate();
        self.commit();
    }

    pub fn reset_filters(&mut self) {
        debug!("reset filters");
        self.state.selection.reset();
        self.state.recompute_aggregate();
        self.commit();
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn records(&self) -> &[LoanRecord] {
        self.state.records()
    }

    pub fn options(&self) -> &FilterOptions {
        self.state.options()
    }

    pub fn selection(&self) -> &FilterSelection {
        self.state.selection()
    }

    pub fn aggregate(&self) -> &AggregateResult {
        self.state.aggregate()
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.state.error()
    }

    pub fn revision(&self) -> u64 {
        self.state.revision()
    }

    pub fn status(&self) -> ViewStatus {
        self.state.status()
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    fn commit(&mut self) {
        self.state.revision += 1;
        if let Err(e) = self.store.save(&self.state.to_persisted()) {
            warn!(error = %e, "failed to persist view state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::CsvTextSource;

    const CSV: &str = "v_year,v_quarter,grade_2,home_ownership,term,V1\n\
        2020,1,A,OWN,36,100.00\n\
        2020,1,A,RENT,36,50.00\n\
        2019,2,B,RENT,60,20.00\n";

    #[test]
    fn new_view_is_empty_and_not_loaded() {
        let view = LoanViewModel::new(CsvTextSource::new(CSV), MemoryStore::new());
        assert_eq!(view.status(), ViewStatus::NotLoaded);
        assert_eq!(view.revision(), 0);
        assert_eq!(view.options(), &FilterOptions::default());
        assert!(view.store().blob().is_none());
    }

    #[test]
    fn fetch_populates_options_and_aggregate() {
        let mut view = LoanViewModel::new(CsvTextSource::new(CSV), MemoryStore::new());
        view.fetch_data().unwrap();
        assert_eq!(view.records().len(), 3);
        assert_eq!(view.options().get(Dimension::Year), ["all", "2020", "2019"]);
        assert_eq!(view.aggregate().get("A"), Some(150.0));
        assert_eq!(view.aggregate().get("B"), Some(20.0));
        assert_eq!(view.status(), ViewStatus::Ready);
        assert_eq!(view.revision(), 1);
    }

    #[test]
    fn filter_change_leaves_options_alone() {
        let mut view = LoanViewModel::new(CsvTextSource::new(CSV), MemoryStore::new());
        view.fetch_data().unwrap();
        let options = view.options().clone();

        view.set_filter(Dimension::Year, "2019");
        assert_eq!(view.options(), &options);
        assert_eq!(view.aggregate(), &AggregateResult::from_iter([("B", 20.0)]));
    }

    #[test]
    fn every_transition_is_persisted() {
        let mut view = LoanViewModel::new(CsvTextSource::new(CSV), MemoryStore::new());
        view.fetch_data().unwrap();
        view.set_filter(Dimension::HomeOwnership, "OWN");

        let saved = view.store().load().unwrap().unwrap();
        assert_eq!(saved.selection.home_ownership, "OWN");
        assert_eq!(saved.aggregate.get("A"), Some(100.0));
        assert_eq!(saved.records.len(), 3);
    }

    #[test]
    fn reset_is_one_transition() {
        let mut view = LoanViewModel::new(CsvTextSource::new(CSV), MemoryStore::new());
        view.fetch_data().unwrap();
        view.set_filter(Dimension::Year, "2020");
        view.set_filter(Dimension::Term, "36");
        let before = view.revision();

        view.reset_filters();
        assert_eq!(view.revision(), before + 1);
        assert!(view.selection().is_all_wildcard());
    }

    #[test]
    fn filters_matching_nothing_report_no_matches() {
        let mut view = LoanViewModel::new(CsvTextSource::new(CSV), MemoryStore::new());
        view.fetch_data().unwrap();
        view.set_filter(Dimension::HomeOwnership, "MORTGAGE");
        assert!(view.aggregate().is_empty());
        assert!(view.error().is_none());
        assert_eq!(view.status(), ViewStatus::NoMatches);
    }
}

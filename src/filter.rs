use serde::{Deserialize, Serialize};

use crate::record::{Dimension, LoanRecord};
use crate::schema::filter::WILDCARD;

/// Active filter value for every dimension.
///
/// Each field always holds either a concrete label or `"all"`. Values are not
/// checked against the option lists: an unknown label simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    pub home_ownership: String,
    pub quarter: String,
    pub term: String,
    pub year: String,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            home_ownership: WILDCARD.to_string(),
            quarter: WILDCARD.to_string(),
            term: WILDCARD.to_string(),
            year: WILDCARD.to_string(),
        }
    }
}

impl FilterSelection {
    pub fn get(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::HomeOwnership => &self.home_ownership,
            Dimension::Quarter => &self.quarter,
            Dimension::Term => &self.term,
            Dimension::Year => &self.year,
        }
    }

    /// Point update; every other dimension keeps its value.
    pub fn set(&mut self, dimension: Dimension, value: impl Into<String>) {
        let slot = match dimension {
            Dimension::HomeOwnership => &mut self.home_ownership,
            Dimension::Quarter => &mut self.quarter,
            Dimension::Term => &mut self.term,
            Dimension::Year => &mut self.year,
        };
        *slot = value.into();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_wildcard(&self, dimension: Dimension) -> bool {
        self.get(dimension) == WILDCARD
    }

    pub fn is_all_wildcard(&self) -> bool {
        Dimension::ALL.iter().all(|d| self.is_wildcard(*d))
    }

    /// True when `record` passes every dimension (exact, case-sensitive).
    pub fn matches(&self, record: &LoanRecord) -> bool {
        Dimension::ALL
            .iter()
            .all(|d| self.is_wildcard(*d) || record.value(*d) == self.get(*d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ownership: &str, year: &str) -> LoanRecord {
        LoanRecord {
            home_ownership: ownership.into(),
            year: year.into(),
            quarter: "1".into(),
            term: "36".into(),
            ..Default::default()
        }
    }

    #[test]
    fn default_is_all_wildcard() {
        let selection = FilterSelection::default();
        assert!(selection.is_all_wildcard());
        assert!(selection.matches(&record("OWN", "2020")));
    }

    #[test]
    fn set_changes_one_dimension_only() {
        let mut selection = FilterSelection::default();
        selection.set(Dimension::Year, "2020");
        selection.set(Dimension::HomeOwnership, "OWN");
        assert_eq!(selection.get(Dimension::Year), "2020");
        assert_eq!(selection.get(Dimension::HomeOwnership), "OWN");
        assert!(selection.is_wildcard(Dimension::Quarter));
        assert!(selection.is_wildcard(Dimension::Term));
    }

    #[test]
    fn dimensions_are_anded_and_case_sensitive() {
        let mut selection = FilterSelection::default();
        selection.set(Dimension::HomeOwnership, "OWN");
        selection.set(Dimension::Year, "2020");
        assert!(selection.matches(&record("OWN", "2020")));
        assert!(!selection.matches(&record("OWN", "2019")));
        assert!(!selection.matches(&record("own", "2020")));
    }

    #[test]
    fn reset_restores_every_wildcard() {
        let mut selection = FilterSelection::default();
        for dim in Dimension::ALL {
            selection.set(dim, "x");
        }
        selection.reset();
        assert_eq!(selection, FilterSelection::default());
    }
}

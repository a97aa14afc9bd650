//! Filter option lists derived from the loaded records.
//!
//! Options depend on records only. The controller keeps them inside
//! [`RecordSet`], so there is no way to change them without replacing the
//! records they were derived from.

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::{Dimension, LoanRecord};
use crate::schema::filter::WILDCARD;

/// How a dimension's option list is ordered after the wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOrder {
    /// First-seen order.
    Discovery,
    /// Ascending by the number formed from the label's digits ("Q3" -> 3).
    DigitsAscending,
    /// Descending by the label's leading integer ("2020" -> 2020).
    LeadingIntDescending,
}

impl OptionOrder {
    pub fn for_dimension(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Quarter => Self::DigitsAscending,
            Dimension::Year => Self::LeadingIntDescending,
            Dimension::HomeOwnership | Dimension::Term => Self::Discovery,
        }
    }
}

/// `"all"` followed by the distinct values of `dimension`.
pub fn derive_options(records: &[LoanRecord], dimension: Dimension) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut values: Vec<&str> = records
        .iter()
        .map(|r| r.value(dimension))
        .filter(|v| *v != WILDCARD && seen.insert(*v))
        .collect();

    // Unparseable labels get `None`, which orders below every number.
    // Both sorts are stable so ties keep discovery order.
    match OptionOrder::for_dimension(dimension) {
        OptionOrder::Discovery => {}
        OptionOrder::DigitsAscending => values.sort_by_key(|v| digits_key(v)),
        OptionOrder::LeadingIntDescending => values.sort_by_key(|v| Reverse(leading_int(v))),
    }

    std::iter::once(WILDCARD)
        .chain(values)
        .map(str::to_string)
        .collect()
}

/// Integer made of every ASCII digit in `label`, in order.
fn digits_key(label: &str) -> Option<i64> {
    let digits: String = label.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Integer prefix of `label` after leading whitespace, with optional sign.
fn leading_int(label: &str) -> Option<i64> {
    let s = label.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digit_len = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digit_len == 0 {
        return None;
    }
    s[..sign_len + digit_len].parse().ok()
}

/// Option lists for every filterable dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub home_ownership: Vec<String>,
    pub quarter: Vec<String>,
    pub term: Vec<String>,
    pub year: Vec<String>,
}

impl FilterOptions {
    pub fn derive(records: &[LoanRecord]) -> Self {
        Self {
            home_ownership: derive_options(records, Dimension::HomeOwnership),
            quarter: derive_options(records, Dimension::Quarter),
            term: derive_options(records, Dimension::Term),
            year: derive_options(records, Dimension::Year),
        }
    }

    pub fn get(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::HomeOwnership => &self.home_ownership,
            Dimension::Quarter => &self.quarter,
            Dimension::Term => &self.term,
            Dimension::Year => &self.year,
        }
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::derive(&[])
    }
}

/// Records together with the options derived from them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    records: Vec<LoanRecord>,
    options: FilterOptions,
}

impl RecordSet {
    pub fn new(records: Vec<LoanRecord>) -> Self {
        let options = FilterOptions::derive(&records);
        Self { records, options }
    }

    pub fn records(&self) -> &[LoanRecord] {
        &self.records
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(dimension: Dimension, values: &[&str]) -> Vec<LoanRecord> {
        values
            .iter()
            .map(|v| {
                let mut r = LoanRecord::default();
                match dimension {
                    Dimension::HomeOwnership => r.home_ownership = v.to_string(),
                    Dimension::Quarter => r.quarter = v.to_string(),
                    Dimension::Term => r.term = v.to_string(),
                    Dimension::Year => r.year = v.to_string(),
                }
                r
            })
            .collect()
    }

    #[test]
    fn wildcard_leads_empty_and_full_lists() {
        for dim in Dimension::ALL {
            assert_eq!(derive_options(&[], dim), vec!["all"]);
        }
        let opts = derive_options(&with(Dimension::Term, &["36", "60", "36"]), Dimension::Term);
        assert_eq!(opts, vec!["all", "36", "60"]);
    }

    #[test]
    fn literal_all_value_is_not_duplicated() {
        let records = with(Dimension::HomeOwnership, &["RENT", "all", "OWN", "all"]);
        let opts = derive_options(&records, Dimension::HomeOwnership);
        assert_eq!(opts, vec!["all", "RENT", "OWN"]);
        assert_eq!(opts.iter().filter(|o| *o == "all").count(), 1);
    }

    #[test]
    fn unsorted_dimensions_keep_discovery_order() {
        let records = with(Dimension::HomeOwnership, &["RENT", "OWN", "MORTGAGE", "OWN"]);
        assert_eq!(
            derive_options(&records, Dimension::HomeOwnership),
            vec!["all", "RENT", "OWN", "MORTGAGE"]
        );
    }

    #[test]
    fn quarters_sort_ascending_by_digits() {
        let records = with(Dimension::Quarter, &["Q3", "Q1", "Q4", "Q2"]);
        assert_eq!(
            derive_options(&records, Dimension::Quarter),
            vec!["all", "Q1", "Q2", "Q3", "Q4"]
        );
    }

    #[test]
    fn years_sort_descending() {
        let records = with(Dimension::Year, &["2018", "2020", "2019"]);
        assert_eq!(
            derive_options(&records, Dimension::Year),
            vec!["all", "2020", "2019", "2018"]
        );
    }

    #[test]
    fn non_numeric_labels_get_the_smallest_key() {
        let quarters = with(Dimension::Quarter, &["2", "unknown", "1", "n/a"]);
        assert_eq!(
            derive_options(&quarters, Dimension::Quarter),
            vec!["all", "unknown", "n/a", "1", "2"]
        );

        let years = with(Dimension::Year, &["n/a", "2019", "2021"]);
        assert_eq!(
            derive_options(&years, Dimension::Year),
            vec!["all", "2021", "2019", "n/a"]
        );
    }

    #[test]
    fn leading_int_reads_prefix_only() {
        assert_eq!(leading_int("2020"), Some(2020));
        assert_eq!(leading_int(" 2019-Q1"), Some(2019));
        assert_eq!(leading_int("-5"), Some(-5));
        assert_eq!(leading_int("FY2020"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn record_set_derives_options_once() {
        let set = RecordSet::new(with(Dimension::Year, &["2019", "2020"]));
        assert_eq!(set.len(), 2);
        assert_eq!(set.options().get(Dimension::Year), ["all", "2020", "2019"]);
        assert_eq!(RecordSet::default().options(), &FilterOptions::default());
    }
}

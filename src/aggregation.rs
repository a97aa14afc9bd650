use std::collections::BTreeMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::LoanError;
use crate::filter::FilterSelection;
use crate::record::LoanRecord;
use crate::schema::aggregate;

/// Total balance per grade for the records passing a selection.
///
/// Only grades with at least one counted balance are present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateResult {
    totals: BTreeMap<String, f64>,
}

impl AggregateResult {
    pub fn get(&self, grade: &str) -> Option<f64> {
        self.totals.get(grade).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn totals(&self) -> &BTreeMap<String, f64> {
        &self.totals
    }

    /// Two-column frame: `grade`, `total_balance`.
    pub fn to_frame(&self) -> Result<DataFrame, LoanError> {
        let grades: Vec<String> = self.totals.keys().cloned().collect();
        let totals: Vec<f64> = self.totals.values().copied().collect();

        let df = DataFrame::new(vec![
            Column::new(aggregate::GRADE.into(), &grades),
            Column::new(aggregate::TOTAL_BALANCE.into(), &totals),
        ])?;
        Ok(df)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for AggregateResult {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            totals: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Filter `records` by `selection` and sum balances per grade.
///
/// The running total of each grade is rounded to cents after every addition,
/// so totals depend on record order exactly as the displayed figures do.
/// Balances that do not parse are left out of their group.
pub fn aggregate(records: &[LoanRecord], selection: &FilterSelection) -> AggregateResult {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records.iter().filter(|r| selection.matches(r)) {
        let Some(balance) = parse_balance(&record.current_balance) else {
            skipped += 1;
            continue;
        };
        let total = totals.entry(record.grade.clone()).or_insert(0.0);
        *total = round_cents(*total + balance);
    }

    if skipped > 0 {
        tracing::debug!(skipped, "excluded records with non-numeric balance");
    }

    AggregateResult { totals }
}

/// Round half up to two decimals.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Parse the longest numeric prefix of `text`, after leading whitespace.
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// optional exponent, so `"1200.50 USD"` reads as `1200.5`. Returns `None`
/// when no number is found or the value is not finite.
pub fn parse_balance(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

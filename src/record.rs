use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoanError;
use crate::schema::dimension;

/// One loan observation as read from the source table.
///
/// Every field keeps its source text; the balance is parsed only when
/// aggregating.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub year: String,
    pub quarter: String,
    pub grade: String,
    pub home_ownership: String,
    pub term: String,
    pub current_balance: String,
}

impl LoanRecord {
    /// Value of a filterable dimension.
    pub fn value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::HomeOwnership => &self.home_ownership,
            Dimension::Quarter => &self.quarter,
            Dimension::Term => &self.term,
            Dimension::Year => &self.year,
        }
    }
}

/// Categorical field a user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    HomeOwnership,
    Quarter,
    Term,
    Year,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::HomeOwnership,
        Dimension::Quarter,
        Dimension::Term,
        Dimension::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HomeOwnership => dimension::HOME_OWNERSHIP,
            Self::Quarter => dimension::QUARTER,
            Self::Term => dimension::TERM,
            Self::Year => dimension::YEAR,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "homeOwnership" | "home_ownership" | "ownership" => Ok(Self::HomeOwnership),
            "quarter" => Ok(Self::Quarter),
            "term" => Ok(Self::Term),
            "year" => Ok(Self::Year),
            other => Err(LoanError::UnknownDimension(other.to_string())),
        }
    }
}

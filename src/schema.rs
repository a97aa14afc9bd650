/// Column-name constants for the loan dataset.
/// Single source of truth - exported to Python via PyO3.

// ── Source CSV columns ──────────────────────────────────────────────────────
pub mod source {
    pub const YEAR: &str = "v_year";
    pub const QUARTER: &str = "v_quarter";
    pub const GRADE: &str = "grade_2";
    pub const HOME_OWNERSHIP: &str = "home_ownership";
    pub const TERM: &str = "term";
    pub const CURRENT_BALANCE: &str = "V1";
}

// ── Filter dimension names ──────────────────────────────────────────────────
pub mod dimension {
    pub const HOME_OWNERSHIP: &str = "homeOwnership";
    pub const QUARTER: &str = "quarter";
    pub const TERM: &str = "term";
    pub const YEAR: &str = "year";
}

// ── Aggregate output columns ────────────────────────────────────────────────
pub mod aggregate {
    pub const GRADE: &str = "grade";
    pub const TOTAL_BALANCE: &str = "total_balance";
}

// ── Filter values ───────────────────────────────────────────────────────────
pub mod filter {
    /// Wildcard selection; matches every record.
    pub const WILDCARD: &str = "all";
}

// ── Persistence ─────────────────────────────────────────────────────────────
pub mod storage {
    pub const DEFAULT_KEY: &str = "loan-storage";
}

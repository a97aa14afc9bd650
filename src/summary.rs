//! Summary module: table rows and a bar chart for an aggregate.
//!
//! Produces a self-contained HTML fragment (inline SVG, no scripts) with:
//! - A bar per grade scaled to the largest absolute total; bars of negative
//!   totals carry the `negative` class and their own colour
//! - A one-row table of totals by grade
//! - Compact USD labels ("$1.5M", "$230.45K")
//!
//! Rows are ordered by grade label so the output is stable regardless of
//! how the aggregate was built.

use std::fmt::Write as FmtWrite;

use crate::aggregation::{round_cents, AggregateResult};

// ── Config ──────────────────────────────────────────────────────────────────

/// Configuration for the summary rendering.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Heading shown above the chart
    pub title: String,
    /// Prefix put before every grade label ("Grade A")
    pub label_prefix: String,
    /// Pixel width of the widest bar
    pub bar_max_px: u32,
    /// Pixel height of each bar lane
    pub lane_height_px: u32,
    /// Bar fill colour
    pub bar_color: String,
    /// Fill colour for grades with a negative total
    pub negative_bar_color: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            title: "Total Grade Amounts".to_string(),
            label_prefix: "Grade ".to_string(),
            bar_max_px: 480,
            lane_height_px: 28,
            bar_color: "#2563eb".to_string(),
            negative_bar_color: "#dc2626".to_string(),
        }
    }
}

// ── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub grade: String,
    pub total: f64,
    pub formatted: String,
}

pub fn summary_rows(aggregate: &AggregateResult) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = aggregate
        .iter()
        .map(|(grade, total)| SummaryRow {
            grade: grade.to_string(),
            total,
            formatted: format_compact_usd(total),
        })
        .collect();
    rows.sort_by(|a, b| a.grade.cmp(&b.grade));
    rows
}

// ── Number formatting ───────────────────────────────────────────────────────

const COMPACT_UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Format as compact US dollars with at most two fraction digits.
///
/// `1234.0` → `"$1.23K"`, `1_500_000.0` → `"$1.5M"`, `-950.0` → `"-$950"`.
/// A value that rounds up to 1000 of a unit moves to the next unit.
pub fn format_compact_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$NaN".to_string();
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();

    let mut scaled = round_cents(abs);
    let mut suffix = "";
    for (i, (unit, name)) in COMPACT_UNITS.iter().enumerate().rev() {
        let candidate = round_cents(abs / unit);
        if candidate < 1.0 {
            break;
        }
        if candidate >= 1000.0 && i > 0 {
            continue;
        }
        scaled = candidate;
        suffix = *name;
    }

    let number = trim_fraction(format!("{scaled:.2}"));
    if number == "0" {
        return "$0".to_string();
    }
    format!("{sign}${number}{suffix}")
}

fn trim_fraction(text: String) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

// ── HTML generation ─────────────────────────────────────────────────────────

/// Render the chart and table as one HTML fragment.
pub fn render_summary_html(aggregate: &AggregateResult, config: &SummaryConfig) -> String {
    let rows = summary_rows(aggregate);
    if rows.is_empty() {
        return "<div>No loan data to display.</div>".to_string();
    }

    let max_abs = rows
        .iter()
        .map(|r| r.total.abs())
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE);

    let label_width = 120u32;
    let value_width = 90u32;
    let width = label_width + config.bar_max_px + value_width;
    let height = config.lane_height_px * rows.len() as u32;

    let mut bars = String::new();
    for (i, row) in rows.iter().enumerate() {
        let bar_class = if row.total < 0.0 { "grade-bar negative" } else { "grade-bar" };
        let y = config.lane_height_px * i as u32;
        let bar_px = (row.total.abs() / max_abs * f64::from(config.bar_max_px)).round();
        let text_y = y + config.lane_height_px / 2 + 4;
        let _ = write!(
            bars,
            r##"<text class="grade-label" x="{lx}" y="{ty}">{label}</text><rect class="{bar_class}" x="{bx}" y="{by}" width="{bw}" height="{bh}" rx="4"><title>{label}: {value}</title></rect><text class="grade-value" x="{vx}" y="{ty}">{value}</text>"##,
            bar_class = bar_class,
            lx = label_width - 8,
            ty = text_y,
            label = escape_html(&format!("{}{}", config.label_prefix, row.grade)),
            bx = label_width,
            by = y + 4,
            bw = bar_px,
            bh = config.lane_height_px.saturating_sub(8),
            vx = f64::from(label_width) + bar_px + 6.0,
            value = escape_html(&row.formatted),
        );
    }

    let mut header = String::new();
    let mut cells = String::new();
    for row in &rows {
        let label = escape_html(&format!("{}{}", config.label_prefix, row.grade));
        let _ = write!(header, r##"<th scope="col">{label}</th>"##);
        let _ = write!(
            cells,
            r##"<td aria-label="Total balance for {label}">{}</td>"##,
            escape_html(&row.formatted)
        );
    }

    format!(
        r##"<div class="loan-summary" style="font-family:sans-serif;">
  <h3 style="text-align:center;">{title}</h3>
  <svg data-testid="loan-chart" xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">
    <style>
      .grade-label {{ font-size: 12px; fill: #495057; text-anchor: end; }}
      .grade-value {{ font-size: 11px; fill: #868e96; }}
      .grade-bar {{ fill: {color}; }}
      .grade-bar.negative {{ fill: {negative_color}; }}
    </style>
    {bars}
  </svg>
  <table data-testid="loan-table" style="border-collapse:collapse; text-align:center;">
    <caption>Aggregated table showing total balances by grade</caption>
    <thead><tr>{header}</tr></thead>
    <tbody><tr>{cells}</tr></tbody>
  </table>
</div>"##,
        title = escape_html(&config.title),
        width = width,
        height = height,
        color = escape_html(&config.bar_color),
        negative_color = escape_html(&config.negative_bar_color),
        bars = bars,
        header = header,
        cells = cells,
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_usd_matches_display_format() {
        assert_eq!(format_compact_usd(0.0), "$0");
        assert_eq!(format_compact_usd(950.0), "$950");
        assert_eq!(format_compact_usd(12.5), "$12.5");
        assert_eq!(format_compact_usd(1234.0), "$1.23K");
        assert_eq!(format_compact_usd(1_500_000.0), "$1.5M");
        assert_eq!(format_compact_usd(2_000_000_000.0), "$2B");
        assert_eq!(format_compact_usd(-950.0), "-$950");
        assert_eq!(format_compact_usd(-1250.0), "-$1.25K");
    }

    #[test]
    fn compact_usd_promotes_to_next_unit() {
        assert_eq!(format_compact_usd(999_999.0), "$1M");
        assert_eq!(format_compact_usd(999.999), "$1K");
    }

    #[test]
    fn rows_sort_by_grade() {
        let aggregate = AggregateResult::from_iter([("C", 3.0), ("A", 1000.0), ("B", 2.0)]);
        let rows = summary_rows(&aggregate);
        let grades: Vec<&str> = rows.iter().map(|r| r.grade.as_str()).collect();
        assert_eq!(grades, vec!["A", "B", "C"]);
        assert_eq!(rows[0].formatted, "$1K");
    }

    #[test]
    fn html_lists_every_grade() {
        let aggregate = AggregateResult::from_iter([("A", 150.0), ("B<script>", 20.0)]);
        let html = render_summary_html(&aggregate, &SummaryConfig::default());
        assert!(html.contains("Grade A"));
        assert!(html.contains("$150"));
        assert!(html.contains("Grade B&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"data-testid="loan-table""#));
    }

    #[test]
    fn negative_totals_are_marked() {
        let aggregate = AggregateResult::from_iter([("A", 100.0), ("B", -50.0)]);
        let html = render_summary_html(&aggregate, &SummaryConfig::default());
        assert_eq!(html.matches(r#"class="grade-bar negative""#).count(), 1);
        assert_eq!(html.matches(r#"class="grade-bar""#).count(), 1);
        assert!(html.contains("-$50"));
        assert!(html.contains("#dc2626"));
    }

    #[test]
    fn empty_aggregate_renders_placeholder() {
        let html = render_summary_html(&AggregateResult::default(), &SummaryConfig::default());
        assert_eq!(html, "<div>No loan data to display.</div>");
    }
}

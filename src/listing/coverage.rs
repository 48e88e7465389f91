use std::sync::LazyLock;

use derive_more::Display;
use regex::Regex;
use serde::Serialize;

/// Coverage text used for nodes that have no data of their own
pub const UNKNOWN_COVERAGE: &str = "-";

const HIGH_THRESHOLD: f64 = 90.0;
const MEDIUM_THRESHOLD: f64 = 75.0;

static COVERAGE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.]+)%?").expect("coverage pattern is valid"));

/// Pulls the first `12.3%`-like number out of a piece of page text.
pub fn extract_coverage(text: &str) -> Option<String> {
    COVERAGE_VALUE
        .captures(text.trim())
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().to_string())
}

/// Qualitative bucket of a coverage percentage.
///
/// Serializes as the CSS class the report sidebar styles nodes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum CoverageClass {
    #[display("coverage-high")]
    #[serde(rename = "coverage-high")]
    High,
    #[display("coverage-medium")]
    #[serde(rename = "coverage-medium")]
    Medium,
    #[display("coverage-low")]
    #[serde(rename = "coverage-low")]
    Low,
    #[display("coverage-unknown")]
    #[serde(rename = "coverage-unknown")]
    Unknown,
}

impl CoverageClass {
    pub fn from_coverage(coverage: &str) -> Self {
        match coverage.trim().parse::<f64>() {
            Ok(pct) if pct.is_nan() => CoverageClass::Unknown,
            Ok(pct) if pct >= HIGH_THRESHOLD => CoverageClass::High,
            Ok(pct) if pct >= MEDIUM_THRESHOLD => CoverageClass::Medium,
            Ok(_) => CoverageClass::Low,
            Err(_) => CoverageClass::Unknown,
        }
    }
}

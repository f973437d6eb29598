//! Product data model shared by the extraction pipeline and the HTTP surface.

use serde::{Deserialize, Serialize};

/// Import priority, derived from `trend_score` with a single rule everywhere:
/// `>= 9.0` is high, `>= 7.5` is medium, anything else low. The model's own
/// label is never trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Derive the import priority from a trend score.
#[must_use]
pub fn priority_for_score(trend_score: f64) -> Priority {
    if trend_score >= 9.0 {
        Priority::High
    } else if trend_score >= 7.5 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// A single clothing product, either extracted from a store page or drawn
/// from the reference catalog. Identity is title-based only; there is no
/// unique identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    /// Display text as shown on the page ("$299"), never parsed to currency.
    pub price: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Absolute image URL, verified reachable before the product is returned.
    pub image: String,
    /// Advisory score in `[1, 10]`.
    pub trend_score: f64,
    pub recommendation: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Originating page URL for extracted products; absent for catalog items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,
}

/// Aggregate statistics recomputed over the final merged product list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_products: usize,
    /// Arithmetic mean of `trend_score`, rounded to one decimal. `0.0` when
    /// no products were returned.
    pub avg_trend_score: f64,
    /// Count of products with priority `high`.
    pub recommended_import: usize,
    pub stores_analyzed: usize,
}

/// Full response payload for one analysis request. This is also the value
/// stored in the response cache, so a cache hit re-serializes byte-identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub urls: Vec<String>,
    pub products: Vec<Product>,
    pub summary: AnalysisSummary,
}

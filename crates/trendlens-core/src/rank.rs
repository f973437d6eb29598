//! Ranking, display shuffle, and summary statistics over merged product lists.

use std::cmp::Ordering;

use rand::seq::SliceRandom;

use crate::products::{AnalysisSummary, Priority, Product};

/// How many products one page contributes after ranking.
pub const PER_URL_PRODUCT_CAP: usize = 10;

/// Sort one page's deduplicated products by trend score (highest first) and
/// keep the top `cap`.
#[must_use]
pub fn rank_url_products(mut products: Vec<Product>, cap: usize) -> Vec<Product> {
    products.sort_by(|a, b| {
        b.trend_score
            .partial_cmp(&a.trend_score)
            .unwrap_or(Ordering::Equal)
    });
    products.truncate(cap);
    products
}

/// Shuffle the merged list for display variety. Fisher–Yates, so every
/// permutation is equally likely; the ordering is cosmetic only.
pub fn shuffle_products(products: &mut [Product]) {
    products.shuffle(&mut rand::rng());
}

/// Recompute aggregate statistics over the final merged product list.
#[must_use]
pub fn summarize(products: &[Product], stores_analyzed: usize) -> AnalysisSummary {
    let total_products = products.len();

    let avg_trend_score = if products.is_empty() {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let mean = products.iter().map(|p| p.trend_score).sum::<f64>() / total_products as f64;
        round_one_decimal(mean)
    };

    let recommended_import = products
        .iter()
        .filter(|p| p.priority == Priority::High)
        .count();

    AnalysisSummary {
        total_products,
        avg_trend_score,
        recommended_import,
        stores_analyzed,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

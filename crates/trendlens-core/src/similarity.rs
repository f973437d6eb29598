//! Near-duplicate detection over product titles using word-set Jaccard
//! similarity.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::products::Product;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid title regex"));

/// Two titles more similar than this are considered the same product.
pub const DUPLICATE_THRESHOLD: f64 = 0.75;

/// Lowercase, trim, and strip non-word characters (keeping whitespace).
#[must_use]
pub fn normalize_title(title: &str) -> String {
    NON_WORD_RE
        .replace_all(&title.to_lowercase(), "")
        .trim()
        .to_string()
}

/// Jaccard similarity of the whitespace-tokenized word sets of two normalized
/// titles. Equal normalized titles score `1.0`; disjoint word sets score `0.0`.
#[must_use]
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_title(a);
    let b = normalize_title(b);

    if a == b {
        return 1.0;
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();

    #[allow(clippy::cast_precision_loss)]
    let similarity = intersection as f64 / union as f64;
    similarity
}

/// Drop near-duplicate products, greedily in arrival order: a candidate is
/// discarded when its title similarity to any previously accepted product
/// exceeds [`DUPLICATE_THRESHOLD`]. Quadratic, which is fine at the ≤20
/// candidates seen per page.
#[must_use]
pub fn dedup_products(products: Vec<Product>) -> Vec<Product> {
    let mut unique: Vec<Product> = Vec::with_capacity(products.len());

    for product in products {
        let is_duplicate = unique
            .iter()
            .any(|kept| title_similarity(&kept.title, &product.title) > DUPLICATE_THRESHOLD);

        if is_duplicate {
            tracing::debug!(title = %product.title, "dropping near-duplicate product");
        } else {
            unique.push(product);
        }
    }

    unique
}

//! Price candidates, shared noise filters and median aggregation.
//!
//! Every source extractor produces `PriceCandidate` values through the
//! filters in this module, so the reconciler never depends on
//! source-specific document shapes.

use serde::Serialize;
use std::fmt;

use crate::config::MAX_PRICE;

/// Which data source produced a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceId {
    /// eBay sold listings (scrape or Finding API)
    Ebay,
    /// PriceCharting search results
    PriceCharting,
    /// Yuyutei buylist (domestic)
    Yuyutei,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Ebay => write!(f, "ebay"),
            SourceId::PriceCharting => write!(f, "pricecharting"),
            SourceId::Yuyutei => write!(f, "yuyutei"),
        }
    }
}

/// Condition tier of a price observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionTier {
    /// Raw, non-certified condition
    Ungraded,
    /// Certified at the top standard grade (PSA 10)
    GradedTop,
}

/// One scraped price observation, before aggregation.
///
/// Invariant: `amount` is strictly positive and below `MAX_PRICE`;
/// `filtered_amount` is the only constructor path and drops violators
/// rather than clamping them.
#[derive(Debug, Clone)]
pub struct PriceCandidate {
    pub amount: f64,
    pub source: SourceId,
    pub tier: ConditionTier,
    /// Raw listing title/text the amount was matched from
    pub matched_text: String,
}

/// Validates an extracted amount against the sanity bounds. Returns
/// `None` for non-positive or ceiling-exceeding values so they are
/// absent from aggregation, never zero-clamped into it.
pub fn filtered_amount(amount: f64) -> Option<f64> {
    if amount > 0.0 && amount < MAX_PRICE {
        Some(amount)
    } else {
        None
    }
}

// Listing-text vocabulary. All checks run on uppercased full visible
// text (title plus subtitle/description where the source provides one).

const GRADING_KEYWORDS: &[&str] = &[
    "PSA",
    "GRADED",
    "BGS",
    "CGC",
    "SGC",
    "BECKETT",
    "GEM MINT",
    "GEM-MINT",
    "MINT CONDITION",
    "GRADING",
];

const BULK_KEYWORDS: &[&str] = &["LOT", "SET", "BOX"];

/// True when the text mentions a grading service or grading vocabulary.
/// Such listings are excluded from ungraded extraction.
pub fn contains_grading_vocabulary(upper_text: &str) -> bool {
    GRADING_KEYWORDS.iter().any(|k| upper_text.contains(k))
}

/// True for bulk listings (lot/set/box), excluded from every tier.
pub fn is_bulk_listing(upper_text: &str) -> bool {
    BULK_KEYWORDS.iter().any(|k| upper_text.contains(k))
}

/// True when the text carries an explicit top-grade marker. Required for
/// graded-top extraction.
pub fn mentions_graded_top(upper_text: &str) -> bool {
    upper_text.contains("PSA 10") || upper_text.contains("PSA10")
}

/// Outcome of the rarity consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RarityMatch {
    /// Text contains the target rarity token
    Confirmed,
    /// Neither the target nor a contradicting token found; kept as a
    /// candidate and left to price ranking. Known precision/recall
    /// trade-off: tolerates source-side text variance at the risk of
    /// cross-rarity contamination.
    Neutral,
    /// Text names a clearly different rarity; hard exclude
    Mismatch,
}

/// Checks listing text against the normalized target rarity token.
///
/// The contradiction set is the common lower-tier tokens ("RR", "AR"):
/// a listing explicitly labeled RR must never aggregate under SAR.
pub fn check_rarity(upper_text: &str, target_token: &str) -> RarityMatch {
    if target_token.is_empty() {
        return RarityMatch::Neutral;
    }
    if upper_text.contains(target_token) {
        return RarityMatch::Confirmed;
    }
    if upper_text.contains("RR") || upper_text.contains("AR") {
        return RarityMatch::Mismatch;
    }
    RarityMatch::Neutral
}

/// Price floor for high-value rarity tiers: a SAR/SR listing priced
/// under 500 JPY is a miscategorized match (accessory, sleeve), not the
/// card. Amounts are in JPY here since the floor guards the domestic
/// buylist extraction.
pub fn passes_rarity_price_floor(amount_jpy: f64, target_token: &str) -> bool {
    if (target_token == "SAR" || target_token == "SR") && amount_jpy < 500.0 {
        return false;
    }
    true
}

/// Representative price for one condition tier after aggregation.
#[derive(Debug, Clone)]
pub struct AggregatedPrice {
    /// Median amount, or 0.0 when no data survived filtering
    pub amount: f64,
    /// Number of contributing candidates
    pub sample_count: usize,
    pub source: SourceId,
    /// True when derived by a fallback formula rather than observed
    pub estimated: bool,
}

impl AggregatedPrice {
    /// Explicit "no data" marker, distinct from any real observation
    /// (amounts are strictly positive post-filter).
    pub fn no_data(source: SourceId) -> Self {
        Self {
            amount: 0.0,
            sample_count: 0,
            source,
            estimated: false,
        }
    }

    pub fn has_data(&self) -> bool {
        self.amount > 0.0
    }
}

/// Reduces a candidate set to its median amount (lower-middle element
/// for even counts). The median is robust to the long right tail of
/// marketplace asks; a handful of outlier high listings should not skew
/// the estimate.
pub fn aggregate(candidates: &[PriceCandidate], source: SourceId) -> AggregatedPrice {
    if candidates.is_empty() {
        return AggregatedPrice::no_data(source);
    }

    let mut amounts: Vec<f64> = candidates.iter().map(|c| c.amount).collect();
    amounts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = amounts[(amounts.len() - 1) / 2];

    log::debug!(
        "Aggregated {} candidates from {}: median {}",
        candidates.len(),
        source,
        median
    );

    AggregatedPrice {
        amount: median,
        sample_count: candidates.len(),
        source,
        estimated: false,
    }
}

#[cfg(test)]
#[path = "candidate_tests.rs"]
mod tests;

//! Recommendation engine.
//!
//! A pure function of the two ungraded net-proceed figures. The bands
//! are deliberately asymmetric and non-zero-crossing: estimation noise
//! means small deltas carry no signal, so they land in the neutral
//! band. An already-graded photo only changes the label; the comparison
//! stays ungraded-vs-ungraded.

use serde::Serialize;

/// Export must beat domestic by at least this much (JPY) to recommend
/// exporting.
const EXPORT_MARGIN_JPY: i64 = 1000;
/// Deltas above this (exclusive) are treated as noise.
const NEUTRAL_FLOOR_JPY: i64 = -500;

/// Fixed recommendation outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationLabel {
    /// Exporting nets meaningfully more
    ExportRecommended,
    /// Within the noise band; either market works
    EitherMarket,
    /// Selling domestically nets meaningfully more
    SellDomestic,
    /// The photographed card is already a top-grade slab
    AlreadyGradedTop,
    /// Neither channel produced a usable figure
    InsufficientData,
}

impl RecommendationLabel {
    /// Display text mirrored to consumers.
    pub fn text(&self) -> &'static str {
        match self {
            RecommendationLabel::ExportRecommended => "Export via eBay recommended",
            RecommendationLabel::EitherMarket => "Either market works",
            RecommendationLabel::SellDomestic => "Sell domestically",
            RecommendationLabel::AlreadyGradedTop => "Holding a PSA 10",
            RecommendationLabel::InsufficientData => "Insufficient data",
        }
    }
}

/// Ordinal severity, also used as the UI color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    FavorExport,
    Neutral,
    FavorDomestic,
    InsufficientData,
}

impl Severity {
    pub fn color(&self) -> &'static str {
        match self {
            Severity::FavorExport => "green",
            Severity::Neutral => "blue",
            Severity::FavorDomestic => "red",
            Severity::InsufficientData => "gray",
        }
    }
}

/// Final recommendation value object. Computed fresh per request; a
/// pure function of the two net figures plus the already-graded flag.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub label: RecommendationLabel,
    pub severity: Severity,
    /// Export net minus domestic net when both sides have data, else 0
    pub profit: i64,
    /// Human-readable profit delta, empty when one side lacks data
    pub comparison: String,
}

fn format_yen(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();
    if amount < 0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}

fn banded(profit: i64) -> (Severity, String) {
    if profit >= EXPORT_MARGIN_JPY {
        (
            Severity::FavorExport,
            format!(
                "Exporting nets {} more (fees and shipping included)",
                format_yen(profit)
            ),
        )
    } else if profit > NEUTRAL_FLOOR_JPY {
        (
            Severity::Neutral,
            "Roughly the same either way (fees and shipping included)".to_string(),
        )
    } else {
        (
            Severity::FavorDomestic,
            format!(
                "Selling domestically nets {} more (fees and shipping included)",
                format_yen(-profit)
            ),
        )
    }
}

/// Compares domestic and export ungraded net proceeds.
pub fn recommend(domestic_net: i64, export_net: i64, already_graded_top: bool) -> Recommendation {
    let both_sided = domestic_net > 0 && export_net > 0;
    let profit = if both_sided {
        export_net - domestic_net
    } else {
        0
    };

    if already_graded_top {
        // Label reflects what the user is holding; the comparison still
        // answers "what if I sold it raw".
        let comparison = if both_sided {
            banded(profit).1
        } else {
            String::new()
        };
        return Recommendation {
            label: RecommendationLabel::AlreadyGradedTop,
            severity: Severity::FavorExport,
            profit,
            comparison,
        };
    }

    if both_sided {
        let (severity, comparison) = banded(profit);
        let label = match severity {
            Severity::FavorExport => RecommendationLabel::ExportRecommended,
            Severity::Neutral => RecommendationLabel::EitherMarket,
            _ => RecommendationLabel::SellDomestic,
        };
        return Recommendation {
            label,
            severity,
            profit,
            comparison,
        };
    }

    // Single-sided degradation: recommend whichever channel has data.
    if export_net > 0 {
        Recommendation {
            label: RecommendationLabel::ExportRecommended,
            severity: Severity::FavorExport,
            profit: 0,
            comparison: String::new(),
        }
    } else if domestic_net > 0 {
        Recommendation {
            label: RecommendationLabel::SellDomestic,
            severity: Severity::FavorDomestic,
            profit: 0,
            comparison: String::new(),
        }
    } else {
        Recommendation {
            label: RecommendationLabel::InsufficientData,
            severity: Severity::InsufficientData,
            profit: 0,
            comparison: String::new(),
        }
    }
}

#[cfg(test)]
#[path = "recommend_tests.rs"]
mod tests;

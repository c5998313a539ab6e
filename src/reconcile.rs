//! Cross-source price reconciliation.
//!
//! Merges the per-source aggregates for the export market into final
//! ungraded and graded-top figures, applying source priority and the
//! estimation fallback when a tier has no direct data.

use crate::candidate::AggregatedPrice;

/// Per-source export-market aggregates feeding reconciliation. Sources
/// that were not queried (suppressed or unavailable) carry a `no_data`
/// aggregate.
#[derive(Debug, Clone)]
pub struct ExportQuotes {
    /// Sold-listings ungraded median (primary source for the tier)
    pub ebay_ungraded: AggregatedPrice,
    /// Search-table backup price (secondary source for the tier)
    pub charting_ungraded: AggregatedPrice,
    /// Graded-top median from the highest-fidelity source
    pub ebay_graded: AggregatedPrice,
    /// Lower-fidelity graded column from the secondary source
    pub charting_graded: AggregatedPrice,
}

/// Reconciled export-market prices, one per tier.
#[derive(Debug, Clone)]
pub struct ReconciledPrices {
    pub ungraded: AggregatedPrice,
    pub graded_top: AggregatedPrice,
}

/// Applies the tier priority policy:
///
/// - Ungraded: sold listings first, search-table backup second.
/// - Graded-top: direct data first; otherwise the grading-premium
///   estimate from whatever ungraded figure survived (flagged
///   `estimated`, keeping that figure's provenance); otherwise the
///   secondary source's own graded column; no data when none of those
///   exist.
pub fn reconcile(quotes: ExportQuotes, grading_premium_multiplier: f64) -> ReconciledPrices {
    let ungraded = if quotes.ebay_ungraded.has_data() {
        quotes.ebay_ungraded
    } else {
        if quotes.charting_ungraded.has_data() {
            log::info!(
                "Ungraded tier falling back to {} (${})",
                quotes.charting_ungraded.source,
                quotes.charting_ungraded.amount
            );
        }
        quotes.charting_ungraded
    };

    let graded_top = if quotes.ebay_graded.has_data() {
        quotes.ebay_graded
    } else if ungraded.has_data() {
        let estimate = round_cents(ungraded.amount * grading_premium_multiplier);
        log::info!(
            "No direct graded-top data; estimating ${} x {} = ${}",
            ungraded.amount,
            grading_premium_multiplier,
            estimate
        );
        AggregatedPrice {
            amount: estimate,
            sample_count: ungraded.sample_count,
            source: ungraded.source,
            estimated: true,
        }
    } else if quotes.charting_graded.has_data() {
        log::info!(
            "Graded tier falling back to {} (${})",
            quotes.charting_graded.source,
            quotes.charting_graded.amount
        );
        quotes.charting_graded
    } else {
        quotes.ebay_graded
    };

    ReconciledPrices {
        ungraded,
        graded_top,
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{AggregatedPrice, SourceId};

    fn observed(amount: f64, source: SourceId) -> AggregatedPrice {
        AggregatedPrice {
            amount,
            sample_count: 5,
            source,
            estimated: false,
        }
    }

    fn quotes(
        ebay_ungraded: Option<f64>,
        charting_ungraded: Option<f64>,
        ebay_graded: Option<f64>,
    ) -> ExportQuotes {
        ExportQuotes {
            ebay_ungraded: ebay_ungraded
                .map(|a| observed(a, SourceId::Ebay))
                .unwrap_or_else(|| AggregatedPrice::no_data(SourceId::Ebay)),
            charting_ungraded: charting_ungraded
                .map(|a| observed(a, SourceId::PriceCharting))
                .unwrap_or_else(|| AggregatedPrice::no_data(SourceId::PriceCharting)),
            ebay_graded: ebay_graded
                .map(|a| observed(a, SourceId::Ebay))
                .unwrap_or_else(|| AggregatedPrice::no_data(SourceId::Ebay)),
            charting_graded: AggregatedPrice::no_data(SourceId::PriceCharting),
        }
    }

    #[test]
    fn sold_listings_win_the_ungraded_tier() {
        let result = reconcile(quotes(Some(60.0), Some(45.0), Some(200.0)), 2.8);
        assert_eq!(result.ungraded.amount, 60.0);
        assert_eq!(result.ungraded.source, SourceId::Ebay);
        assert!(!result.ungraded.estimated);
    }

    #[test]
    fn secondary_source_fills_missing_ungraded() {
        let result = reconcile(quotes(None, Some(45.0), Some(200.0)), 2.8);
        assert_eq!(result.ungraded.amount, 45.0);
        assert_eq!(result.ungraded.source, SourceId::PriceCharting);
    }

    #[test]
    fn direct_graded_data_is_never_estimated() {
        let result = reconcile(quotes(Some(60.0), None, Some(200.0)), 2.8);
        assert_eq!(result.graded_top.amount, 200.0);
        assert!(!result.graded_top.estimated);
    }

    #[test]
    fn missing_graded_tier_uses_premium_multiplier() {
        let result = reconcile(quotes(Some(1000.0), None, None), 2.8);
        assert_eq!(result.graded_top.amount, 2800.0);
        assert!(result.graded_top.estimated);
        assert_eq!(result.graded_top.source, SourceId::Ebay);
    }

    #[test]
    fn estimate_from_secondary_source_keeps_its_provenance() {
        let result = reconcile(quotes(None, Some(50.0), None), 2.8);
        assert_eq!(result.graded_top.amount, 140.0);
        assert!(result.graded_top.estimated);
        assert_eq!(result.graded_top.source, SourceId::PriceCharting);
    }

    #[test]
    fn nothing_in_yields_nothing_out() {
        let result = reconcile(quotes(None, None, None), 2.8);
        assert!(!result.ungraded.has_data());
        assert!(!result.graded_top.has_data());
        assert!(!result.graded_top.estimated);
    }

    #[test]
    fn secondary_graded_column_is_the_last_resort() {
        // No ungraded figure anywhere means no estimate either; only
        // then does the secondary's own graded column count
        let result = reconcile(
            ExportQuotes {
                charting_graded: observed(180.0, SourceId::PriceCharting),
                ..quotes(None, None, None)
            },
            2.8,
        );
        assert!(!result.ungraded.has_data());
        assert_eq!(result.graded_top.amount, 180.0);
        assert_eq!(result.graded_top.source, SourceId::PriceCharting);
        assert!(!result.graded_top.estimated);
    }

    #[test]
    fn estimate_outranks_the_secondary_graded_column() {
        let result = reconcile(
            ExportQuotes {
                charting_graded: observed(180.0, SourceId::PriceCharting),
                ..quotes(Some(50.0), None, None)
            },
            2.8,
        );
        assert_eq!(result.graded_top.amount, 140.0);
        assert!(result.graded_top.estimated);
    }

    #[test]
    fn multiplier_is_configurable() {
        let result = reconcile(quotes(Some(100.0), None, None), 3.5);
        assert_eq!(result.graded_top.amount, 350.0);
    }
}

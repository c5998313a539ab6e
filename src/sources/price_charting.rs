//! PriceCharting search-results client and extractor.
//!
//! Secondary export source: its search page lists one row per product
//! with loose price columns, so it contributes at most one backup
//! candidate per tier per query. The row filter prefers the print run
//! matching the photographed card (Japanese vs. international).

use scraper::Html;
use std::time::Duration;

use super::{parse_usd, sel};
use crate::candidate::{filtered_amount, ConditionTier, PriceCandidate, SourceId};
use crate::config::Config;
use crate::error::{AnalyzeError, Result};

pub struct PriceChartingClient {
    http: reqwest::Client,
    base_url: String,
}

impl PriceChartingClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.price_charting_base_url.clone(),
        }
    }

    /// Searches the product table for backup prices (ungraded column,
    /// plus the graded column when present).
    pub async fn search(
        &self,
        query: &str,
        prefer_japanese: bool,
    ) -> Result<Vec<PriceCandidate>> {
        let url = format!(
            "{}/search-products?q={}&type=prices",
            self.base_url,
            urlencoding::encode(query.trim())
        );
        log::info!("PriceCharting search: \"{}\"", query);

        let response = self
            .http
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .header("Accept", "text/html")
            .timeout(Duration::from_secs(4))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalyzeError::HttpStatus(response.status()));
        }

        let html = response.text().await?;
        Ok(extract_search_results(&html, prefer_japanese))
    }
}

/// Picks the best-matching product row and extracts its prices: the
/// ungraded columns plus the PSA 10 column when the row carries one.
///
/// The row whose title matches the wanted print run wins; when no row
/// matches, the first row is used as a last resort (the search ranking
/// usually puts the right product on top).
pub fn extract_search_results(html: &str, prefer_japanese: bool) -> Vec<PriceCandidate> {
    let document = Html::parse_document(html);
    let row_sel = sel("#games_table tbody tr");
    let title_sel = sel(".title a");
    let new_price_sel = sel(".new_price");
    let used_price_sel = sel(".used_price");
    let graded_sel = sel(".manual_only_price");

    let rows: Vec<_> = document.select(&row_sel).collect();
    if rows.is_empty() {
        log::debug!("PriceCharting: no result rows");
        return Vec::new();
    }

    let target = rows
        .iter()
        .find(|row| {
            let title = row
                .select(&title_sel)
                .next()
                .map(|t| t.text().collect::<String>().to_lowercase())
                .unwrap_or_default();
            title.contains("japanese") == prefer_japanese
        })
        .or_else(|| rows.first());

    let Some(row) = target else {
        return Vec::new();
    };

    let title = row
        .select(&title_sel)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let cell_price = |selector: &scraper::Selector| {
        row.select(selector)
            .next()
            .and_then(|cell| parse_usd(&cell.text().collect::<String>()))
    };

    let ungraded = cell_price(&new_price_sel)
        .filter(|a| *a > 0.0)
        .or_else(|| cell_price(&used_price_sel));

    let mut candidates = Vec::new();
    if let Some(amount) = ungraded.and_then(filtered_amount) {
        log::info!("PriceCharting backup price ${} ({})", amount, title);
        candidates.push(PriceCandidate {
            amount,
            source: SourceId::PriceCharting,
            tier: ConditionTier::Ungraded,
            matched_text: title.clone(),
        });
    }

    // PSA 10 column; lower fidelity than sold listings, used only when
    // no direct graded data exists anywhere
    if let Some(amount) = cell_price(&graded_sel).and_then(filtered_amount) {
        log::debug!("PriceCharting graded column ${} ({})", amount, title);
        candidates.push(PriceCandidate {
            amount,
            source: SourceId::PriceCharting,
            tier: ConditionTier::GradedTop,
            matched_text: title,
        });
    }

    candidates
}

#[cfg(test)]
#[path = "price_charting_tests.rs"]
mod tests;

//! Yuyutei buylist client and extractor (domestic source).
//!
//! The buylist page renders one tile per card with the buy price in a
//! `<strong>` element. The markup drifts between deployments, so both
//! the tile and the price lookups walk fallback selector patterns.
//! All amounts are JPY; the quoted buy price is already net proceeds.

use scraper::{ElementRef, Html};
use std::time::Duration;

use super::{parse_yen, parse_yen_labeled, sel};
use crate::candidate::{
    check_rarity, filtered_amount, passes_rarity_price_floor, ConditionTier, PriceCandidate,
    RarityMatch, SourceId,
};
use crate::config::Config;
use crate::error::{AnalyzeError, Result};

/// Tiles priced at or below this are navigation chrome or accessory
/// rows, not card offers.
const MIN_PLAUSIBLE_YEN: f64 = 10.0;

const TILE_SELECTORS: &[&str] = &[".card-product", "[class*='card-product']"];
const TITLE_SELECTOR: &str = "h4.text-primary.fw-bold, h4, a h4";
const NUMBER_SELECTOR: &str = "span[class*='border']";
const PRICE_SELECTORS: &[&str] = &[
    "strong[class*='text-end']",
    "strong[class*='d-block']",
    "strong",
];

pub struct YuyuteiClient {
    http: reqwest::Client,
    base_url: String,
}

impl YuyuteiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.yuyutei_base_url.clone(),
        }
    }

    /// Searches the buylist for one keyword variant.
    pub async fn search(
        &self,
        keyword: &str,
        target_name: &str,
        rarity_token: &str,
    ) -> Result<Vec<PriceCandidate>> {
        let url = format!(
            "{}/sell/poc/s/search?search_word={}",
            self.base_url,
            urlencoding::encode(keyword)
        );
        log::info!("Yuyutei search: \"{}\"", keyword);

        let response = self
            .http
            .get(&url)
            .header(
                "User-Agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "ja,en-US;q=0.7,en;q=0.3")
            .header("Referer", format!("{}/", self.base_url))
            .timeout(Duration::from_secs(7))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalyzeError::HttpStatus(response.status()));
        }

        let html = response.text().await?;
        Ok(extract_buylist(&html, target_name, rarity_token))
    }
}

/// Whitespace-free lowercase form for loose name comparison.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn tile_price_yen(tile: &ElementRef) -> Option<i64> {
    for pattern in PRICE_SELECTORS {
        let selector = sel(pattern);
        for strong in tile.select(&selector) {
            let text: String = strong.text().collect();
            if text.chars().any(|c| c.is_ascii_digit()) {
                if let Some(yen) = parse_yen(&text) {
                    return Some(yen);
                }
            }
        }
    }
    // Last resort: scan the whole tile text for a labeled yen amount
    parse_yen_labeled(&tile.text().collect::<String>())
}

/// Extracts buylist offers matching the target card.
///
/// A tile survives when its title shares the target name's prefix, its
/// combined text does not contradict the target rarity, and its price
/// clears both the plausibility floor and the rarity price floor.
pub fn extract_buylist(html: &str, target_name: &str, rarity_token: &str) -> Vec<PriceCandidate> {
    let document = Html::parse_document(html);
    let title_sel = sel(TITLE_SELECTOR);
    let number_sel = sel(NUMBER_SELECTOR);
    let img_sel = sel("img.card");

    let mut tiles = Vec::new();
    for selector in TILE_SELECTORS {
        tiles = document.select(&sel(selector)).collect();
        if !tiles.is_empty() {
            break;
        }
    }
    if tiles.is_empty() {
        log::debug!("Yuyutei: no card tiles in document");
        return Vec::new();
    }
    log::debug!("Yuyutei: {} card tiles", tiles.len());

    let target_check = normalize(target_name);
    let name_prefix: String = target_check.chars().take(2).collect();

    let mut candidates = Vec::new();
    for tile in tiles {
        let title = tile
            .select(&title_sel)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        // Reject tiles for entirely different cards
        if target_check.chars().count() > 2 && !normalize(&title).contains(&name_prefix) {
            continue;
        }

        let number = tile
            .select(&number_sel)
            .next()
            .map(|n| n.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let alt = tile
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("alt"))
            .unwrap_or_default();
        let full_text = format!("{} {} {}", title, number, alt).to_uppercase();

        match check_rarity(&full_text, rarity_token) {
            RarityMatch::Mismatch => {
                log::debug!("Yuyutei: rarity mismatch, skipping \"{}\"", title);
                continue;
            }
            RarityMatch::Confirmed | RarityMatch::Neutral => {}
        }

        let Some(yen) = tile_price_yen(&tile) else {
            continue;
        };
        let amount = yen as f64;

        if amount <= MIN_PLAUSIBLE_YEN {
            continue;
        }
        if !passes_rarity_price_floor(amount, rarity_token) {
            log::debug!("Yuyutei: ¥{} under rarity floor, skipping \"{}\"", yen, title);
            continue;
        }
        if let Some(amount) = filtered_amount(amount) {
            log::debug!("Yuyutei candidate ¥{} ({})", yen, title);
            candidates.push(PriceCandidate {
                amount,
                source: SourceId::Yuyutei,
                tier: ConditionTier::Ungraded,
                matched_text: title,
            });
        }
    }

    candidates
}

#[cfg(test)]
#[path = "yuyutei_tests.rs"]
mod tests;

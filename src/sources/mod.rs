//! Source clients and extractors, one module per data source.
//!
//! Each client performs the network query for a single keyword variant
//! and hands the response document to its extractor; each extractor
//! turns a raw document into filtered `PriceCandidate` values. All
//! transport failures recover to zero candidates at the fallback runner.

pub mod ebay;
pub mod price_charting;
pub mod yuyutei;

pub use ebay::EbayClient;
pub use price_charting::PriceChartingClient;
pub use yuyutei::YuyuteiClient;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Selector;

lazy_static! {
    /// "$1,234.56" style amounts
    static ref USD_RE: Regex = Regex::new(r"\$(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)").unwrap();
    /// "16,174 円" style amounts
    static ref YEN_RE: Regex = Regex::new(r"(\d{1,3}(?:,\d{3})*)\s*円").unwrap();
    /// Bare grouped digits, the last-resort pattern for buylist tiles
    static ref DIGITS_RE: Regex = Regex::new(r"(\d{1,3}(?:,\d{3})*)").unwrap();
}

/// Parses a static CSS selector. All selectors in this crate are
/// compile-time literals, so a parse failure is a programming error.
pub(crate) fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static css selector")
}

/// Extracts a USD amount from listing text. JPY-denominated listings
/// are converted at the fixed rate (rounded to cents, matching the
/// display precision of the source) before the sanity-bound check.
pub(crate) fn parse_usd_or_yen(text: &str, usd_jpy_rate: f64) -> Option<f64> {
    if let Some(caps) = USD_RE.captures(text) {
        return caps[1].replace(',', "").parse::<f64>().ok();
    }
    if let Some(caps) = YEN_RE.captures(text) {
        let yen: f64 = caps[1].replace(',', "").parse().ok()?;
        let usd = (yen / usd_jpy_rate * 100.0).round() / 100.0;
        log::debug!("Converted listing price ¥{} -> ${}", yen, usd);
        return Some(usd);
    }
    None
}

/// Extracts a USD amount only ("$12.34"); sources that never list JPY
/// prices use this stricter form.
pub(crate) fn parse_usd(text: &str) -> Option<f64> {
    let caps = USD_RE.captures(text)?;
    caps[1].replace(',', "").parse::<f64>().ok()
}

/// Extracts a JPY integer amount ("12,800円", "12,800 円"). Falls back
/// to bare grouped digits for price cells that omit the currency label;
/// only use on text already known to hold a price.
pub(crate) fn parse_yen(text: &str) -> Option<i64> {
    let caps = YEN_RE
        .captures(text)
        .or_else(|| DIGITS_RE.captures(text))?;
    caps[1].replace(',', "").parse::<i64>().ok()
}

/// Extracts a JPY amount only when the 円 label is present. Used for
/// whole-tile scans where bare digit runs are collector numbers, not
/// prices.
pub(crate) fn parse_yen_labeled(text: &str) -> Option<i64> {
    let caps = YEN_RE.captures(text)?;
    caps[1].replace(',', "").parse::<i64>().ok()
}

/// Markers of anti-automation challenge pages. A challenge page is not
/// a parse failure; the attempt degrades to zero candidates.
pub(crate) fn is_challenge_page(html: &str) -> bool {
    html.contains("Pardon Our Interruption")
        || html.contains("security check")
        || html.contains("bot detection")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_usd_with_thousands_separator() {
        assert_eq!(parse_usd_or_yen("$1,234.56", 150.0), Some(1234.56));
        assert_eq!(parse_usd_or_yen("Sold for $89.99 shipped", 150.0), Some(89.99));
    }

    #[test]
    fn converts_yen_at_fixed_rate() {
        // ¥16,174 / 150 = 107.826... -> 107.83
        assert_eq!(parse_usd_or_yen("16,174 円", 150.0), Some(107.83));
    }

    #[test]
    fn usd_takes_precedence_over_yen() {
        assert_eq!(parse_usd_or_yen("$50.00 (7,500 円)", 150.0), Some(50.0));
    }

    #[test]
    fn no_amount_yields_none() {
        assert_eq!(parse_usd_or_yen("Best offer accepted", 150.0), None);
    }

    #[test]
    fn parses_yen_integer() {
        assert_eq!(parse_yen("12,800円"), Some(12800));
        assert_eq!(parse_yen("80 円"), Some(80));
        assert_eq!(parse_yen("12,800"), Some(12800));
        assert_eq!(parse_yen("no digits"), None);
    }

    #[test]
    fn recognizes_challenge_pages() {
        assert!(is_challenge_page("<html>Pardon Our Interruption</html>"));
        assert!(!is_challenge_page("<html><div class=\"srp-results\"/></html>"));
    }
}

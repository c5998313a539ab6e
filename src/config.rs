//! Runtime configuration and calibration constants.
//!
//! The exchange rate, grading-premium multiplier and fee model are fixed
//! calibration values, not live market data. They are fields rather than
//! hard constants so deployments (and tests) can override them without
//! changing default behavior.

use crate::error::{AnalyzeError, Result};

/// Sanity ceiling rejecting corrupted parses (bulk-lot prices, glued
/// digit runs). Applied in the source's aggregate currency.
pub const MAX_PRICE: f64 = 2_000_000.0;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed USD -> JPY conversion rate
    pub usd_jpy_rate: f64,
    /// PSA10 price estimate = ungraded price x this multiplier
    pub grading_premium_multiplier: f64,
    /// eBay final value fee for trading cards (12.9%)
    pub export_final_value_fee_rate: f64,
    /// eBay managed payments fee (3.6%)
    pub export_payment_fee_rate: f64,
    /// Flat international shipping cost in JPY
    pub export_shipping_jpy: i64,
    /// Daily request quota for non-entitled callers
    pub free_tier_daily_limit: u32,

    /// eBay web base URL (injectable for tests)
    pub ebay_base_url: String,
    /// eBay Finding API endpoint
    pub ebay_finding_api_url: String,
    /// eBay Finding API application id
    pub ebay_app_id: String,
    /// PriceCharting base URL
    pub price_charting_base_url: String,
    /// Yuyutei buylist base URL
    pub yuyutei_base_url: String,

    /// OpenAI-compatible endpoint for the image classifier
    pub classifier_base_url: String,
    /// Classifier model name
    pub classifier_model: String,
    /// Classifier API key (required at startup)
    pub classifier_api_key: String,

    /// Billing status endpoint for the entitlement check
    pub billing_base_url: String,
    /// Billing API key (optional; entitlement fails closed without it)
    pub billing_api_key: String,
}

impl Config {
    /// Combined export fee rate (final value + payment, additive).
    pub fn export_fee_rate(&self) -> f64 {
        self.export_final_value_fee_rate + self.export_payment_fee_rate
    }

    /// Builds a config from the environment. Fails fast when the
    /// classifier credential is absent; everything else has defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(AnalyzeError::MissingConfig("OPENAI_API_KEY"))?;

        Ok(Self {
            classifier_api_key: api_key,
            ..Self::with_dummy_credentials()
        })
    }

    /// Default calibration with a placeholder credential. Used by tests
    /// and as the base for `from_env`.
    pub fn with_dummy_credentials() -> Self {
        Self {
            usd_jpy_rate: 150.0,
            grading_premium_multiplier: 2.8,
            export_final_value_fee_rate: 0.129,
            export_payment_fee_rate: 0.036,
            export_shipping_jpy: 1500,
            free_tier_daily_limit: 3,
            ebay_base_url: "https://www.ebay.com".to_string(),
            ebay_finding_api_url: "https://svcs.ebay.com/services/search/FindingService/v1"
                .to_string(),
            ebay_app_id: std::env::var("EBAY_APP_ID").unwrap_or_default(),
            price_charting_base_url: "https://www.pricecharting.com".to_string(),
            yuyutei_base_url: "https://yuyu-tei.jp".to_string(),
            classifier_base_url: "https://api.openai.com/v1".to_string(),
            classifier_model: "gpt-4o-mini".to_string(),
            classifier_api_key: String::new(),
            billing_base_url: "https://api.stripe.com".to_string(),
            billing_api_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
        }
    }
}

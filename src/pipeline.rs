//! Analysis pipeline: one identified card in, one flat report out.
//!
//! The domestic and export chains run concurrently; inside the export
//! chain the ungraded and graded searches run sequentially to keep the
//! request rate against one host low. Source failures degrade to "no
//! data" figures, so the pipeline itself only fails when the classifier
//! does.

use serde::Serialize;

use crate::candidate::{aggregate, AggregatedPrice, ConditionTier, SourceId};
use crate::config::Config;
use crate::economics::{domestic_channel, export_channel, usd_to_jpy};
use crate::error::Result;
use crate::fallback::{run_fallback, FallbackPolicy};
use crate::identity::{CardIdentity, ClassifierClient};
use crate::query::{
    domestic_variants, export_graded_variants, export_ungraded_query, price_charting_query,
};
use crate::recommend::recommend;
use crate::reconcile::{reconcile, ExportQuotes, ReconciledPrices};
use crate::sources::{EbayClient, PriceChartingClient, YuyuteiClient};

/// Flat analysis report returned to API consumers. Field names are part
/// of the public contract and must stay stable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReport {
    pub card_name: String,
    pub card_number: String,
    pub jp_name: String,
    pub rarity: Option<String>,
    pub is_japanese: bool,
    pub is_slab: bool,
    pub grade: Option<u8>,

    /// Domestic buylist offer, JPY (0 = no data)
    pub jp_price: i64,
    pub jp_net_income: i64,
    pub jp_sample_count: usize,

    /// Export ungraded gross, JPY and native USD (0 = no data)
    pub us_price: i64,
    pub us_price_usd: f64,
    pub us_price_source: String,
    pub us_sample_count: usize,
    pub ebay_net_income: i64,
    pub ebay_fees: i64,
    pub ebay_shipping_cost: i64,
    pub ebay_search_url: String,

    /// Export graded-top gross, JPY and native USD (0 = no data)
    pub psa10_price: i64,
    pub psa10_price_usd: f64,
    pub psa10_net_income: i64,
    pub psa10_ebay_fees: i64,
    pub is_psa10_estimated: bool,

    /// Export-vs-domestic deltas in JPY (0 when one side lacks data)
    pub profit: i64,
    pub psa10_profit: i64,
    pub profit_comparison: String,
    pub recommendation: String,
    pub rec_color: String,

    /// True when at least one market produced a usable price
    pub is_valid: bool,
}

pub struct Pipeline {
    config: Config,
    classifier: ClassifierClient,
    ebay: EbayClient,
    charting: PriceChartingClient,
    yuyutei: YuyuteiClient,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            classifier: ClassifierClient::new(&config),
            ebay: EbayClient::new(&config),
            charting: PriceChartingClient::new(&config),
            yuyutei: YuyuteiClient::new(&config),
            config,
        }
    }

    /// Full flow: classify the photo, then price the identified card.
    pub async fn analyze_image(&self, image: &str) -> Result<AnalyzeReport> {
        let identity = self.classifier.identify(image).await?;
        Ok(self.analyze_identity(&identity).await)
    }

    /// Prices an already-identified card across all sources.
    pub async fn analyze_identity(&self, identity: &CardIdentity) -> AnalyzeReport {
        let (domestic, export) = tokio::join!(
            self.domestic_chain(identity),
            self.export_chain(identity)
        );
        build_report(identity, &domestic, &export, &self.config, &self.ebay)
    }

    /// Domestic buylist lookup: variant fallback, then median.
    async fn domestic_chain(&self, identity: &CardIdentity) -> AggregatedPrice {
        let variants = domestic_variants(identity);
        let rarity_token = identity.rarity_token().unwrap_or_default();
        let rarity: &str = &rarity_token;
        let local_name: &str = &identity.local_name;
        let policy = FallbackPolicy::new(500);

        let candidates = run_fallback("yuyutei", &variants, &policy, |variant| async move {
            self.yuyutei.search(&variant, local_name, rarity).await
        })
        .await;

        aggregate(&candidates, SourceId::Yuyutei)
    }

    /// Export lookups: ungraded sold listings plus backup, then the
    /// graded-top tier, reconciled into final per-tier figures.
    async fn export_chain(&self, identity: &CardIdentity) -> ReconciledPrices {
        let ungraded_policy = FallbackPolicy::new(300);
        let graded_policy = FallbackPolicy::new(800);

        // Sold listings cannot tell a slab sale from a raw sale, so a
        // photographed PSA 10 skips that query. The search table keys on
        // the card itself and still answers what a raw copy is worth.
        let ebay_ungraded = if identity.is_graded_top() {
            log::info!("Photographed card is a graded slab; skipping the sold-listings ungraded search");
            AggregatedPrice::no_data(SourceId::Ebay)
        } else {
            let ungraded_query = vec![export_ungraded_query(identity)];
            let candidates =
                run_fallback("ebay", &ungraded_query, &ungraded_policy, |variant| {
                    async move { self.ebay.search_ungraded(&variant).await }
                })
                .await;
            aggregate(&candidates, SourceId::Ebay)
        };

        let charting_query = vec![price_charting_query(identity)];
        let prefer_japanese = identity.is_japanese;
        let charting_candidates = run_fallback(
            "pricecharting",
            &charting_query,
            &ungraded_policy,
            |variant| async move {
                self.charting.search(&variant, prefer_japanese).await
            },
        )
        .await;

        let (graded, ungraded): (Vec<_>, Vec<_>) = charting_candidates
            .into_iter()
            .partition(|c| c.tier == ConditionTier::GradedTop);
        let charting_ungraded = aggregate(&ungraded, SourceId::PriceCharting);
        let charting_graded = aggregate(&graded, SourceId::PriceCharting);

        let graded_variants = export_graded_variants(identity);
        let ebay_graded = self
            .graded_chain(&graded_variants, &graded_policy)
            .await;

        reconcile(
            ExportQuotes {
                ebay_ungraded,
                charting_ungraded,
                ebay_graded,
                charting_graded,
            },
            self.config.grading_premium_multiplier,
        )
    }

    /// Graded-top lookup: the Finding API first (when configured), the
    /// sold-listings scrape as fallback.
    async fn graded_chain(
        &self,
        variants: &[String],
        policy: &FallbackPolicy,
    ) -> AggregatedPrice {
        if !self.config.ebay_app_id.is_empty() {
            let api_policy = FallbackPolicy::new(300);
            let candidates =
                run_fallback("ebay-api", variants, &api_policy, |variant| async move {
                    self.ebay.search_graded_api(&variant).await
                })
                .await;
            if !candidates.is_empty() {
                return aggregate(&candidates, SourceId::Ebay);
            }
        }

        let candidates = run_fallback("ebay-graded", variants, policy, |variant| async move {
            self.ebay.search_graded(&variant).await
        })
        .await;
        aggregate(&candidates, SourceId::Ebay)
    }
}

/// Assembles the flat report from the per-market figures. Pure; all the
/// I/O happens before this point.
fn build_report(
    identity: &CardIdentity,
    domestic: &AggregatedPrice,
    export: &ReconciledPrices,
    config: &Config,
    ebay: &EbayClient,
) -> AnalyzeReport {
    let fee_rate = config.export_fee_rate();
    let rate = config.usd_jpy_rate;
    let shipping = config.export_shipping_jpy;

    let jp = domestic_channel(domestic.amount.floor() as i64);

    let ungraded_gross_jpy = usd_to_jpy(export.ungraded.amount, rate);
    let ungraded = export_channel(ungraded_gross_jpy, fee_rate, shipping);

    let graded_gross_jpy = usd_to_jpy(export.graded_top.amount, rate);
    let graded = export_channel(graded_gross_jpy, fee_rate, shipping);

    let already_graded_top = identity.is_graded_top();
    let rec = recommend(jp.net, ungraded.net, already_graded_top);

    let psa10_profit = if jp.net > 0 && graded.net > 0 {
        graded.net - jp.net
    } else {
        0
    };

    AnalyzeReport {
        card_name: identity.name.clone(),
        card_number: identity.number.clone(),
        jp_name: identity.local_name.clone(),
        rarity: identity.rarity.clone(),
        is_japanese: identity.is_japanese,
        is_slab: identity.is_slab,
        grade: identity.grade,

        jp_price: jp.gross,
        jp_net_income: jp.net,
        jp_sample_count: domestic.sample_count,

        us_price: ungraded.gross,
        us_price_usd: export.ungraded.amount,
        us_price_source: export.ungraded.source.to_string(),
        us_sample_count: export.ungraded.sample_count,
        ebay_net_income: ungraded.net,
        ebay_fees: ungraded.fees,
        ebay_shipping_cost: ungraded.shipping,
        ebay_search_url: ebay.affiliate_search_url(&export_ungraded_query(identity)),

        psa10_price: graded.gross,
        psa10_price_usd: export.graded_top.amount,
        psa10_net_income: graded.net,
        psa10_ebay_fees: graded.fees,
        is_psa10_estimated: export.graded_top.estimated,

        profit: rec.profit,
        psa10_profit,
        profit_comparison: rec.comparison,
        recommendation: rec.label.text().to_string(),
        rec_color: rec.severity.color().to_string(),

        is_valid: jp.gross > 0 || ungraded.gross > 0,
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

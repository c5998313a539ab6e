//! Card Arbitrage - trading card price discovery
//!
//! Identifies a trading card from a photo, collects domestic buylist and
//! overseas marketplace prices, and recommends whether to sell at home
//! or export.

pub mod candidate;
pub mod config;
pub mod economics;
pub mod entitlement;
pub mod error;
pub mod fallback;
pub mod identity;
pub mod pipeline;
pub mod query;
pub mod rate_limit;
pub mod recommend;
pub mod reconcile;
pub mod sources;
pub mod web;

// Re-export commonly used items
pub use candidate::{aggregate, AggregatedPrice, ConditionTier, PriceCandidate, SourceId};
pub use config::{Config, MAX_PRICE};
pub use error::{AnalyzeError, Result};
pub use identity::CardIdentity;
pub use pipeline::{AnalyzeReport, Pipeline};
pub use recommend::{recommend, Recommendation};

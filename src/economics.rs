//! Marketplace economics: currency conversion, fees, net proceeds.
//!
//! All monetary truncation uses floor, never round, and the exchange
//! rate is a fixed configured value; output parity depends on both.

use serde::Serialize;

/// Per-channel economics. Amounts are JPY.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelEconomics {
    pub gross: i64,
    pub fees: i64,
    pub shipping: i64,
    pub net: i64,
}

impl ChannelEconomics {
    pub fn zero() -> Self {
        Self {
            gross: 0,
            fees: 0,
            shipping: 0,
            net: 0,
        }
    }
}

/// Converts a USD amount to JPY at the fixed rate, flooring.
pub fn usd_to_jpy(usd: f64, rate: f64) -> i64 {
    (usd * rate).floor() as i64
}

/// Export-channel proceeds: `net = gross - floor(gross * fee_rate) -
/// shipping`. A channel without data (gross 0) stays all-zero rather
/// than going negative on shipping.
pub fn export_channel(gross_jpy: i64, fee_rate: f64, shipping_jpy: i64) -> ChannelEconomics {
    if gross_jpy <= 0 {
        return ChannelEconomics::zero();
    }
    let fees = (gross_jpy as f64 * fee_rate).floor() as i64;
    ChannelEconomics {
        gross: gross_jpy,
        fees,
        shipping: shipping_jpy,
        net: gross_jpy - fees - shipping_jpy,
    }
}

/// Domestic buylist proceeds: the quoted buy price is already net, no
/// explicit fee or shipping.
pub fn domestic_channel(gross_jpy: i64) -> ChannelEconomics {
    if gross_jpy <= 0 {
        return ChannelEconomics::zero();
    }
    ChannelEconomics {
        gross: gross_jpy,
        fees: 0,
        shipping: 0,
        net: gross_jpy,
    }
}

use serde::Deserialize;

use crate::core::wire::{RawNumU64, from_raw_u64};

use super::model::OptionContract;

/* ---------------- Minimal serde mapping for v7 options ---------------- */

#[derive(Deserialize)]
pub(crate) struct OptEnvelope {
    #[serde(rename = "optionChain")]
    pub(crate) option_chain: Option<OptChainNode>,
}

#[derive(Deserialize)]
pub(crate) struct OptChainNode {
    pub(crate) result: Option<Vec<OptResultNode>>,
    pub(crate) error: Option<OptErrorNode>,
}

#[derive(Deserialize)]
pub(crate) struct OptErrorNode {
    pub(crate) description: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct OptResultNode {
    #[serde(rename = "expirationDates")]
    pub(crate) expiration_dates: Option<Vec<i64>>,
    pub(crate) options: Option<Vec<OptByDateNode>>,
}

#[derive(Deserialize)]
pub(crate) struct OptByDateNode {
    pub(crate) calls: Option<Vec<OptContractNode>>,
    pub(crate) puts: Option<Vec<OptContractNode>>,
}

#[derive(Deserialize)]
pub(crate) struct OptContractNode {
    #[serde(rename = "contractSymbol")]
    pub(crate) contract_symbol: Option<String>,
    pub(crate) strike: Option<f64>,
    #[serde(rename = "lastPrice")]
    pub(crate) last_price: Option<f64>,
    pub(crate) bid: Option<f64>,
    pub(crate) ask: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub(crate) volume: Option<u64>,
    #[serde(rename = "openInterest", default, deserialize_with = "lenient_count")]
    pub(crate) open_interest: Option<u64>,
    #[serde(rename = "impliedVolatility")]
    pub(crate) implied_volatility: Option<f64>,
    #[serde(rename = "inTheMoney")]
    pub(crate) in_the_money: Option<bool>,
}

/// Counts arrive either bare or wrapped as `{raw, fmt}` depending on `formatted=`.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Bare(u64),
        Wrapped(RawNumU64),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Bare(n)) => Some(n),
        Some(Count::Wrapped(w)) => from_raw_u64(Some(w)),
        None => None,
    })
}

impl From<OptContractNode> for OptionContract {
    fn from(c: OptContractNode) -> Self {
        Self {
            contract_symbol: c.contract_symbol.unwrap_or_default(),
            strike: c.strike.unwrap_or(0.0),
            last_price: c.last_price,
            bid: c.bid,
            ask: c.ask,
            volume: c.volume,
            open_interest: c.open_interest,
            implied_volatility: c.implied_volatility,
            in_the_money: c.in_the_money.unwrap_or(false),
        }
    }
}

use crate::core::wire::{from_raw, from_raw_date, from_raw_u64};
use crate::core::{ProviderError, YahooProvider, quotesummary};

use super::model::{Holder, Holders, InsiderTransaction};
use super::wire::{OwnershipNode, V10Result};

fn map_ownership_list(node: Option<OwnershipNode>) -> Vec<Holder> {
    node.and_then(|n| n.ownership_list)
        .unwrap_or_default()
        .into_iter()
        .map(|h| Holder {
            organization: h.organization.unwrap_or_default(),
            shares: from_raw_u64(h.shares),
            value: from_raw_u64(h.value),
            pct_held: from_raw(h.pct_held),
            date_reported: from_raw_date(h.date_reported),
        })
        .collect()
}

pub(crate) async fn holders(client: &YahooProvider, symbol: &str) -> Result<Holders, ProviderError> {
    let root: V10Result = quotesummary::fetch_module_result(
        client,
        symbol,
        "institutionOwnership,fundOwnership",
        "holders",
    )
    .await?;

    Ok(Holders {
        institutional: map_ownership_list(root.institution_ownership),
        mutual_fund: map_ownership_list(root.fund_ownership),
    })
}

pub(crate) async fn insider_transactions(
    client: &YahooProvider,
    symbol: &str,
) -> Result<Vec<InsiderTransaction>, ProviderError> {
    let root: V10Result =
        quotesummary::fetch_module_result(client, symbol, "insiderTransactions", "holders").await?;

    Ok(root
        .insider_transactions
        .and_then(|n| n.transactions)
        .unwrap_or_default()
        .into_iter()
        .map(|t| InsiderTransaction {
            insider: t.insider.unwrap_or_default(),
            position: t.position,
            transaction: t.transaction,
            shares: from_raw_u64(t.shares),
            value: from_raw_u64(t.value),
            start_date: from_raw_date(t.start_date),
            url: t.url.filter(|u| !u.is_empty()),
        })
        .collect())
}

use chrono::DateTime;

use crate::core::{ProviderError, YahooProvider, quotesummary};

use super::model::{RecommendationRow, UpgradeDowngradeRow};
use super::wire::V10Result;

fn count(n: Option<i64>) -> u32 {
    n.and_then(|v| u32::try_from(v).ok()).unwrap_or(0)
}

pub(crate) async fn recommendations(
    client: &YahooProvider,
    symbol: &str,
) -> Result<Vec<RecommendationRow>, ProviderError> {
    let root: V10Result =
        quotesummary::fetch_module_result(client, symbol, "recommendationTrend", "analysis")
            .await?;

    let trend = root
        .recommendation_trend
        .and_then(|x| x.trend)
        .unwrap_or_default();

    Ok(trend
        .into_iter()
        .map(|n| RecommendationRow {
            period: n.period.unwrap_or_default(),
            strong_buy: count(n.strong_buy),
            buy: count(n.buy),
            hold: count(n.hold),
            sell: count(n.sell),
            strong_sell: count(n.strong_sell),
        })
        .collect())
}

/// Rating changes in provider order. Entries without a usable timestamp are dropped.
pub(crate) async fn upgrades_downgrades(
    client: &YahooProvider,
    symbol: &str,
) -> Result<Vec<UpgradeDowngradeRow>, ProviderError> {
    let root: V10Result =
        quotesummary::fetch_module_result(client, symbol, "upgradeDowngradeHistory", "analysis")
            .await?;

    let hist = root
        .upgrade_downgrade_history
        .and_then(|x| x.history)
        .unwrap_or_default();

    Ok(hist
        .into_iter()
        .filter_map(|h| {
            let ts = DateTime::from_timestamp(h.epoch_grade_date?, 0)?;
            Some(UpgradeDowngradeRow {
                ts,
                firm: h.firm,
                to_grade: h.to_grade,
                from_grade: h.from_grade,
                action: h.action.or(h.grade_change),
            })
        })
        .collect())
}

use chrono::DateTime;

use crate::core::{ProviderError, YahooProvider};

use super::model::{Candle, Period};
use super::wire::{ChartEnvelope, QuoteBlock};

/// Daily bars over `period`. Rows with any missing OHLC value are skipped.
pub(crate) async fn daily_bars(
    client: &YahooProvider,
    symbol: &str,
    period: Period,
) -> Result<Vec<Candle>, ProviderError> {
    let mut url = client.base_chart().join(symbol)?;
    url.query_pairs_mut()
        .append_pair("range", period.as_str())
        .append_pair("interval", "1d")
        .append_pair("includePrePost", "false");

    let body = client.get_text(&url).await?;
    let env: ChartEnvelope = serde_json::from_str(&body)
        .map_err(|e| ProviderError::Data(format!("chart json parse: {e}")))?;

    let chart = env
        .chart
        .ok_or_else(|| ProviderError::Data("missing chart".into()))?;

    if let Some(e) = chart.error {
        return Err(ProviderError::Data(format!("yahoo error: {} - {}", e.code, e.description)));
    }

    let Some(result) = chart.result.and_then(|mut v| v.pop()) else {
        return Ok(Vec::new());
    };

    let ts = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };
    let adj = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    Ok(assemble_candles(&ts, &quote, &adj))
}

pub(crate) fn assemble_candles(ts: &[i64], q: &QuoteBlock, adj: &[Option<f64>]) -> Vec<Candle> {
    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    ts.iter()
        .enumerate()
        .filter_map(|(i, &t)| {
            Some(Candle {
                ts: DateTime::from_timestamp(t, 0)?,
                open: at(&q.open, i)?,
                high: at(&q.high, i)?,
                low: at(&q.low, i)?,
                close: at(&q.close, i)?,
                adj_close: at(adj, i),
                volume: q.volume.get(i).copied().flatten(),
            })
        })
        .collect()
}

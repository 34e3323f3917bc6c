//! Yahoo v7 options endpoint.

use url::Url;

use crate::core::client::YahooProvider;
use crate::core::error::ProviderError;

use super::model::{ExpirationDate, OptionChain, OptionContract};
use super::wire::{OptContractNode, OptEnvelope, OptResultNode};

/* ---------------- Public: expirations + chain ---------------- */

pub(crate) async fn expiration_dates(
    client: &YahooProvider,
    symbol: &str,
) -> Result<Vec<ExpirationDate>, ProviderError> {
    let first = fetch_result(client, symbol, None).await?;
    first
        .expiration_dates
        .unwrap_or_default()
        .into_iter()
        .map(|ts| {
            ExpirationDate::from_epoch(ts)
                .ok_or_else(|| ProviderError::Data(format!("expiration timestamp out of range: {ts}")))
        })
        .collect()
}

pub(crate) async fn option_chain(
    client: &YahooProvider,
    symbol: &str,
    expiration: ExpirationDate,
) -> Result<OptionChain, ProviderError> {
    let first = fetch_result(client, symbol, Some(expiration.to_epoch())).await?;

    let Some(od) = first.options.and_then(|mut v| v.pop()) else {
        return Ok(OptionChain::default());
    };

    let map_side = |side: Option<Vec<OptContractNode>>| -> Vec<OptionContract> {
        side.unwrap_or_default().into_iter().map(Into::into).collect()
    };

    Ok(OptionChain {
        calls: map_side(od.calls),
        puts: map_side(od.puts),
    })
}

async fn fetch_result(
    client: &YahooProvider,
    symbol: &str,
    date: Option<i64>,
) -> Result<OptResultNode, ProviderError> {
    let body = fetch_options_raw(client, symbol, date).await?;
    let env: OptEnvelope = serde_json::from_str(&body)
        .map_err(|e| ProviderError::Data(format!("options json parse: {e}")))?;

    let chain = env
        .option_chain
        .ok_or_else(|| ProviderError::Data("missing optionChain".into()))?;

    if let Some(desc) = chain.error.and_then(|e| e.description) {
        return Err(ProviderError::Data(format!("yahoo error: {desc}")));
    }

    chain
        .result
        .and_then(|mut v| v.pop())
        .ok_or_else(|| ProviderError::Data("empty options result".into()))
}

/* ---------------- Internal: raw fetch with auth fallback ---------------- */

fn options_url(
    client: &YahooProvider,
    symbol: &str,
    date: Option<i64>,
    crumb: Option<&str>,
) -> Result<Url, ProviderError> {
    let mut url = client.base_options_v7().join(symbol)?;
    {
        let mut qp = url.query_pairs_mut();
        if let Some(d) = date {
            qp.append_pair("date", &d.to_string());
        }
        if let Some(c) = crumb {
            qp.append_pair("crumb", c);
        }
    }
    Ok(url)
}

async fn fetch_options_raw(
    client: &YahooProvider,
    symbol: &str,
    date: Option<i64>,
) -> Result<String, ProviderError> {
    let url = options_url(client, symbol, date, None)?;
    let resp = client.send(&url).await?;

    if resp.status().is_success() {
        return Ok(resp.text().await?);
    }

    let code = resp.status().as_u16();
    if code != 401 && code != 403 {
        return Err(ProviderError::Status {
            status: code,
            url: url.to_string(),
        });
    }

    tracing::debug!(symbol, code, "options request unauthorized; retrying with crumb");
    client.ensure_credentials().await?;
    let crumb = client.crumb().await.ok_or_else(|| ProviderError::Status {
        status: code,
        url: url.to_string(),
    })?;

    let url2 = options_url(client, symbol, date, Some(&crumb))?;
    client.get_text(&url2).await
}

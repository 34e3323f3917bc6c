use serde::Deserialize;

use crate::core::client::YahooProvider;
use crate::core::error::ProviderError;

#[derive(Deserialize)]
pub(crate) struct V10Envelope {
    #[serde(rename = "quoteSummary")]
    pub(crate) quote_summary: Option<V10QuoteSummary>,
}

#[derive(Deserialize)]
pub(crate) struct V10QuoteSummary {
    pub(crate) result: Option<Vec<serde_json::Value>>,
    pub(crate) error: Option<V10Error>,
}

#[derive(Deserialize)]
pub(crate) struct V10Error {
    pub(crate) description: String,
}

async fn attempt_fetch(
    client: &YahooProvider,
    symbol: &str,
    modules: &str,
) -> Result<V10Envelope, ProviderError> {
    client.ensure_credentials().await?;

    let crumb = client
        .crumb()
        .await
        .ok_or_else(|| ProviderError::Auth("crumb is not set".into()))?;

    let mut url = client.base_quote_api().join(symbol)?;
    url.query_pairs_mut()
        .append_pair("modules", modules)
        .append_pair("crumb", &crumb);

    let text = client.get_text(&url).await?;
    serde_json::from_str(&text)
        .map_err(|e| ProviderError::Data(format!("quoteSummary json parse: {e}")))
}

/// Fetch `modules` for `symbol`, refreshing the crumb once if Yahoo rejects it.
pub(crate) async fn fetch(
    client: &YahooProvider,
    symbol: &str,
    modules: &str,
    caller: &str,
) -> Result<V10Envelope, ProviderError> {
    for attempt in 0..=1 {
        let env = attempt_fetch(client, symbol, modules).await?;

        if let Some(error) = env.quote_summary.as_ref().and_then(|qs| qs.error.as_ref()) {
            let desc = error.description.to_ascii_lowercase();
            if desc.contains("invalid crumb") && attempt == 0 {
                tracing::debug!(caller, "invalid crumb; refreshing and retrying");
                client.clear_crumb().await;
                continue;
            }
            return Err(ProviderError::Data(format!("yahoo error: {}", error.description)));
        }

        return Ok(env);
    }

    Err(ProviderError::Data(format!("{caller} API call failed after crumb refresh")))
}

/// The first `result` object, untyped.
pub(crate) async fn fetch_result_value(
    client: &YahooProvider,
    symbol: &str,
    modules: &str,
    caller: &str,
) -> Result<serde_json::Value, ProviderError> {
    fetch(client, symbol, modules, caller)
        .await?
        .quote_summary
        .and_then(|qs| qs.result)
        .and_then(|mut v| v.pop())
        .ok_or_else(|| ProviderError::Data("empty quoteSummary result".into()))
}

pub(crate) async fn fetch_module_result<T>(
    client: &YahooProvider,
    symbol: &str,
    modules: &str,
    caller: &str,
) -> Result<T, ProviderError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let result_val = fetch_result_value(client, symbol, modules, caller).await?;
    serde_json::from_value(result_val)
        .map_err(|e| ProviderError::Data(format!("quoteSummary result parse: {e}")))
}

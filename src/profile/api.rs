//! quoteSummary modules merged into one flat [`Info`] map.

use serde_json::Value;

use crate::core::wire::unwrap_raw;
use crate::core::{ProviderError, YahooProvider, quotesummary};

use super::model::Info;

const MODULES: &str = "assetProfile,summaryDetail,defaultKeyStatistics,financialData,price,quoteType";

pub(crate) async fn info(client: &YahooProvider, symbol: &str) -> Result<Info, ProviderError> {
    let result = quotesummary::fetch_result_value(client, symbol, MODULES, "info").await?;
    Ok(merge_modules(result))
}

/// Later modules win on key clashes, in the order Yahoo lists them.
fn merge_modules(result: Value) -> Info {
    let mut info = Info::new();
    let Value::Object(modules) = result else {
        return info;
    };

    for (_, module) in modules {
        let Value::Object(fields) = module else {
            continue;
        };
        for (key, value) in fields {
            if key == "maxAge" {
                continue;
            }
            info.insert(key, unwrap_raw(value));
        }
    }
    info
}

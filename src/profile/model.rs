use std::collections::BTreeMap;

/// Flat key/value summary of a ticker, merged across the quoteSummary modules.
///
/// Keys are the provider's field names (`sector`, `marketCap`, `trailingPE`, ...). Values that
/// arrive as `{raw, fmt}` pairs are reduced to `raw`.
pub type Info = BTreeMap<String, serde_json::Value>;

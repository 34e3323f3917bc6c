use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize, Clone, Copy)]
pub(crate) struct RawNum<T> {
    pub(crate) raw: Option<T>,
}

pub(crate) fn from_raw<T>(raw: Option<RawNum<T>>) -> Option<T> {
    raw.and_then(|n| n.raw)
}

#[derive(Deserialize, Clone, Copy)]
pub(crate) struct RawDate {
    pub(crate) raw: Option<i64>,
}

pub(crate) fn from_raw_date(r: Option<RawDate>) -> Option<NaiveDate> {
    r.and_then(|d| d.raw).and_then(epoch_to_date)
}

pub(crate) fn epoch_to_date(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

/// Yahoo sends some counts as floats (`1.2E7`); accept either.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn de_u64_from_any_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AnyNumber {
        U64(u64),
        F64(f64),
    }

    match Option::<AnyNumber>::deserialize(deserializer)? {
        Some(AnyNumber::U64(u)) => Ok(Some(u)),
        Some(AnyNumber::F64(f)) if f.fract() == 0.0 && f >= 0.0 => Ok(Some(f as u64)),
        Some(AnyNumber::F64(f)) => Err(serde::de::Error::custom(format!(
            "cannot convert float {f} to u64"
        ))),
        None => Ok(None),
    }
}

#[derive(Deserialize, Clone, Copy)]
pub(crate) struct RawNumU64 {
    #[serde(default, deserialize_with = "de_u64_from_any_number")]
    pub(crate) raw: Option<u64>,
}

pub(crate) fn from_raw_u64(r: Option<RawNumU64>) -> Option<u64> {
    r.and_then(|n| n.raw)
}

/// Collapse a `{ "raw": .., "fmt": .. }` object to its `raw` value. An empty object
/// (Yahoo's "no value") becomes `null`; anything else is returned unchanged.
pub(crate) fn unwrap_raw(v: Value) -> Value {
    match v {
        Value::Object(mut m) if m.contains_key("raw") => m.remove("raw").unwrap_or(Value::Null),
        Value::Object(m) if m.is_empty() => Value::Null,
        other => other,
    }
}

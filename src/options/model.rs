use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar date of an options expiration, always written as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExpirationDate(NaiveDate);

/// Text that is not a `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatError(pub String);

impl fmt::Display for DateFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a YYYY-MM-DD date", self.0)
    }
}

impl std::error::Error for DateFormatError {}

impl ExpirationDate {
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// The UTC calendar date of a unix timestamp, as Yahoo reports expirations.
    pub fn from_epoch(secs: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| Self(dt.date_naive()))
    }

    /// Unix timestamp of midnight UTC on this date.
    pub fn to_epoch(self) -> i64 {
        self.0.and_hms_opt(0, 0, 0).map_or(0, |dt| dt.and_utc().timestamp())
    }
}

impl FromStr for ExpirationDate {
    type Err = DateFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Exactly four-two-two digits; chrono alone accepts signs, spaces and unpadded fields.
        if !has_date_shape(s) {
            return Err(DateFormatError(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| DateFormatError(s.to_string()))
    }
}

fn has_date_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, &c)| match i {
            4 | 7 => c == b'-',
            _ => c.is_ascii_digit(),
        })
}

impl TryFrom<String> for ExpirationDate {
    type Error = DateFormatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ExpirationDate> for String {
    fn from(d: ExpirationDate) -> Self {
        d.to_string()
    }
}

impl fmt::Display for ExpirationDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// One-letter code (`C` / `P`).
    pub const fn code(self) -> &'static str {
        match self {
            Self::Call => "C",
            Self::Put => "P",
        }
    }
}

impl FromStr for OptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "call" | "calls" => Ok(Self::Call),
            "p" | "put" | "puts" => Ok(Self::Put),
            other => Err(format!("invalid option type '{other}'. Use C or P")),
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single contract as the provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub contract_symbol: String,
    pub strike: f64,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
    pub in_the_money: bool,
}

/// Both sides of the chain for one expiration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

impl OptionChain {
    /// Rows for one side (or calls then puts), each tagged with `expiration`.
    pub fn into_rows(self, expiration: ExpirationDate, kind: Option<OptionKind>) -> Vec<OptionRow> {
        let tag = |side: Vec<OptionContract>, k: OptionKind| {
            side.into_iter()
                .map(move |c| OptionRow::new(c, k, expiration))
        };
        match kind {
            Some(OptionKind::Call) => tag(self.calls, OptionKind::Call).collect(),
            Some(OptionKind::Put) => tag(self.puts, OptionKind::Put).collect(),
            None => tag(self.calls, OptionKind::Call)
                .chain(tag(self.puts, OptionKind::Put))
                .collect(),
        }
    }
}

/// One contract tagged with its side and expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRow {
    pub expiration: ExpirationDate,
    pub kind: OptionKind,
    pub contract_symbol: String,
    pub strike: f64,
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
    pub in_the_money: bool,
}

impl OptionRow {
    pub fn new(c: OptionContract, kind: OptionKind, expiration: ExpirationDate) -> Self {
        Self {
            expiration,
            kind,
            contract_symbol: c.contract_symbol,
            strike: c.strike,
            last_price: c.last_price,
            bid: c.bid,
            ask: c.ask,
            volume: c.volume,
            open_interest: c.open_interest,
            implied_volatility: c.implied_volatility,
            in_the_money: c.in_the_money,
        }
    }
}

/// Result of fetching one expiration. A failure never affects other expirations.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success {
        expiration: ExpirationDate,
        rows: Vec<OptionRow>,
    },
    Failure {
        expiration: ExpirationDate,
        reason: String,
    },
}

impl FetchOutcome {
    pub const fn expiration(&self) -> ExpirationDate {
        match self {
            Self::Success { expiration, .. } | Self::Failure { expiration, .. } => *expiration,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Optional constraints for [`Desk::filtered_options`](crate::Desk::filtered_options).
///
/// Dates are kept as caller text so malformed input can be rejected before any request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub strike_lower: Option<f64>,
    pub strike_upper: Option<f64>,
    pub kind: Option<OptionKind>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest expiration to include (`YYYY-MM-DD`, inclusive).
    #[must_use]
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Latest expiration to include (`YYYY-MM-DD`, inclusive).
    #[must_use]
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    #[must_use]
    pub fn strike_lower(mut self, strike: f64) -> Self {
        self.strike_lower = Some(strike);
        self
    }

    #[must_use]
    pub fn strike_upper(mut self, strike: f64) -> Self {
        self.strike_upper = Some(strike);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: OptionKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

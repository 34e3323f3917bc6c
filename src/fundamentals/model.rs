use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upcoming earnings and dividend events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub earnings_dates: Vec<NaiveDate>,
    pub earnings_high: Option<f64>,
    pub earnings_low: Option<f64>,
    pub earnings_average: Option<f64>,
    pub revenue_high: Option<f64>,
    pub revenue_low: Option<f64>,
    pub revenue_average: Option<f64>,
    pub ex_dividend_date: Option<NaiveDate>,
    pub dividend_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    #[default]
    Income,
    Balance,
    Cash,
}

impl StatementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Balance => "balance",
            Self::Cash => "cash",
        }
    }
}

impl FromStr for StatementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "balance" => Ok(Self::Balance),
            "cash" => Ok(Self::Cash),
            other => Err(format!("invalid statement type '{other}'")),
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Annual,
    #[default]
    Quarterly,
}

impl Frequency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "annual" => Ok(Self::Annual),
            "quarterly" => Ok(Self::Quarterly),
            other => Err(format!("invalid frequency '{other}'")),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reporting period of a financial statement: every numeric line item keyed by the
/// provider's field name (e.g. `totalRevenue`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub period_end: NaiveDate,
    pub items: BTreeMap<String, f64>,
}

/// Reported vs. estimated EPS for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsRow {
    pub quarter: Option<NaiveDate>,
    pub period: Option<String>,
    pub eps_actual: Option<f64>,
    pub eps_estimate: Option<f64>,
    pub eps_difference: Option<f64>,
    pub surprise_percent: Option<f64>,
}

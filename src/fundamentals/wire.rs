use serde::Deserialize;

use crate::core::wire::{RawDate, RawNum};

/* ---------------- Serde mapping (only what we need) ---------------- */

#[derive(Deserialize)]
pub(crate) struct V10Result {
    #[serde(rename = "calendarEvents")]
    pub(crate) calendar_events: Option<CalendarEventsNode>,

    #[serde(rename = "earningsHistory")]
    pub(crate) earnings_history: Option<EarningsHistoryNode>,
}

/* --- calendar --- */
#[derive(Deserialize)]
pub(crate) struct CalendarEventsNode {
    pub(crate) earnings: Option<CalendarEarningsNode>,
    #[serde(rename = "exDividendDate")]
    pub(crate) ex_dividend_date: Option<RawDate>,
    #[serde(rename = "dividendDate")]
    pub(crate) dividend_date: Option<RawDate>,
}

#[derive(Deserialize)]
pub(crate) struct CalendarEarningsNode {
    #[serde(rename = "earningsDate")]
    pub(crate) earnings_date: Option<Vec<RawDate>>,
    #[serde(rename = "earningsHigh")]
    pub(crate) earnings_high: Option<RawNum<f64>>,
    #[serde(rename = "earningsLow")]
    pub(crate) earnings_low: Option<RawNum<f64>>,
    #[serde(rename = "earningsAverage")]
    pub(crate) earnings_average: Option<RawNum<f64>>,
    #[serde(rename = "revenueHigh")]
    pub(crate) revenue_high: Option<RawNum<f64>>,
    #[serde(rename = "revenueLow")]
    pub(crate) revenue_low: Option<RawNum<f64>>,
    #[serde(rename = "revenueAverage")]
    pub(crate) revenue_average: Option<RawNum<f64>>,
}

/* --- earnings history --- */
#[derive(Deserialize)]
pub(crate) struct EarningsHistoryNode {
    pub(crate) history: Option<Vec<EarningsHistoryItemNode>>,
}

#[derive(Deserialize)]
pub(crate) struct EarningsHistoryItemNode {
    pub(crate) quarter: Option<RawDate>,
    pub(crate) period: Option<String>,
    #[serde(rename = "epsActual")]
    pub(crate) eps_actual: Option<RawNum<f64>>,
    #[serde(rename = "epsEstimate")]
    pub(crate) eps_estimate: Option<RawNum<f64>>,
    #[serde(rename = "epsDifference")]
    pub(crate) eps_difference: Option<RawNum<f64>>,
    #[serde(rename = "surprisePercent")]
    pub(crate) surprise_percent: Option<RawNum<f64>>,
}

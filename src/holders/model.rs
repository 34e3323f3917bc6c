use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An institution or fund holding the security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    pub organization: String,
    pub shares: Option<u64>,
    pub value: Option<u64>,
    pub pct_held: Option<f64>,
    pub date_reported: Option<NaiveDate>,
}

/// Top institutional and mutual-fund holders, as reported together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holders {
    pub institutional: Vec<Holder>,
    pub mutual_fund: Vec<Holder>,
}

/// One insider transaction filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsiderTransaction {
    pub insider: String,
    pub position: Option<String>,
    pub transaction: Option<String>,
    pub shares: Option<u64>,
    pub value: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub url: Option<String>,
}

use serde::Deserialize;

use crate::core::wire::{RawDate, RawNum, RawNumU64};

#[derive(Deserialize)]
pub(crate) struct V10Result {
    #[serde(rename = "institutionOwnership")]
    pub(crate) institution_ownership: Option<OwnershipNode>,
    #[serde(rename = "fundOwnership")]
    pub(crate) fund_ownership: Option<OwnershipNode>,
    #[serde(rename = "insiderTransactions")]
    pub(crate) insider_transactions: Option<InsiderTransactionsNode>,
}

#[derive(Deserialize)]
pub(crate) struct OwnershipNode {
    #[serde(rename = "ownershipList")]
    pub(crate) ownership_list: Option<Vec<InstitutionalHolderNode>>,
}

#[derive(Deserialize)]
pub(crate) struct InstitutionalHolderNode {
    pub(crate) organization: Option<String>,
    #[serde(rename = "position")]
    pub(crate) shares: Option<RawNumU64>,
    #[serde(rename = "reportDate")]
    pub(crate) date_reported: Option<RawDate>,
    #[serde(rename = "pctHeld")]
    pub(crate) pct_held: Option<RawNum<f64>>,
    pub(crate) value: Option<RawNumU64>,
}

#[derive(Deserialize)]
pub(crate) struct InsiderTransactionsNode {
    pub(crate) transactions: Option<Vec<InsiderTransactionNode>>,
}

#[derive(Deserialize)]
pub(crate) struct InsiderTransactionNode {
    #[serde(rename = "filerName")]
    pub(crate) insider: Option<String>,
    #[serde(rename = "filerRelation")]
    pub(crate) position: Option<String>,
    #[serde(rename = "transactionText")]
    pub(crate) transaction: Option<String>,
    pub(crate) shares: Option<RawNumU64>,
    pub(crate) value: Option<RawNumU64>,
    #[serde(rename = "startDate")]
    pub(crate) start_date: Option<RawDate>,
    #[serde(rename = "filerUrl")]
    pub(crate) url: Option<String>,
}

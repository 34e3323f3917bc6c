use serde::Deserialize;

/* ---------------- Serde mapping (only what we need) ---------------- */

#[derive(Deserialize)]
pub(crate) struct V10Result {
    #[serde(rename = "recommendationTrend")]
    pub(crate) recommendation_trend: Option<RecommendationTrendNode>,

    #[serde(rename = "upgradeDowngradeHistory")]
    pub(crate) upgrade_downgrade_history: Option<UpgradeDowngradeHistoryNode>,
}

/* --- recommendation trend --- */

#[derive(Deserialize)]
pub(crate) struct RecommendationTrendNode {
    pub(crate) trend: Option<Vec<RecommendationNode>>,
}

#[derive(Deserialize)]
pub(crate) struct RecommendationNode {
    pub(crate) period: Option<String>,

    #[serde(rename = "strongBuy")]
    pub(crate) strong_buy: Option<i64>,
    pub(crate) buy: Option<i64>,
    pub(crate) hold: Option<i64>,
    pub(crate) sell: Option<i64>,

    #[serde(rename = "strongSell")]
    pub(crate) strong_sell: Option<i64>,
}

/* --- upgrades / downgrades --- */

#[derive(Deserialize)]
pub(crate) struct UpgradeDowngradeHistoryNode {
    pub(crate) history: Option<Vec<UpgradeNode>>,
}

#[derive(Deserialize)]
pub(crate) struct UpgradeNode {
    #[serde(rename = "epochGradeDate")]
    pub(crate) epoch_grade_date: Option<i64>,

    pub(crate) firm: Option<String>,

    #[serde(rename = "toGrade")]
    pub(crate) to_grade: Option<String>,

    #[serde(rename = "fromGrade")]
    pub(crate) from_grade: Option<String>,

    pub(crate) action: Option<String>,
    #[serde(rename = "gradeChange")]
    pub(crate) grade_change: Option<String>,
}

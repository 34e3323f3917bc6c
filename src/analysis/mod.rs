//! Analyst coverage: recommendation trend and rating changes.

pub(crate) mod api;
mod model;
mod wire;

pub use model::{RecommendationRow, UpgradeDowngradeRow};

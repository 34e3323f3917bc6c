//! Ticker summary information.

pub(crate) mod api;
mod model;

pub use model::Info;

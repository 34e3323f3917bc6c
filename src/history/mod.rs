//! Daily price history from the chart endpoint.

pub(crate) mod api;
mod model;
mod wire;

pub use model::{Candle, Period};

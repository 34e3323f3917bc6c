//! Institutional, mutual-fund and insider ownership.

pub(crate) mod api;
mod model;
mod wire;

pub use model::{Holder, Holders, InsiderTransaction};

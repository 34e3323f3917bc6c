//! Calendar events, financial statements and earnings history.

pub(crate) mod api;
mod model;
mod wire;

pub use model::{Calendar, EarningsRow, Frequency, StatementKind, StatementRow};

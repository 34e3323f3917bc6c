//! Strike filtering and deterministic ordering of merged option rows.

use std::cmp::Reverse;

use super::model::OptionRow;

/// Keep rows with `strike_lower <= strike <= strike_upper` (each bound optional), then
/// stable-sort by open interest and volume, both descending. Missing counts sort as zero.
pub fn filter_and_sort(
    rows: Vec<OptionRow>,
    strike_lower: Option<f64>,
    strike_upper: Option<f64>,
) -> Vec<OptionRow> {
    let mut kept: Vec<OptionRow> = rows
        .into_iter()
        .filter(|r| strike_lower.is_none_or(|lo| r.strike >= lo))
        .filter(|r| strike_upper.is_none_or(|hi| r.strike <= hi))
        .collect();

    kept.sort_by_key(|r| {
        (
            Reverse(r.open_interest.unwrap_or(0)),
            Reverse(r.volume.unwrap_or(0)),
        )
    });
    kept
}

//! Expiration selection by inclusive date range.

use crate::core::DeskError;

use super::model::ExpirationDate;

/// Inclusive, independently optional bounds on expiration dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<ExpirationDate>,
    pub end: Option<ExpirationDate>,
}

impl DateRange {
    /// Parse caller-supplied bounds.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Validation`] if either bound is present but not `YYYY-MM-DD`.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, DeskError> {
        Ok(Self {
            start: parse_bound("start_date", start)?,
            end: parse_bound("end_date", end)?,
        })
    }

    pub fn contains(&self, date: ExpirationDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    /// Dates inside the range, in the order given.
    pub fn select(&self, available: &[ExpirationDate]) -> Vec<ExpirationDate> {
        available
            .iter()
            .copied()
            .filter(|d| self.contains(*d))
            .collect()
    }
}

fn parse_bound(field: &str, text: Option<&str>) -> Result<Option<ExpirationDate>, DeskError> {
    text.map(|t| {
        t.parse()
            .map_err(|_| DeskError::Validation(format!("Invalid {field} format. Use YYYY-MM-DD")))
    })
    .transpose()
}

/// Validate `start`/`end` and return the matching subset of `available`, order preserved.
///
/// An empty result is not an error here; the caller decides how to report it.
///
/// # Errors
///
/// Returns [`DeskError::Validation`] for a malformed bound.
pub fn select(
    available: &[ExpirationDate],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<ExpirationDate>, DeskError> {
    Ok(DateRange::parse(start, end)?.select(available))
}

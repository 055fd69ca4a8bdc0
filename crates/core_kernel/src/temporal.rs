//! Calendar date ranges
//!
//! Travel periods are date-only and both ends are inclusive: a trip that
//! leaves and returns on the same day still spans one day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod {
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// An inclusive range of calendar dates
///
/// `DateRange::new` enforces `start <= end`. The fields stay public so that
/// persisted or deserialised ranges can be re-checked with [`DateRange::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// A range covering a single day
    pub fn single_day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// Re-checks the ordering invariant
    pub fn validate(&self) -> Result<(), TemporalError> {
        if self.start > self.end {
            return Err(TemporalError::InvalidPeriod {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true if the two ranges share at least one day
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of calendar days covered, counting both ends
    pub fn inclusive_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inclusive_days() {
        let range = DateRange::new(date(2024, 1, 15), date(2024, 1, 17)).unwrap();
        assert_eq!(range.inclusive_days(), 3);
    }

    #[test]
    fn test_single_day_counts_one() {
        assert_eq!(DateRange::single_day(date(2024, 2, 29)).inclusive_days(), 1);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = DateRange::new(date(2024, 1, 17), date(2024, 1, 15));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_overlap_on_shared_boundary_day() {
        let a = DateRange::new(date(2024, 1, 1), date(2024, 1, 10)).unwrap();
        let b = DateRange::new(date(2024, 1, 10), date(2024, 1, 20)).unwrap();
        assert!(a.overlaps(&b));
        assert!(a.contains(date(2024, 1, 10)));
        assert!(!a.contains(date(2024, 1, 11)));
    }
}

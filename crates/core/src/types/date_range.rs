//! UTC date ranges used to window analytics.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Errors constructing a [`DateRange`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// `start` is after `end`.
    #[error("date range start {start} is after end {end}")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// The requested range falls outside chrono's representable dates.
    #[error("date range is out of range")]
    OutOfRange,
}

/// A half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns [`DateRangeError::Inverted`] if `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Everything from `start` onwards.
    #[must_use]
    pub const fn since(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Everything from `months` calendar months before `now` onwards.
    ///
    /// Month arithmetic clamps to the end of shorter months, so two months
    /// before 31 December is 31 October and before 30 April is 28/29 February.
    ///
    /// # Errors
    ///
    /// Returns [`DateRangeError::OutOfRange`] if the subtraction underflows.
    pub fn last_months(now: DateTime<Utc>, months: u32) -> Result<Self, DateRangeError> {
        now.checked_sub_months(Months::new(months))
            .map(Self::since)
            .ok_or(DateRangeError::OutOfRange)
    }

    /// 1 January `year` (inclusive) to 1 January `year + 1` (exclusive).
    ///
    /// # Errors
    ///
    /// Returns [`DateRangeError::OutOfRange`] for years chrono cannot represent.
    pub fn calendar_year(year: i32) -> Result<Self, DateRangeError> {
        let start = new_year(year).ok_or(DateRangeError::OutOfRange)?;
        let end = year
            .checked_add(1)
            .and_then(new_year)
            .ok_or(DateRangeError::OutOfRange)?;
        Ok(Self { start, end })
    }

    /// The calendar year before the one containing `now`.
    ///
    /// # Errors
    ///
    /// Returns [`DateRangeError::OutOfRange`] at the edge of chrono's range.
    pub fn previous_calendar_year(now: DateTime<Utc>) -> Result<Self, DateRangeError> {
        let year = now.year().checked_sub(1).ok_or(DateRangeError::OutOfRange)?;
        Self::calendar_year(year)
    }

    /// Whether `instant` lies in `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn new_year(year: i32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted() {
        let err = DateRange::new(at(2024, 5, 1), at(2024, 4, 1)).unwrap_err();
        assert!(matches!(err, DateRangeError::Inverted { .. }));
    }

    #[test]
    fn test_half_open() {
        let range = DateRange::new(at(2024, 1, 1), at(2024, 2, 1)).unwrap();
        assert!(range.contains(at(2024, 1, 1)));
        assert!(range.contains(at(2024, 1, 31)));
        assert!(!range.contains(range.end));
    }

    #[test]
    fn test_last_two_months_clamps_month_end() {
        let range = DateRange::last_months(at(2024, 4, 30), 2).unwrap();
        assert_eq!(range.start, at(2024, 2, 29));
        assert!(range.contains(at(2024, 4, 30)));
        assert!(!range.contains(at(2024, 2, 28)));
    }

    #[test]
    fn test_last_months_is_open_ended() {
        let now = at(2024, 4, 30);
        let range = DateRange::last_months(now, 2).unwrap();
        assert_eq!(range.end, DateTime::<Utc>::MAX_UTC);
        assert!(range.contains(at(2024, 5, 2)));
    }

    #[test]
    fn test_previous_calendar_year() {
        let range = DateRange::previous_calendar_year(at(2025, 3, 14)).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert!(range.contains(at(2024, 12, 31)));
        assert!(!range.contains(at(2025, 1, 2)));
    }
}

//! Week periods and calendar days.
//!
//! A [`WeekPeriod`] is a generated 7-day span tagged with its ISO week number
//! and the calendar year of its start Monday. A [`CalendarDay`] is one
//! materialized date bound to its owning period. Both are immutable once
//! created and never deleted.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A generated week period awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWeekPeriod {
    /// ISO week-of-year (1-53).
    pub week_number: u32,
    /// Calendar year of `start_date`.
    pub year: i32,
    /// Monday the span begins on.
    pub start_date: NaiveDate,
    /// `start_date + 6 days` (Sunday).
    pub end_date: NaiveDate,
}

/// A persisted week period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPeriod {
    pub week_id: i64,
    pub week_number: u32,
    pub year: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl WeekPeriod {
    /// Whether `date` falls inside `[start_date, end_date]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// A generated calendar day awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCalendarDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// Owning [`WeekPeriod`].
    pub week_id: i64,
}

/// A persisted calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day_id: i64,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub week_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_contains_its_span_inclusive() {
        let week = WeekPeriod {
            week_id: 1,
            week_number: 10,
            year: 2025,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
        };
        assert!(week.contains(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()));
        assert!(week.contains(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()));
        assert!(!week.contains(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));
        assert!(!week.contains(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()));
    }
}

//! Week period generation.
//!
//! Week periods are generated a year at a time, one per Monday-anchored
//! 7-day span, and stop at the year boundary: the span whose start crosses
//! into the next calendar year is not emitted.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::{debug, info};

use crate::error::{Result, ValidationError};
use crate::model::NewWeekPeriod;
use crate::storage::Database;

/// Generate week periods starting at `start` (must be a Monday) until the
/// cursor leaves `start`'s calendar year.
///
/// Pure function; persistence is the caller's concern.
pub fn generate_week_periods(start: NaiveDate) -> Result<Vec<NewWeekPeriod>> {
    if start.weekday() != Weekday::Mon {
        return Err(ValidationError::NotAMonday {
            date: start,
            weekday: start.weekday(),
        }
        .into());
    }

    let year = start.year();
    let mut cursor = start;
    let mut periods = Vec::new();

    while cursor.year() == year {
        periods.push(NewWeekPeriod {
            week_number: cursor.iso_week().week(),
            year,
            start_date: cursor,
            end_date: cursor + Duration::days(6),
        });
        cursor += Duration::weeks(1);
    }

    Ok(periods)
}

/// First Monday on or after January 1st of `year`.
pub fn first_monday_of_year(year: i32) -> NaiveDate {
    let mut date = NaiveDate::from_ymd_opt(year, 1, 1).expect("January 1st is a valid date");
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

/// Extend the week-period table up to the end of `today`'s year.
///
/// Seeds from the first Monday of the year when the table is empty;
/// otherwise continues from the day after the latest period's end. Returns
/// the number of periods created (0 when the year is already covered).
pub fn extend_week_periods(db: &Database, today: NaiveDate) -> Result<usize> {
    debug!("extend_week_periods called");

    let start = match db.latest_week_period()? {
        None => {
            let start = first_monday_of_year(today.year());
            info!(%start, "no week periods found, starting from first Monday of the year");
            start
        }
        Some(latest) => {
            let next_start = latest.end_date + Duration::days(1);
            if next_start.year() != today.year() {
                info!(
                    year = latest.year,
                    end = %latest.end_date,
                    "all week periods for this year already exist"
                );
                return Ok(0);
            }
            debug!(%next_start, "continuing week periods");
            next_start
        }
    };

    let periods = generate_week_periods(start)?;
    let saved = db.insert_week_periods(&periods)?;
    if saved > 0 {
        info!(
            count = saved,
            from = %periods[0].start_date,
            to = %periods[periods.len() - 1].end_date,
            "week periods added"
        );
    }
    Ok(saved)
}

//! Calendar day generation.
//!
//! One day per date, each bound to its owning week period by
//! `(ISO week number, calendar year)`. A date whose period does not exist
//! yet is skipped: day generation never outruns period generation.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::NewCalendarDay;
use crate::storage::Database;

/// Generate one calendar day per date in `[start, today]`.
///
/// Dates with no matching week period are skipped with a warning. Returns an
/// empty list when `start` is after `today`.
pub fn generate_calendar_days(
    db: &Database,
    start: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<NewCalendarDay>> {
    let mut days = Vec::new();
    let mut cursor = start;

    while cursor <= today {
        match db.find_week_by_number_and_year(cursor.iso_week().week(), cursor.year())? {
            Some(week) => days.push(NewCalendarDay {
                date: cursor,
                weekday: cursor.weekday(),
                week_id: week.week_id,
            }),
            None => warn!(
                date = %cursor,
                week_number = cursor.iso_week().week(),
                year = cursor.year(),
                "no week period for date, skipping day"
            ),
        }
        cursor += Duration::days(1);
    }

    Ok(days)
}

/// Extend the calendar-day table up to `today`.
///
/// Starts from `today` when the table is empty, otherwise from the day after
/// the latest materialized date. Returns the number of days created.
pub fn extend_calendar_days(db: &Database, today: NaiveDate) -> Result<usize> {
    debug!("extend_calendar_days called");

    let start = match db.latest_calendar_day()? {
        None => today,
        Some(latest) if latest.date == today => {
            debug!("all calendar days already exist");
            return Ok(0);
        }
        Some(latest) if latest.date < today => latest.date + Duration::days(1),
        Some(latest) => {
            warn!(
                latest = %latest.date,
                %today,
                "latest calendar day is in the future, nothing to extend"
            );
            return Ok(0);
        }
    };

    let days = generate_calendar_days(db, start, today)?;
    if days.is_empty() {
        return Ok(0);
    }
    let saved = db.insert_calendar_days(&days)?;
    info!(count = saved, from = %start, to = %today, "calendar days added");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::weeks::extend_week_periods;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn db_with_2025_weeks() -> Database {
        let db = Database::open_memory().unwrap();
        extend_week_periods(&db, date(2025, 3, 3)).unwrap();
        db
    }

    #[test]
    fn three_day_window_binds_to_correct_weeks() {
        let db = db_with_2025_weeks();
        let days = generate_calendar_days(&db, date(2025, 3, 1), date(2025, 3, 3)).unwrap();

        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, date(2025, 3, 1));
        assert_eq!(days[0].weekday, Weekday::Sat);
        assert_eq!(days[1].date, date(2025, 3, 2));
        assert_eq!(days[2].date, date(2025, 3, 3));
        assert_eq!(days[2].weekday, Weekday::Mon);

        // 03-01/03-02 belong to the week starting 02-24; 03-03 starts week 10
        let week9 = db.find_week_by_number_and_year(9, 2025).unwrap().unwrap();
        let week10 = db.find_week_by_number_and_year(10, 2025).unwrap().unwrap();
        assert_eq!(days[0].week_id, week9.week_id);
        assert_eq!(days[1].week_id, week9.week_id);
        assert_eq!(days[2].week_id, week10.week_id);
    }

    #[test]
    fn start_after_today_yields_nothing() {
        let db = db_with_2025_weeks();
        let days = generate_calendar_days(&db, date(2025, 3, 4), date(2025, 3, 3)).unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn dates_without_periods_are_skipped() {
        let db = Database::open_memory().unwrap();
        // no week periods at all
        let days = generate_calendar_days(&db, date(2025, 3, 1), date(2025, 3, 3)).unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn extend_starts_at_today_on_empty_table() {
        let db = db_with_2025_weeks();
        let saved = extend_calendar_days(&db, date(2025, 3, 3)).unwrap();
        assert_eq!(saved, 1);
        assert!(db.find_day_by_date(date(2025, 3, 3)).unwrap().is_some());
        assert!(db.find_day_by_date(date(2025, 3, 2)).unwrap().is_none());
    }

    #[test]
    fn extend_fills_the_gap_since_last_day() {
        let db = db_with_2025_weeks();
        extend_calendar_days(&db, date(2025, 3, 3)).unwrap();

        let saved = extend_calendar_days(&db, date(2025, 3, 7)).unwrap();
        assert_eq!(saved, 4);
        let days = db
            .calendar_days_between(date(2025, 3, 3), date(2025, 3, 7))
            .unwrap();
        assert_eq!(days.len(), 5);
    }

    #[test]
    fn extend_twice_on_same_day_is_idempotent() {
        let db = db_with_2025_weeks();
        extend_calendar_days(&db, date(2025, 3, 3)).unwrap();
        let again = extend_calendar_days(&db, date(2025, 3, 3)).unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn day_within_owning_week_span() {
        let db = db_with_2025_weeks();
        extend_calendar_days(&db, date(2025, 3, 5)).unwrap();
        for day in db
            .calendar_days_between(date(2025, 3, 3), date(2025, 3, 5))
            .unwrap()
        {
            let week = db.find_week_by_id(day.week_id).unwrap().unwrap();
            assert!(week.contains(day.date));
        }
    }
}

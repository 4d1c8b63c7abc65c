//! Rate rollups: point-weighted day rates and their week aggregation.
//!
//! Both computations are no-ops when the underlying data or the target rate
//! row is missing; they only ever update rows in place.

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{CalendarDay, WeekPeriod};
use crate::storage::Database;

/// Round half-up to 2 decimals.
///
/// Rates are non-negative, so `f64::round` (half away from zero) matches
/// half-up here.
pub fn round_rate(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute and persist the point-weighted completion rate for one user and
/// one calendar day.
///
/// Returns the persisted rate, or `None` when there was nothing to aggregate
/// or no day-rate row exists for the date.
pub fn compute_day_rate(
    db: &Database,
    user_id: Uuid,
    day: &CalendarDay,
) -> Result<Option<f64>> {
    debug!(user = %user_id, date = %day.date, "compute_day_rate called");

    let completions = db.completions_for_user_and_day(user_id, day.day_id)?;
    if completions.is_empty() {
        warn!(user = %user_id, date = %day.date, "no completion facts found for day");
        return Ok(None);
    }

    let mut total_points = 0.0;
    let mut completed_points = 0.0;
    for completion in &completions {
        total_points += completion.points;
        if completion.fact.completed {
            completed_points += completion.points;
        }
    }

    let rate = if total_points == 0.0 {
        0.0
    } else {
        round_rate(completed_points / total_points)
    };

    if db.update_day_rate(user_id, day.date, rate, Utc::now())? {
        info!(user = %user_id, date = %day.date, rate, "day rate updated");
        Ok(Some(rate))
    } else {
        warn!(user = %user_id, date = %day.date, "no day-rate row for date, skipping update");
        Ok(None)
    }
}

/// Compute and persist the week rate for the period containing `date`.
///
/// The rate is the sum of the user's day rates in the period divided by
/// `100 x day-rate count`. The 100x divisor is deliberate; see DESIGN.md
/// (week-rate scaling) before changing it.
pub fn compute_week_rate(db: &Database, user_id: Uuid, date: NaiveDate) -> Result<Option<f64>> {
    debug!(user = %user_id, %date, "compute_week_rate called");

    let Some(period) = db.find_week_by_number_and_year(date.iso_week().week(), date.year())?
    else {
        warn!(%date, "no week period found for date");
        return Ok(None);
    };

    compute_week_rate_for_period(db, user_id, &period)
}

/// Compute and persist the week rate for an already resolved period.
pub fn compute_week_rate_for_period(
    db: &Database,
    user_id: Uuid,
    period: &WeekPeriod,
) -> Result<Option<f64>> {
    let day_rates = db.day_rates_for_user_in_period(user_id, period)?;
    if day_rates.is_empty() {
        warn!(
            user = %user_id,
            week = period.week_number,
            year = period.year,
            "no day rates found for week"
        );
        return Ok(None);
    }

    let sum: f64 = day_rates.iter().map(|rate| rate.rate).sum();
    let rate = round_rate(sum / (100.0 * day_rates.len() as f64));

    if db.update_week_rate(user_id, period.week_id, rate, Utc::now())? {
        info!(
            user = %user_id,
            week = period.week_number,
            year = period.year,
            rate,
            "week rate updated"
        );
        Ok(Some(rate))
    } else {
        warn!(
            user = %user_id,
            week = period.week_number,
            year = period.year,
            "no week-rate row for period, skipping update"
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{extend_calendar_days, extend_week_periods};
    use crate::materialize::{ensure_day_rate_rows, ensure_week_rate_rows, materialize_day};
    use crate::model::{Habit, NewHabitCategory, User};
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup(today: NaiveDate) -> (Database, User) {
        let db = Database::open_memory().unwrap();
        extend_week_periods(&db, today).unwrap();
        extend_calendar_days(&db, today).unwrap();
        let user = User::new("taha", None);
        db.insert_user(&user).unwrap();
        db.seed_categories(&[NewHabitCategory::new("Fitness", "move", "#FF5733")])
            .unwrap();
        (db, user)
    }

    fn add_habit(db: &Database, user: &User, title: &str, points: f64) -> Habit {
        let category = db.find_category_by_name("Fitness").unwrap().unwrap();
        let habit = Habit::new(
            user.user_id,
            title,
            points,
            true,
            None,
            category.category_id,
            vec![Weekday::Mon],
        )
        .unwrap();
        db.insert_habit(&habit).unwrap();
        habit
    }

    fn complete(db: &Database, user: &User, habit: &Habit, day_id: i64) {
        let mut fact = db
            .completions_for_user_and_day(user.user_id, day_id)
            .unwrap()
            .into_iter()
            .find(|weighted| weighted.fact.habit_id == habit.habit_id)
            .unwrap()
            .fact;
        fact.mark_complete(Utc::now());
        assert!(db.update_completion_status(&fact).unwrap());
    }

    #[test]
    fn three_of_four_points_rounds_to_075() {
        let today = date(2025, 3, 3); // Monday
        let (db, user) = setup(today);
        let three = add_habit(&db, &user, "Run", 3.0);
        add_habit(&db, &user, "Read", 1.0);
        materialize_day(&db, today).unwrap();
        ensure_day_rate_rows(&db, today).unwrap();

        let day = db.find_day_by_date(today).unwrap().unwrap();
        complete(&db, &user, &three, day.day_id);

        let rate = compute_day_rate(&db, user.user_id, &day).unwrap();
        assert_eq!(rate, Some(0.75));
        let row = db.find_day_rate(user.user_id, today).unwrap().unwrap();
        assert_eq!(row.rate, 0.75);
    }

    #[test]
    fn one_of_three_points_rounds_to_033() {
        let today = date(2025, 3, 3);
        let (db, user) = setup(today);
        add_habit(&db, &user, "Run", 2.0);
        let one = add_habit(&db, &user, "Read", 1.0);
        materialize_day(&db, today).unwrap();
        ensure_day_rate_rows(&db, today).unwrap();

        let day = db.find_day_by_date(today).unwrap().unwrap();
        complete(&db, &user, &one, day.day_id);

        let rate = compute_day_rate(&db, user.user_id, &day).unwrap();
        assert_eq!(rate, Some(0.33));
    }

    #[test]
    fn no_facts_leaves_day_rate_untouched() {
        let today = date(2025, 3, 3);
        let (db, user) = setup(today);
        ensure_day_rate_rows(&db, today).unwrap();
        db.update_day_rate(user.user_id, today, 0.42, Utc::now())
            .unwrap();

        let day = db.find_day_by_date(today).unwrap().unwrap();
        let rate = compute_day_rate(&db, user.user_id, &day).unwrap();
        assert_eq!(rate, None);

        let row = db.find_day_rate(user.user_id, today).unwrap().unwrap();
        assert_eq!(row.rate, 0.42);
    }

    #[test]
    fn missing_day_rate_row_is_not_an_error() {
        let today = date(2025, 3, 3);
        let (db, user) = setup(today);
        let habit = add_habit(&db, &user, "Run", 1.0);
        materialize_day(&db, today).unwrap();
        let day = db.find_day_by_date(today).unwrap().unwrap();
        complete(&db, &user, &habit, day.day_id);

        // no day-rate row was ever created
        let rate = compute_day_rate(&db, user.user_id, &day).unwrap();
        assert_eq!(rate, None);
    }

    #[test]
    fn week_rate_uses_the_verbatim_divisor() {
        let today = date(2025, 3, 4); // Tuesday, same week as 03-03
        let (db, user) = setup(today);
        ensure_week_rate_rows(&db, today).unwrap();

        let now = Utc::now();
        db.insert_day_rates(&[
            crate::model::DayRate::zero(user.user_id, date(2025, 3, 3), now),
            crate::model::DayRate::zero(user.user_id, date(2025, 3, 4), now),
        ])
        .unwrap();
        db.update_day_rate(user.user_id, date(2025, 3, 3), 0.5, now)
            .unwrap();
        db.update_day_rate(user.user_id, date(2025, 3, 4), 1.0, now)
            .unwrap();

        // (0.5 + 1.0) / (100 * 2) = 0.0075, rounded half-up to 0.01
        let rate = compute_week_rate(&db, user.user_id, today).unwrap();
        assert_eq!(rate, Some(0.01));
    }

    #[test]
    fn week_rate_noops_without_period_or_day_rates() {
        let today = date(2025, 3, 3);
        let (db, user) = setup(today);

        // date outside any generated period (previous year)
        assert_eq!(
            compute_week_rate(&db, user.user_id, date(2024, 6, 3)).unwrap(),
            None
        );
        // period exists but the user has no day rates in it
        assert_eq!(compute_week_rate(&db, user.user_id, today).unwrap(), None);
    }

    #[test]
    fn day_rates_stay_within_unit_interval() {
        let today = date(2025, 3, 3);
        let (db, user) = setup(today);
        let habits: Vec<Habit> = [("Run", 2.0), ("Read", 1.0), ("Code", 9.5)]
            .iter()
            .map(|(title, points)| add_habit(&db, &user, title, *points))
            .collect();
        materialize_day(&db, today).unwrap();
        ensure_day_rate_rows(&db, today).unwrap();
        let day = db.find_day_by_date(today).unwrap().unwrap();

        for habit in &habits {
            complete(&db, &user, habit, day.day_id);
            let rate = compute_day_rate(&db, user.user_id, &day).unwrap().unwrap();
            assert!((0.0..=1.0).contains(&rate), "rate {rate} out of bounds");
        }
        let full = db.find_day_rate(user.user_id, today).unwrap().unwrap();
        assert_eq!(full.rate, 1.0);
    }
}

//! Completion placeholder materialization and gap backfill.
//!
//! For every day a habit is scheduled, one uncompleted placeholder fact is
//! created per `(habit, day)` pair. All creation is existence-checked, so
//! re-running after a partial failure only creates what is still missing.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::model::{CompletionFact, Habit};
use crate::storage::Database;

/// Outcome of a completion backfill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillOutcome {
    /// Facts created across the whole gap.
    pub facts_created: usize,
    /// Batch persist calls issued (a full gap is one batch).
    pub batches: usize,
    /// First date of the processed gap, when a marker existed.
    pub start: Option<NaiveDate>,
}

/// Local calendar date of a stored creation timestamp.
fn marker_date(marker: DateTime<Utc>) -> NaiveDate {
    marker.with_timezone(&Local).date_naive()
}

/// Create placeholder facts for every habit scheduled on `date`.
///
/// Missing calendar day or absent habits are recoverable no-ops. Returns the
/// number of facts created; re-invocation on the same date creates none.
pub fn materialize_day(db: &Database, date: NaiveDate) -> Result<usize> {
    debug!(%date, "materialize_day called");

    let Some(day) = db.find_day_by_date(date)? else {
        error!(%date, "materialize_day failed: no calendar day for date");
        return Ok(0);
    };

    let habits = db.habits_scheduled_on(date.weekday())?;
    if habits.is_empty() {
        warn!(%date, "materialize_day: no habits scheduled for this weekday");
        return Ok(0);
    }

    let now = Utc::now();
    let mut batch = Vec::new();
    for habit in &habits {
        if !db.completion_exists(habit.habit_id, day.day_id)? {
            batch.push(CompletionFact::placeholder(habit.habit_id, day.day_id, now));
        }
    }

    if batch.is_empty() {
        debug!(%date, "no new completion facts to add");
        return Ok(0);
    }

    let saved = db.insert_completions(&batch)?;
    info!(count = saved, %date, "completion facts added");
    Ok(saved)
}

/// Create today's placeholder for a newly created habit, without waiting for
/// the next scheduled pass.
///
/// Does nothing when the habit is not scheduled for `today`'s weekday or the
/// fact already exists.
pub fn materialize_new_habit(db: &Database, habit: &Habit, today: NaiveDate) -> Result<usize> {
    debug!(habit = %habit.habit_id, "materialize_new_habit called");

    let Some(day) = db.find_day_by_date(today)? else {
        error!(%today, "materialize_new_habit failed: no calendar day for today");
        return Ok(0);
    };

    if !habit.is_scheduled_on(today.weekday()) {
        debug!(habit = %habit.habit_id, "habit not scheduled for today");
        return Ok(0);
    }
    if db.completion_exists(habit.habit_id, day.day_id)? {
        debug!(habit = %habit.habit_id, "completion fact already exists for today");
        return Ok(0);
    }

    let fact = CompletionFact::placeholder(habit.habit_id, day.day_id, Utc::now());
    let saved = db.insert_completions(&[fact])?;
    info!(habit = %habit.habit_id, %today, "completion fact added for new habit");
    Ok(saved)
}

/// Fill every missing completion fact between the last materialized day and
/// `today`, in one batch.
///
/// The gap start is re-derived from storage (max fact creation timestamp);
/// with no marker at all this degrades to materializing `today` only.
pub fn backfill_completions(db: &Database, today: NaiveDate) -> Result<BackfillOutcome> {
    debug!("backfill_completions called");

    let Some(marker) = db.latest_completion_created_at()? else {
        warn!("no previous completion facts found, materializing today instead");
        let created = materialize_day(db, today)?;
        return Ok(BackfillOutcome {
            facts_created: created,
            batches: usize::from(created > 0),
            start: None,
        });
    };

    let start = marker_date(marker);
    if start > today {
        debug!("no missing days to process, data is up to date");
        return Ok(BackfillOutcome::default());
    }

    info!(%start, %today, "processing missing completion facts");

    let days = db.calendar_days_between(start, today)?;
    if days.is_empty() {
        warn!(%start, %today, "no calendar days found for date range");
        return Ok(BackfillOutcome {
            start: Some(start),
            ..BackfillOutcome::default()
        });
    }

    let now = Utc::now();
    let mut batch = Vec::new();
    let mut processed_days = 0;

    for day in &days {
        let habits = db.habits_scheduled_on(day.weekday)?;
        if habits.is_empty() {
            debug!(date = %day.date, "no habits scheduled");
            continue;
        }

        let mut added_for_day = 0;
        for habit in &habits {
            if !db.completion_exists(habit.habit_id, day.day_id)? {
                batch.push(CompletionFact::placeholder(habit.habit_id, day.day_id, now));
                added_for_day += 1;
            }
        }
        if added_for_day > 0 {
            processed_days += 1;
            debug!(count = added_for_day, date = %day.date, "queued completion facts");
        }
    }

    if batch.is_empty() {
        debug!("no missing completion facts found, all data is up to date");
        return Ok(BackfillOutcome {
            start: Some(start),
            ..BackfillOutcome::default()
        });
    }

    let saved = db.insert_completions(&batch)?;
    info!(
        count = saved,
        days = processed_days,
        "filled missing completion facts"
    );
    Ok(BackfillOutcome {
        facts_created: saved,
        batches: 1,
        start: Some(start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{extend_calendar_days, extend_week_periods};
    use crate::model::{NewHabitCategory, User};
    use chrono::{Duration, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A creation timestamp whose local calendar date is `date`.
    fn created_on(date: NaiveDate) -> DateTime<Utc> {
        use chrono::TimeZone;
        let noon = date.and_hms_opt(12, 0, 0).unwrap();
        Local
            .from_local_datetime(&noon)
            .single()
            .unwrap()
            .with_timezone(&Utc)
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

    fn add_habit(db: &Database, user: &User, title: &str, points: f64, days: Vec<Weekday>) -> Habit {
        let category = db.find_category_by_name("Fitness").unwrap().unwrap();
        let habit = Habit::new(
            user.user_id,
            title,
            points,
            true,
            None,
            category.category_id,
            days,
        )
        .unwrap();
        db.insert_habit(&habit).unwrap();
        habit
    }

    #[test]
    fn materialize_day_is_idempotent() {
        let today = date(2025, 3, 3); // Monday
        let (db, user) = setup(today);
        add_habit(&db, &user, "Run", 2.0, vec![Weekday::Mon]);
        add_habit(&db, &user, "Read", 1.0, vec![Weekday::Mon, Weekday::Tue]);

        assert_eq!(materialize_day(&db, today).unwrap(), 2);
        assert_eq!(materialize_day(&db, today).unwrap(), 0);

        let day = db.find_day_by_date(today).unwrap().unwrap();
        assert_eq!(
            db.completions_for_user_and_day(user.user_id, day.day_id)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn materialize_day_without_calendar_day_is_a_noop() {
        let (db, user) = setup(date(2025, 3, 3));
        add_habit(&db, &user, "Run", 1.0, vec![Weekday::Fri]);
        // 2025-03-07 has no calendar day yet
        assert_eq!(materialize_day(&db, date(2025, 3, 7)).unwrap(), 0);
    }

    #[test]
    fn materialize_day_skips_unscheduled_weekdays() {
        let today = date(2025, 3, 3); // Monday
        let (db, user) = setup(today);
        add_habit(&db, &user, "Swim", 1.0, vec![Weekday::Sat]);
        assert_eq!(materialize_day(&db, today).unwrap(), 0);
    }

    #[test]
    fn new_habit_materializes_immediately_when_scheduled_today() {
        let today = date(2025, 3, 3); // Monday
        let (db, user) = setup(today);
        let habit = add_habit(&db, &user, "Run", 1.0, vec![Weekday::Mon]);

        assert_eq!(materialize_new_habit(&db, &habit, today).unwrap(), 1);
        // second call finds the existing fact
        assert_eq!(materialize_new_habit(&db, &habit, today).unwrap(), 0);

        let other = add_habit(&db, &user, "Swim", 1.0, vec![Weekday::Sat]);
        assert_eq!(materialize_new_habit(&db, &other, today).unwrap(), 0);
    }

    #[test]
    fn backfill_without_marker_materializes_today_only() {
        let today = date(2025, 3, 3);
        let (db, user) = setup(today);
        add_habit(&db, &user, "Run", 1.0, vec![Weekday::Mon]);

        let outcome = backfill_completions(&db, today).unwrap();
        assert_eq!(outcome.facts_created, 1);
        assert_eq!(outcome.start, None);
    }

    #[test]
    fn backfill_fills_a_five_day_gap_in_one_batch() {
        let today = date(2025, 3, 8); // Saturday
        let (db, user) = setup(today);
        let habit = add_habit(
            &db,
            &user,
            "Run",
            1.0,
            vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
        );

        // seed one fact five days before "today", as if the service then
        // went offline
        let day = db.find_day_by_date(date(2025, 3, 3)).unwrap().unwrap();
        db.insert_completions(&[CompletionFact::placeholder(
            habit.habit_id,
            day.day_id,
            created_on(date(2025, 3, 3)),
        )])
        .unwrap();

        let outcome = backfill_completions(&db, today).unwrap();
        // 2025-03-04 .. 2025-03-08 were missing
        assert_eq!(outcome.facts_created, 5);
        assert_eq!(outcome.batches, 1);

        // every date in the gap now has its fact
        for offset in 0..=5 {
            let day = db
                .find_day_by_date(date(2025, 3, 3) + Duration::days(offset))
                .unwrap()
                .unwrap();
            assert_eq!(
                db.completions_for_user_and_day(user.user_id, day.day_id)
                    .unwrap()
                    .len(),
                1
            );
        }

        // immediately re-running finds nothing new
        let again = backfill_completions(&db, today).unwrap();
        assert_eq!(again.facts_created, 0);
    }
}

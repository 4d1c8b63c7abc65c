//! Property tests for the rate aggregator.
//!
//! Whatever mix of point weights and completion flags a day holds, the
//! computed day rate must stay inside the unit interval and match the
//! half-up rounded quotient.

use chrono::{NaiveDate, Utc, Weekday};
use habitual_core::calendar::{extend_calendar_days, extend_week_periods};
use habitual_core::materialize::{ensure_day_rate_rows, materialize_day};
use habitual_core::model::NewHabitCategory;
use habitual_core::rollup::compute_day_rate;
use habitual_core::{Database, Habit, User};
use proptest::prelude::*;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn day_rate_for(habits: &[(f64, bool)]) -> Option<f64> {
    let today = monday();
    let db = Database::open_memory().unwrap();
    extend_week_periods(&db, today).unwrap();
    extend_calendar_days(&db, today).unwrap();
    let user = User::new("prop", None);
    db.insert_user(&user).unwrap();
    db.seed_categories(&[NewHabitCategory::new("Fitness", "move", "#FF5733")])
        .unwrap();
    let category = db.find_category_by_name("Fitness").unwrap().unwrap();

    let mut ids = Vec::new();
    for (index, (points, _)) in habits.iter().enumerate() {
        let habit = Habit::new(
            user.user_id,
            format!("habit-{index}"),
            *points,
            true,
            None,
            category.category_id,
            vec![Weekday::Mon],
        )
        .unwrap();
        db.insert_habit(&habit).unwrap();
        ids.push(habit.habit_id);
    }

    materialize_day(&db, today).unwrap();
    ensure_day_rate_rows(&db, today).unwrap();
    let day = db.find_day_by_date(today).unwrap().unwrap();

    for (index, (_, completed)) in habits.iter().enumerate() {
        if *completed {
            let mut fact = db
                .completions_for_user_and_day(user.user_id, day.day_id)
                .unwrap()
                .into_iter()
                .find(|weighted| weighted.fact.habit_id == ids[index])
                .unwrap()
                .fact;
            fact.mark_complete(Utc::now());
            db.update_completion_status(&fact).unwrap();
        }
    }

    compute_day_rate(&db, user.user_id, &day).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn day_rate_stays_in_unit_interval(
        habits in prop::collection::vec((0.5f64..=10.0, any::<bool>()), 1..6)
    ) {
        let rate = day_rate_for(&habits).expect("rate should be computed");
        prop_assert!((0.0..=1.0).contains(&rate), "rate {rate} out of bounds");

        let total: f64 = habits.iter().map(|(points, _)| points).sum();
        let completed: f64 = habits
            .iter()
            .filter(|(_, done)| *done)
            .map(|(points, _)| points)
            .sum();
        let expected = (completed / total * 100.0).round() / 100.0;
        prop_assert!((rate - expected).abs() < 1e-9, "rate {rate} != expected {expected}");
    }

    #[test]
    fn all_completed_is_full_marks(
        points in prop::collection::vec(0.5f64..=10.0, 1..6)
    ) {
        let habits: Vec<(f64, bool)> = points.into_iter().map(|value| (value, true)).collect();
        let rate = day_rate_for(&habits).expect("rate should be computed");
        prop_assert!((rate - 1.0).abs() < 1e-9);
    }
}

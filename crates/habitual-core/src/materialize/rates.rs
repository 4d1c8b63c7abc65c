//! Zero-initialized rate row materialization and backfill.
//!
//! Day and week rate rows are created with `rate = 0` for every
//! `(user, day)` and `(user, period)` pair; the rollup aggregator only ever
//! updates rows that already exist. The backfill variants close downtime
//! gaps with the same marker-then-batch pattern used for completion facts:
//! derive the last-created marker from the rate table itself, walk the gap,
//! persist once.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::model::{DayRate, WeekRate};
use crate::storage::Database;

fn marker_date(marker: DateTime<Utc>) -> NaiveDate {
    marker.with_timezone(&Local).date_naive()
}

/// Create today's missing day-rate rows, one per user.
pub fn ensure_day_rate_rows(db: &Database, today: NaiveDate) -> Result<usize> {
    debug!("ensure_day_rate_rows called");

    if db.find_day_by_date(today)?.is_none() {
        error!(%today, "ensure_day_rate_rows failed: no calendar day for today");
        return Ok(0);
    }

    let users = db.list_users()?;
    if users.is_empty() {
        warn!("ensure_day_rate_rows: no users found");
        return Ok(0);
    }

    let now = Utc::now();
    let mut batch = Vec::new();
    for user in &users {
        if !db.day_rate_exists(user.user_id, today)? {
            batch.push(DayRate::zero(user.user_id, today, now));
        }
    }

    if batch.is_empty() {
        debug!("no new day-rate rows to add");
        return Ok(0);
    }
    let saved = db.insert_day_rates(&batch)?;
    info!(count = saved, %today, "day-rate rows added");
    Ok(saved)
}

/// Create the current week's missing week-rate rows, one per user.
pub fn ensure_week_rate_rows(db: &Database, today: NaiveDate) -> Result<usize> {
    debug!("ensure_week_rate_rows called");

    let Some(period) =
        db.find_week_by_number_and_year(today.iso_week().week(), today.year())?
    else {
        error!(%today, "ensure_week_rate_rows failed: no week period for today");
        return Ok(0);
    };

    let users = db.list_users()?;
    if users.is_empty() {
        warn!("ensure_week_rate_rows: no users found");
        return Ok(0);
    }

    let now = Utc::now();
    let mut batch = Vec::new();
    for user in &users {
        if !db.week_rate_exists(user.user_id, period.week_id)? {
            batch.push(WeekRate::zero(user.user_id, period.week_id, now));
        }
    }

    if batch.is_empty() {
        debug!("no new week-rate rows to add");
        return Ok(0);
    }
    let saved = db.insert_week_rates(&batch)?;
    info!(count = saved, week = period.week_number, "week-rate rows added");
    Ok(saved)
}

/// Backfill day-rate rows for every user over the gap since the last created
/// row, in one batch.
pub fn backfill_day_rate_rows(db: &Database, today: NaiveDate) -> Result<usize> {
    debug!("backfill_day_rate_rows called");

    let Some(marker) = db.latest_day_rate_created_at()? else {
        warn!("no previous day-rate rows found, seeding today instead");
        return ensure_day_rate_rows(db, today);
    };

    let start = marker_date(marker);
    if start > today {
        debug!("no missing days to process, data is up to date");
        return Ok(0);
    }

    let days = db.calendar_days_between(start, today)?;
    if days.is_empty() {
        warn!(%start, %today, "no calendar days found for date range");
        return Ok(0);
    }

    let users = db.list_users()?;
    if users.is_empty() {
        warn!("backfill_day_rate_rows: no users found");
        return Ok(0);
    }

    let now = Utc::now();
    let mut batch = Vec::new();
    for day in &days {
        for user in &users {
            if !db.day_rate_exists(user.user_id, day.date)? {
                batch.push(DayRate::zero(user.user_id, day.date, now));
            }
        }
    }

    if batch.is_empty() {
        debug!("no missing day-rate rows found, all data is up to date");
        return Ok(0);
    }
    let saved = db.insert_day_rates(&batch)?;
    info!(count = saved, "filled missing day-rate rows");
    Ok(saved)
}

/// Backfill week-rate rows for every user over the gap since the last
/// created row, in one batch.
pub fn backfill_week_rate_rows(db: &Database, today: NaiveDate) -> Result<usize> {
    debug!("backfill_week_rate_rows called");

    let Some(marker) = db.latest_week_rate_created_at()? else {
        warn!("no previous week-rate rows found, seeding the current week instead");
        return ensure_week_rate_rows(db, today);
    };

    let start = marker_date(marker);
    if start > today {
        debug!("no missing weeks to process, data is up to date");
        return Ok(0);
    }

    let periods = db.week_periods_starting_between(start, today)?;
    if periods.is_empty() {
        warn!(%start, %today, "no week periods found for date range");
        return Ok(0);
    }

    let users = db.list_users()?;
    if users.is_empty() {
        warn!("backfill_week_rate_rows: no users found");
        return Ok(0);
    }

    let now = Utc::now();
    let mut batch = Vec::new();
    for period in &periods {
        for user in &users {
            if !db.week_rate_exists(user.user_id, period.week_id)? {
                batch.push(WeekRate::zero(user.user_id, period.week_id, now));
            }
        }
    }

    if batch.is_empty() {
        debug!("no missing week-rate rows found, all data is up to date");
        return Ok(0);
    }
    let saved = db.insert_week_rates(&batch)?;
    info!(count = saved, "filled missing week-rate rows");
    Ok(saved)
}

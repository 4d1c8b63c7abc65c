//! Run orchestrator.
//!
//! Two entry points feed one serialized pass: a once-at-startup trigger and
//! a daily tick. The first pass of a process runs the full bootstrap (which
//! doubles as downtime catch-up); every later pass runs incrementally. The
//! transition is guarded so concurrent triggers bootstrap exactly once per
//! process, and every bootstrap step re-derives its cursor from storage
//! (latest period, latest day, max creation timestamp), so re-running the
//! bootstrap after a restart only creates what is actually missing.
//!
//! ## Pass selection
//!
//! ```text
//! Uninitialized -> full bootstrap: seed reference data, generate periods
//!                  and days, backfill completions and rate rows, aggregate
//!                  the backfilled span
//! Bootstrapped  -> incremental: extend periods on Jan 1, extend days,
//!                  materialize today, ensure rate rows, aggregate today
//! ```
//!
//! The pass and the toggle-triggered recompute serialize on the same guard;
//! a recompute failure after a toggle is logged and never reverses the
//! toggle itself.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use chrono::{Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::calendar::{extend_calendar_days, extend_week_periods};
use crate::error::Result;
use crate::materialize::{
    backfill_completions, backfill_day_rate_rows, backfill_week_rate_rows, ensure_day_rate_rows,
    ensure_week_rate_rows, materialize_day, materialize_new_habit,
};
use crate::model::{CompletionFact, Habit};
use crate::rollup::{compute_day_rate, compute_week_rate, compute_week_rate_for_period};
use crate::seed::seed_reference_data;
use crate::storage::{Config, Database};

/// Orchestration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// This process has not bootstrapped yet; the next pass runs the full
    /// bootstrap (including downtime catch-up).
    Uninitialized,
    /// This process has bootstrapped; passes run incrementally.
    Bootstrapped,
}

impl RunState {
    /// What stored data says about the calendar structure: `Uninitialized`
    /// until any week period exists.
    pub fn detect(db: &Database) -> Result<Self> {
        if db.count_week_periods()? == 0 {
            Ok(RunState::Uninitialized)
        } else {
            Ok(RunState::Bootstrapped)
        }
    }
}

/// Per-step counts of one orchestrated pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// State the pass ran in.
    pub state: RunState,
    pub categories_seeded: usize,
    pub priority_levels_seeded: usize,
    pub weeks_created: usize,
    pub days_created: usize,
    pub completions_created: usize,
    /// Batch persist calls used for the completions above.
    pub completion_batches: usize,
    pub day_rate_rows_created: usize,
    pub week_rate_rows_created: usize,
    pub day_rates_computed: usize,
    pub week_rates_computed: usize,
}

impl RunReport {
    fn empty(state: RunState) -> Self {
        Self {
            state,
            categories_seeded: 0,
            priority_levels_seeded: 0,
            weeks_created: 0,
            days_created: 0,
            completions_created: 0,
            completion_batches: 0,
            day_rate_rows_created: 0,
            week_rate_rows_created: 0,
            day_rates_computed: 0,
            week_rates_computed: 0,
        }
    }
}

/// The temporal materialization engine.
///
/// Owns the storage collaborator behind a mutual-exclusion guard: only one
/// orchestrated pass (or toggle recompute) executes at a time.
pub struct Engine {
    db: Mutex<Database>,
    config: Config,
    state: Mutex<RunState>,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl Engine {
    /// Build an engine over an already opened database.
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db: Mutex::new(db),
            config,
            state: Mutex::new(RunState::Uninitialized),
        }
    }

    /// Open the default database and configuration.
    pub fn open() -> Result<Self> {
        let db = Database::open()?;
        let config = Config::load()?;
        Ok(Self::new(db, config))
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        match self.db.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Run a closure against the guarded database.
    pub fn with_db<T>(&self, f: impl FnOnce(&Database) -> T) -> T {
        f(&self.db())
    }

    /// This process's orchestration state.
    pub fn state(&self) -> RunState {
        match self.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn mark_bootstrapped(&self) {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = RunState::Bootstrapped;
    }

    /// What stored data says about the calendar structure.
    pub fn storage_state(&self) -> Result<RunState> {
        RunState::detect(&self.db())
    }

    /// Startup entry point, fired once when the hosting process comes up.
    pub fn run_startup_bootstrap(&self) -> Result<RunReport> {
        info!("startup trigger - running orchestration pass");
        self.run_pass(local_today())
    }

    /// Daily entry point, fired once every 24h. Safe to fire more than once
    /// on the same day.
    pub fn run_daily_tick(&self) -> Result<RunReport> {
        debug!("daily tick - running orchestration pass");
        self.run_pass(local_today())
    }

    /// Run one orchestration pass for the given date.
    ///
    /// Both lifecycle entry points funnel here; schedulers and tests can
    /// call it directly with a pinned date. The first successful pass of
    /// this process runs the bootstrap path; the transition happens while
    /// the storage guard is held, so overlapping triggers bootstrap at most
    /// once.
    pub fn run_pass(&self, today: NaiveDate) -> Result<RunReport> {
        let db = self.db();
        let report = match self.state() {
            RunState::Uninitialized => {
                let report = self.bootstrap(&db, today);
                if report.is_ok() {
                    self.mark_bootstrapped();
                }
                report
            }
            RunState::Bootstrapped => self.daily(&db, today),
        };
        if let Err(error) = &report {
            error!(%error, "orchestration pass failed");
        }
        report
    }

    /// Full bootstrap: reference data, calendar structure, backfill, and
    /// aggregation over the backfilled span.
    fn bootstrap(&self, db: &Database, today: NaiveDate) -> Result<RunReport> {
        info!(%today, "first run - full bootstrap");
        let mut report = RunReport::empty(RunState::Uninitialized);

        let seeds = seed_reference_data(db, &self.config.seed)?;
        report.categories_seeded = seeds.categories_added;
        report.priority_levels_seeded = seeds.priority_levels_added;

        report.weeks_created = extend_week_periods(db, today)?;
        report.days_created = extend_calendar_days(db, today)?;

        let backfill = backfill_completions(db, today)?;
        report.completions_created = backfill.facts_created;
        report.completion_batches = backfill.batches;

        report.day_rate_rows_created = backfill_day_rate_rows(db, today)?;
        report.week_rate_rows_created = backfill_week_rate_rows(db, today)?;

        let span_start = backfill.start.unwrap_or(today);
        let (day_rates, week_rates) = aggregate_span(db, span_start, today)?;
        report.day_rates_computed = day_rates;
        report.week_rates_computed = week_rates;

        info!(?report, "bootstrap pass finished");
        Ok(report)
    }

    /// Incremental daily pass.
    fn daily(&self, db: &Database, today: NaiveDate) -> Result<RunReport> {
        debug!(%today, "regular run - daily tasks");
        let mut report = RunReport::empty(RunState::Bootstrapped);

        if today.ordinal() == 1 {
            info!("new year detected - extending week periods");
            report.weeks_created = extend_week_periods(db, today)?;
        }
        report.days_created = extend_calendar_days(db, today)?;

        report.completions_created = materialize_day(db, today)?;
        report.completion_batches = usize::from(report.completions_created > 0);

        report.day_rate_rows_created = ensure_day_rate_rows(db, today)?;
        report.week_rate_rows_created = ensure_week_rate_rows(db, today)?;

        let (day_rates, week_rates) = aggregate_span(db, today, today)?;
        report.day_rates_computed = day_rates;
        report.week_rates_computed = week_rates;

        debug!(?report, "daily pass finished");
        Ok(report)
    }

    /// Hook for habit creation: materialize today's placeholder immediately
    /// instead of waiting for the next pass.
    pub fn on_habit_created(&self, habit: &Habit) -> Result<usize> {
        let db = self.db();
        materialize_new_habit(&db, habit, local_today())
    }

    /// Persist a new habit and materialize its placeholder for today.
    pub fn create_habit(&self, habit: &Habit) -> Result<()> {
        let db = self.db();
        db.insert_habit(habit)?;
        info!(habit = %habit.habit_id, title = %habit.title, "habit created");
        materialize_new_habit(&db, habit, local_today())?;
        Ok(())
    }

    /// Hook for a completion toggle: flip the fact, then recompute the
    /// affected day and week rates synchronously.
    ///
    /// Returns the updated fact, or `None` when no fact matches the id for
    /// this user. A recompute failure is logged and does not reverse the
    /// toggle.
    pub fn on_completion_toggled(
        &self,
        user_id: Uuid,
        completion_id: Uuid,
        completed: bool,
    ) -> Result<Option<CompletionFact>> {
        debug!(user = %user_id, completion = %completion_id, completed, "completion toggle");
        let db = self.db();

        let Some(mut fact) = db.find_completion_for_user(user_id, completion_id)? else {
            warn!(user = %user_id, completion = %completion_id, "no completion fact for user");
            return Ok(None);
        };

        if completed {
            fact.mark_complete(Utc::now());
        } else {
            fact.mark_incomplete();
        }
        if !db.update_completion_status(&fact)? {
            warn!(completion = %completion_id, "completion fact disappeared before update");
            return Ok(None);
        }
        info!(completion = %completion_id, completed, "completion status updated");

        let Some(day) = db.find_day_by_id(fact.day_id)? else {
            error!(day_id = fact.day_id, "no calendar day for toggled completion");
            return Ok(Some(fact));
        };
        if let Err(error) = compute_day_rate(&db, user_id, &day) {
            error!(%error, "day rate recompute failed after toggle");
        }
        if let Err(error) = compute_week_rate(&db, user_id, day.date) {
            error!(%error, "week rate recompute failed after toggle");
        }

        Ok(Some(fact))
    }
}

/// Recompute day rates for every user and day in `[start, end]`, then the
/// week rates of every period those days belong to. Returns
/// `(day rates updated, week rates updated)`.
fn aggregate_span(db: &Database, start: NaiveDate, end: NaiveDate) -> Result<(usize, usize)> {
    let users = db.list_users()?;
    if users.is_empty() {
        warn!("aggregate_span: no users found");
        return Ok((0, 0));
    }
    let days = db.calendar_days_between(start, end)?;
    if days.is_empty() {
        debug!(%start, %end, "aggregate_span: no calendar days in span");
        return Ok((0, 0));
    }

    let mut day_rates = 0;
    let mut week_rates = 0;
    for user in &users {
        let mut seen_weeks = BTreeSet::new();
        for day in &days {
            if compute_day_rate(db, user.user_id, day)?.is_some() {
                day_rates += 1;
            }
            seen_weeks.insert(day.week_id);
        }
        for week_id in &seen_weeks {
            if let Some(period) = db.find_week_by_id(*week_id)? {
                if compute_week_rate_for_period(db, user.user_id, &period)?.is_some() {
                    week_rates += 1;
                }
            }
        }
    }
    Ok((day_rates, week_rates))
}

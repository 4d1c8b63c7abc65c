//! Materialization of per-day records: completion placeholders and
//! zero-initialized rate rows, plus the backfill paths that close downtime
//! gaps.

pub mod completions;
pub mod rates;

pub use completions::{
    backfill_completions, materialize_day, materialize_new_habit, BackfillOutcome,
};
pub use rates::{
    backfill_day_rate_rows, backfill_week_rate_rows, ensure_day_rate_rows, ensure_week_rate_rows,
};

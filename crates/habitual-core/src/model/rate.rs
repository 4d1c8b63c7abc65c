//! Day and week completion rates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Point-weighted completion rate for one user and one calendar date.
///
/// One row per `(user_id, date)`. Rows are created zero-initialized by the
/// rate-row backfill; the aggregator updates `rate` in place whenever the
/// underlying completion facts change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRate {
    pub user_id: Uuid,
    pub date: NaiveDate,
    /// In `[0, 1]`, rounded half-up to 2 decimals.
    pub rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DayRate {
    /// New zero-initialized row.
    pub fn zero(user_id: Uuid, date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            date,
            rate: 0.0,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Rolled-up completion rate for one user and one week period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRate {
    pub user_id: Uuid,
    pub week_id: i64,
    pub rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeekRate {
    /// New zero-initialized row.
    pub fn zero(user_id: Uuid, week_id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            week_id,
            rate: 0.0,
            created_at,
            updated_at: created_at,
        }
    }
}

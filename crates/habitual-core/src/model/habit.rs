//! Habit definitions.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Smallest allowed point weight for a habit.
pub const MIN_HABIT_POINTS: f64 = 0.5;
/// Largest allowed point weight for a habit.
pub const MAX_HABIT_POINTS: f64 = 10.0;

/// A recurring habit with a point weight and a set of scheduled weekdays.
///
/// Habits are owned and managed outside the materialization engine; the
/// engine only reads them to decide which days get completion placeholders
/// and how much each completion is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub habit_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// Point weight, in `[MIN_HABIT_POINTS, MAX_HABIT_POINTS]`.
    pub points: f64,
    /// Positive habits are built up, negative ones broken down.
    pub positive: bool,
    pub description: Option<String>,
    pub active: bool,
    pub category_id: i64,
    /// Weekdays the habit recurs on.
    pub weekdays: Vec<Weekday>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit, validating title and point weight.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        title: impl Into<String>,
        points: f64,
        positive: bool,
        description: Option<String>,
        category_id: i64,
        weekdays: Vec<Weekday>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".to_string(),
                message: "title must not be empty".to_string(),
            });
        }
        if !(MIN_HABIT_POINTS..=MAX_HABIT_POINTS).contains(&points) {
            return Err(ValidationError::InvalidValue {
                field: "points".to_string(),
                message: format!(
                    "points must be between {MIN_HABIT_POINTS} and {MAX_HABIT_POINTS}, got {points}"
                ),
            });
        }
        if weekdays.is_empty() {
            return Err(ValidationError::EmptyCollection(
                "habit weekdays".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            habit_id: Uuid::new_v4(),
            user_id,
            title,
            points,
            positive,
            description,
            active: true,
            category_id,
            weekdays,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the habit recurs on the given weekday.
    pub fn is_scheduled_on(&self, weekday: Weekday) -> bool {
        self.weekdays.contains(&weekday)
    }
}

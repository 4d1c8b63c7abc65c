//! Per-habit, per-day completion facts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One record of whether a habit was completed on a calendar day.
///
/// At most one fact exists per `(habit_id, day_id)` pair. Facts are created
/// as placeholders (`completed = false`) by the materializer and toggled
/// later; `completed_at` tracks the instant of the last flip to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionFact {
    pub completion_id: Uuid,
    pub habit_id: Uuid,
    pub day_id: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CompletionFact {
    /// New uncompleted placeholder for a `(habit, day)` pair.
    pub fn placeholder(habit_id: Uuid, day_id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            completion_id: Uuid::new_v4(),
            habit_id,
            day_id,
            completed: false,
            completed_at: None,
            created_at,
        }
    }

    /// Flip to completed, stamping `completed_at`.
    pub fn mark_complete(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
    }

    /// Flip back to uncompleted, clearing `completed_at`.
    pub fn mark_incomplete(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }
}

/// A completion fact joined with the owning habit's point weight, as the
/// rate aggregator consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCompletion {
    pub fact: CompletionFact,
    pub points: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_sets_and_clears_completed_at() {
        let mut fact = CompletionFact::placeholder(Uuid::new_v4(), 7, Utc::now());
        assert!(!fact.completed);
        assert!(fact.completed_at.is_none());

        let at = Utc::now();
        fact.mark_complete(at);
        assert!(fact.completed);
        assert_eq!(fact.completed_at, Some(at));

        fact.mark_incomplete();
        assert!(!fact.completed);
        assert!(fact.completed_at.is_none());
    }
}

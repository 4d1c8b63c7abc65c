//! Reference data: habit categories and priority levels.
//!
//! Seeded once at bootstrap and treated as read-only afterwards.

use serde::{Deserialize, Serialize};

/// A category habits are grouped under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCategory {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

/// A category awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHabitCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

impl NewHabitCategory {
    pub fn new(name: &str, description: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
            color: color.to_string(),
        }
    }
}

/// A named priority level with an ordering rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityLevel {
    pub priority_id: i64,
    pub name: String,
    pub rank: i32,
    pub color: String,
}

/// A priority level awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPriorityLevel {
    pub name: String,
    pub rank: i32,
    pub color: String,
}

impl NewPriorityLevel {
    pub fn new(name: &str, rank: i32, color: &str) -> Self {
        Self {
            name: name.to_string(),
            rank,
            color: color.to_string(),
        }
    }
}

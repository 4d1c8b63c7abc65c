//! Reference data seeded on the first orchestrated run.

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{NewHabitCategory, NewPriorityLevel};
use crate::storage::{Database, SeedConfig};

/// Counts of reference rows added by a seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories_added: usize,
    pub priority_levels_added: usize,
}

/// The default habit category catalog.
pub fn default_categories() -> Vec<NewHabitCategory> {
    vec![
        NewHabitCategory::new("Fitness", "Activities to stay fit", "#FF5733"),
        NewHabitCategory::new("Health", "Healthy habits & routines", "#33FF57"),
        NewHabitCategory::new("Learning", "Study, courses, and skill improvement", "#3357FF"),
        NewHabitCategory::new("Productivity", "Work, planning, and time management", "#FFC300"),
        NewHabitCategory::new("Mindfulness", "Meditation, journaling, mental wellness", "#DAF7A6"),
        NewHabitCategory::new("Finance", "Saving, budgeting, financial goals", "#900C3F"),
        NewHabitCategory::new("Social", "Networking, family, friends", "#581845"),
        NewHabitCategory::new("Nutrition", "Healthy eating and diet", "#FF6F61"),
        NewHabitCategory::new("Hydration", "Drinking enough water", "#1E90FF"),
        NewHabitCategory::new("Sleep", "Sleep routines and hygiene", "#8A2BE2"),
        NewHabitCategory::new("Hobbies", "Creative and leisure activities", "#FF69B4"),
        NewHabitCategory::new("Self-Care", "Personal care and relaxation", "#00CED1"),
        NewHabitCategory::new("Chores", "Household tasks and cleaning", "#FFD700"),
        NewHabitCategory::new("Environment", "Eco-friendly habits", "#32CD32"),
        NewHabitCategory::new("Reading", "Books, articles, knowledge", "#FF8C00"),
        NewHabitCategory::new("Tech Detox", "Limit screen time", "#8B0000"),
        NewHabitCategory::new("Mindset", "Positive thinking & reflection", "#20B2AA"),
        NewHabitCategory::new("Spirituality", "Spiritual growth and practices", "#BA55D3"),
        NewHabitCategory::new("Creativity", "Art, music, writing", "#FF4500"),
        NewHabitCategory::new("Volunteering", "Community service and helping others", "#2E8B57"),
    ]
}

/// The default priority ladder, highest rank first.
pub fn default_priority_levels() -> Vec<NewPriorityLevel> {
    vec![
        NewPriorityLevel::new("Urgent", 5, "#D32F2F"),
        NewPriorityLevel::new("High", 4, "#F57C00"),
        NewPriorityLevel::new("Important", 3, "#FBC02D"),
        NewPriorityLevel::new("Medium", 2, "#388E3C"),
        NewPriorityLevel::new("Low", 1, "#1976D2"),
    ]
}

/// Seed the reference tables according to `config`. Already-present rows are
/// left untouched, so re-seeding is harmless.
pub fn seed_reference_data(db: &Database, config: &SeedConfig) -> Result<SeedSummary> {
    debug!("seed_reference_data called");
    let mut summary = SeedSummary::default();

    if config.categories {
        summary.categories_added = db.seed_categories(&default_categories())?;
        if summary.categories_added > 0 {
            info!(count = summary.categories_added, "habit categories seeded");
        }
    }
    if config.priority_levels {
        summary.priority_levels_added = db.seed_priority_levels(&default_priority_levels())?;
        if summary.priority_levels_added > 0 {
            info!(
                count = summary.priority_levels_added,
                "priority levels seeded"
            );
        }
    }

    Ok(summary)
}

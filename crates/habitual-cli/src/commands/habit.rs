use chrono::Weekday;
use clap::Subcommand;
use habitual_core::{Engine, Habit};

use super::resolve_user;

fn parse_weekday(raw: &str) -> Result<Weekday, Box<dyn std::error::Error>> {
    match raw.to_ascii_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        other => Err(format!("unknown weekday '{other}'").into()),
    }
}

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a habit and materialize today's placeholder
    Add {
        /// Owning user's username
        #[arg(long)]
        user: String,
        title: String,
        /// Point weight (0.5 - 10.0)
        #[arg(long, default_value_t = 1.0)]
        points: f64,
        /// Comma-separated weekdays, e.g. mon,wed,fri
        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,
        /// Category name (must exist; see `run bootstrap`)
        #[arg(long, default_value = "Productivity")]
        category: String,
        #[arg(long)]
        description: Option<String>,
        /// Mark as a habit to break rather than build
        #[arg(long)]
        negative: bool,
    },
    /// List a user's habits
    List {
        #[arg(long)]
        user: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::open()?;

    match action {
        HabitAction::Add {
            user,
            title,
            points,
            days,
            category,
            description,
            negative,
        } => {
            let owner = resolve_user(&engine, &user)?;
            let category = engine
                .with_db(|db| db.find_category_by_name(&category))?
                .ok_or_else(|| format!("unknown category '{category}'"))?;
            let weekdays = days
                .iter()
                .map(|day| parse_weekday(day))
                .collect::<Result<Vec<_>, _>>()?;
            let habit = Habit::new(
                owner.user_id,
                title,
                points,
                !negative,
                description,
                category.category_id,
                weekdays,
            )?;
            engine.create_habit(&habit)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { user } => {
            let owner = resolve_user(&engine, &user)?;
            let habits = engine.with_db(|db| db.list_habits_for_user(owner.user_id))?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
    }
    Ok(())
}

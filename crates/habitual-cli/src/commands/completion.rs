use chrono::NaiveDate;
use clap::Subcommand;
use habitual_core::Engine;
use uuid::Uuid;

use super::resolve_user;

#[derive(Subcommand)]
pub enum CompletionAction {
    /// Toggle a completion and recompute the affected rates
    Toggle {
        completion_id: Uuid,
        #[arg(long)]
        user: String,
        /// Mark the habit back as not completed
        #[arg(long)]
        undo: bool,
    },
    /// List a user's completions for a date
    List {
        #[arg(long)]
        user: String,
        #[arg(long)]
        date: NaiveDate,
    },
}

pub fn run(action: CompletionAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::open()?;

    match action {
        CompletionAction::Toggle {
            completion_id,
            user,
            undo,
        } => {
            let owner = resolve_user(&engine, &user)?;
            let updated = engine.on_completion_toggled(owner.user_id, completion_id, !undo)?;
            match updated {
                Some(fact) => println!("{}", serde_json::to_string_pretty(&fact)?),
                None => return Err(format!("no completion {completion_id} for '{user}'").into()),
            }
        }
        CompletionAction::List { user, date } => {
            let owner = resolve_user(&engine, &user)?;
            let completions = engine.with_db(|db| {
                let Some(day) = db.find_day_by_date(date)? else {
                    return Ok(Vec::new());
                };
                db.completions_for_user_and_day(owner.user_id, day.day_id)
            })?;
            println!("{}", serde_json::to_string_pretty(&completions)?);
        }
    }
    Ok(())
}

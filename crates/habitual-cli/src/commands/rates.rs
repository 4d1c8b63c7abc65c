use chrono::{Datelike, NaiveDate};
use clap::Subcommand;
use habitual_core::Engine;

use super::resolve_user;

#[derive(Subcommand)]
pub enum RatesAction {
    /// Day rate for a user and date
    Day {
        #[arg(long)]
        user: String,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Week rate for the period containing a date
    Week {
        #[arg(long)]
        user: String,
        #[arg(long)]
        date: NaiveDate,
    },
}

pub fn run(action: RatesAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::open()?;

    match action {
        RatesAction::Day { user, date } => {
            let owner = resolve_user(&engine, &user)?;
            let rate = engine.with_db(|db| db.find_day_rate(owner.user_id, date))?;
            match rate {
                Some(rate) => println!("{}", serde_json::to_string_pretty(&rate)?),
                None => return Err(format!("no day rate for '{user}' on {date}").into()),
            }
        }
        RatesAction::Week { user, date } => {
            let owner = resolve_user(&engine, &user)?;
            let rate = engine.with_db(|db| {
                let Some(period) =
                    db.find_week_by_number_and_year(date.iso_week().week(), date.year())?
                else {
                    return Ok(None);
                };
                db.find_week_rate(owner.user_id, period.week_id)
            })?;
            match rate {
                Some(rate) => println!("{}", serde_json::to_string_pretty(&rate)?),
                None => return Err(format!("no week rate for '{user}' around {date}").into()),
            }
        }
    }
    Ok(())
}

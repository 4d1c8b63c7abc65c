use clap::Subcommand;
use habitual_core::{Engine, User};

#[derive(Subcommand)]
pub enum UserAction {
    /// Add a user
    Add {
        username: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// List all users
    List,
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::open()?;

    match action {
        UserAction::Add { username, email } => {
            let user = User::new(username, email);
            engine.with_db(|db| db.insert_user(&user))?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserAction::List => {
            let users = engine.with_db(|db| db.list_users())?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
    }
    Ok(())
}

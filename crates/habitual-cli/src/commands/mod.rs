pub mod completion;
pub mod config;
pub mod habit;
pub mod rates;
pub mod run;
pub mod user;

use habitual_core::{Engine, User};

/// Resolve a username to its stored user row.
pub fn resolve_user(engine: &Engine, username: &str) -> Result<User, Box<dyn std::error::Error>> {
    engine
        .with_db(|db| db.find_user_by_username(username))?
        .ok_or_else(|| format!("unknown user '{username}'").into())
}

use clap::Subcommand;
use habitual_core::Engine;

#[derive(Subcommand)]
pub enum RunAction {
    /// Full startup pass: seed, generate calendar, backfill, aggregate
    Bootstrap,
    /// Incremental daily pass
    Tick,
    /// Show the orchestration state
    Status,
}

pub fn run(action: RunAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::open()?;

    match action {
        RunAction::Bootstrap => {
            let report = engine.run_startup_bootstrap()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        RunAction::Tick => {
            let report = engine.run_daily_tick()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        RunAction::Status => {
            let state = engine.storage_state()?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }
    Ok(())
}

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitual-cli", version, about = "Habitual CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Orchestration passes (bootstrap, daily tick)
    Run {
        #[command(subcommand)]
        action: commands::run::RunAction,
    },
    /// User management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Completion facts
    Completion {
        #[command(subcommand)]
        action: commands::completion::CompletionAction,
    },
    /// Day and week rates
    Rates {
        #[command(subcommand)]
        action: commands::rates::RatesAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let configured = habitual_core::Config::load()
            .map(|config| config.logging.filter)
            .unwrap_or_else(|_| "habitual=info".to_string());
        EnvFilter::new(configured)
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { action } => commands::run::run(action),
        Commands::User { action } => commands::user::run(action),
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Completion { action } => commands::completion::run(action),
        Commands::Rates { action } => commands::rates::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "habitual-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

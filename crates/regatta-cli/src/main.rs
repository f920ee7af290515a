use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "regatta-cli", version, about = "Regatta interval timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Workout program management
    Program {
        #[command(subcommand)]
        action: commands::program::ProgramAction,
    },
    /// Run a program live in the terminal
    Run(commands::run::RunArgs),
    /// Session history and personal records
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Achievement progress
    Achievements {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Training goals
    Goals {
        #[command(subcommand)]
        action: commands::goals::GoalsAction,
    },
    /// Planned workouts
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr so stdout stays parseable. Filter from `REGATTA_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("REGATTA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Program { action } => commands::program::run(action),
        Commands::Run(args) => commands::run::run(args),
        Commands::History { action } => commands::history::run(action),
        Commands::Achievements { json } => commands::achievements::run(json),
        Commands::Goals { action } => commands::goals::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

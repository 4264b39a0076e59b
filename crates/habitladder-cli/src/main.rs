use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "habitladder", version, about = "Habitladder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Participant program lifecycle
    Program {
        #[command(subcommand)]
        action: commands::program::ProgramAction,
    },
    /// Show today's goals (the morning message)
    Goals(commands::goals::GoalsArgs),
    /// Evening survey
    Survey {
        #[command(subcommand)]
        action: commands::survey::SurveyAction,
    },
    /// Weekly summary of logged days
    Week(commands::week::WeekArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Fire morning and evening events for all active programs
    Daemon,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Program { action } => commands::program::run(action),
        Commands::Goals(args) => commands::goals::run(args),
        Commands::Survey { action } => commands::survey::run(action),
        Commands::Week(args) => commands::week::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Daemon => commands::daemon::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

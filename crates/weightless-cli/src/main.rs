use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use weightless_core::Settings;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "weightless", version, about = "Weightless breath-hold trainer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit the stored session configuration
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Print the round plan for the stored configuration
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a session in the terminal
    Run,
    /// Application settings
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log to stderr so the session display on stdout stays clean.
fn init_logging() {
    let filter = EnvFilter::try_from_env("WEIGHTLESS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(Settings::load_or_default().log.filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    // Parse first so `--help` and usage errors leave the data directory alone.
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Plan { json } => commands::plan::run(json),
        Commands::Run => commands::run::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

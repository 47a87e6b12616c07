use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::session::SessionArgs;

#[derive(Parser)]
#[command(name = "capset-cli", version, about = "Capset CLI")]
struct Cli {
    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/capset/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List visible categories with their enabled/locked state
    Categories {
        #[command(flatten)]
        session: SessionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List defined activities
    Activities {
        #[command(flatten)]
        session: SessionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show categories related to one category
    Related {
        /// Category id
        category: String,
        #[command(flatten)]
        session: SessionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a working copy and commit it
    Apply {
        /// Operations: enable-all, disable-all, reset, check:<category>,
        /// uncheck:<category>, on:<activity>, off:<activity>
        #[arg(required = true)]
        ops: Vec<String>,
        #[command(flatten)]
        session: SessionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "capset_core=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("CAPSET_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Categories { session, json } => {
            commands::categories::run(&session, config, json)
        }
        Commands::Activities { session, json } => {
            commands::activities::run(&session, config, json)
        }
        Commands::Related {
            category,
            session,
            json,
        } => commands::related::run(&category, &session, config, json),
        Commands::Apply { ops, session, json } => {
            commands::apply::run(&ops, &session, config, json)
        }
        Commands::Config { action } => commands::config::run(action, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

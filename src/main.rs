use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "challenge-matrix")]
#[command(about = "Challenge Matrix - gamified participation tracker")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Create an administrator account
    CreateAdmin {
        /// Full name of the administrator
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Distributor code
        #[arg(long)]
        code: String,
        /// Office token (yop-canaris, cocody-insacc, annani, attingier)
        #[arg(long)]
        office: String,
    },

    /// Print the office ranking and the top-10 leaderboard
    Rankings,

    /// List challenges with their current phase
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = cli
        .config
        .unwrap_or_else(challenge_matrix::config::Config::default_path);

    match cli.command {
        Commands::Init { force } => {
            cli::init::init_command(&config_path, force)?;
        }
        Commands::CreateAdmin {
            name,
            email,
            code,
            office,
        } => {
            cli::admin::create_admin_command(&config_path, &name, &email, &code, &office).await?;
        }
        Commands::Rankings => {
            cli::rankings::rankings_command(&config_path).await?;
        }
        Commands::Status => {
            cli::status::status_command(&config_path).await?;
        }
    }

    Ok(())
}

//! surveil-rs binary entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use surveil_rs::config::{AppConfig, ConfigLoader};
use surveil_rs::logging::{init_logging, LogConfig};
use surveil_rs::security::PasswordHasher;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "surveil-rs", version, about = "Surveillance dashboard server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the dashboard server (default)
    Serve(ServeArgs),

    /// Print an Argon2 hash for `[[auth.users]]`
    HashPassword {
        password: String,
    },

    /// Write an annotated example configuration
    SampleConfig {
        #[arg(short, long, default_value = "surveil-rs.toml")]
        output: PathBuf,
    },
}

#[derive(Debug, Default, clap::Args)]
struct ServeArgs {
    /// Configuration file (defaults to surveil-rs.toml or config/surveil-rs.toml)
    #[arg(short, long, env = "SURVEIL_CONFIG")]
    config: Option<String>,

    /// Listen address, e.g. 0.0.0.0:5000
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => run_server(args).await,
        Command::HashPassword { password } => {
            let hash = PasswordHasher::new()
                .hash(&password)
                .context("Failed to hash password")?;
            println!("{}", hash);
            Ok(())
        }
        Command::SampleConfig { output } => {
            AppConfig::write_sample(&output)?;
            println!("Sample configuration written to {}", output.display());
            Ok(())
        }
    }
}

async fn run_server(args: ServeArgs) -> Result<()> {
    let config = ConfigLoader::new()
        .load_from_file(args.config.as_deref())
        .load_from_env()
        .with_bind_addr(args.bind)
        .with_log_level(args.log_level)
        .build()?;

    // ガードはプロセス終了まで保持する
    let _log_guard = init_logging(&LogConfig::from_logging_config(&config.logging))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting surveil-rs");

    if let Err(e) = surveil_rs::serve(config).await {
        error!(error = %e, "Server terminated");
        return Err(e);
    }

    Ok(())
}

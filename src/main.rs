use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod command;

use cli::{Cli, Commands};
use vibex_backend::{runtime, startup};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(cmd) = cli.command else {
        // No command specified, show help
        eprintln!("No command specified. Use --help for usage information.");
        eprintln!("Use 'vibex check' to verify the backend connection.");
        return Ok(());
    };

    // Missing configuration stops startup here, before any command runs
    let client = runtime::install(startup::initialize_with(cli.cache_dir)?);

    match cmd {
        Commands::Check => {
            if !command::run_check(client).await {
                std::process::exit(1);
            }
        }
        Commands::Status => {
            command::run_status(client).await?;
        }
        Commands::Login {
            provider,
            redirect_to,
        } => {
            command::run_login(client, &provider, &redirect_to).await?;
        }
        Commands::Logout => {
            command::run_logout(client).await?;
        }
    }

    Ok(())
}

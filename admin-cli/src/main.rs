// admin-cli/src/main.rs
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{CallArgs, ConfigCommands, EndpointsCommands};
use output::{ExitCode, OutputFormat};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "admin")]
#[command(about = "A command-line client for the admin API", long_about = None)]
struct Cli {
    /// Page the command acts from; a 404 on this page's resource redirects
    #[arg(long, global = true, default_value = "/")]
    location: String,
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "auto")]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Username [default: prompt]
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Drop the stored session
    Logout,
    /// Call an endpoint
    Call(CallArgs),
    /// Endpoint table
    #[command(subcommand)]
    Endpoints(EndpointsCommands),
    /// Configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let exit = match cli.command {
        Commands::Login { username } => {
            commands::run_login(username, &cli.location, cli.format).await?
        }
        Commands::Logout => commands::run_logout(&cli.location, cli.format)?,
        Commands::Call(args) => commands::handle_call(args, &cli.location, cli.format).await?,
        Commands::Endpoints(cmd) => {
            commands::handle_endpoints(cmd)?;
            ExitCode::Success
        }
        Commands::Config(cmd) => {
            commands::handle_config(cmd)?;
            ExitCode::Success
        }
    };

    debug!(%exit, "done");
    if !matches!(exit, ExitCode::Success) {
        std::process::exit(exit.code());
    }
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable; `RUST_LOG` overrides
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

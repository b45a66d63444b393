//! Stoat - engine lifecycle and notification coordinator
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stoat::{raise_signal, run_coordinator, LaunchOptions};
use stoat_app::{DirOverrides, RELOAD_SIGNAL, SYNC_SIGNAL};
use stoat_core::Result;

/// Stoat - engine lifecycle and notification coordinator
#[derive(Parser, Debug)]
#[command(name = "stoat")]
#[command(about = "Coordinates an embedded composition engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// User data directory (configuration and dictionaries)
    #[arg(long, value_name = "DIR", global = true)]
    user_dir: Option<PathBuf>,

    /// Shared data directory (read-only distribution data)
    #[arg(long, value_name = "DIR", global = true)]
    shared_dir: Option<PathBuf>,

    /// Log directory
    #[arg(long, value_name = "DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Runtime directory watched for control signals
    #[arg(long, value_name = "DIR", global = true)]
    runtime_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the coordinator (the default)
    Run {
        /// Run the first maintenance pass as a full workspace check
        #[arg(long)]
        full_check: bool,
    },
    /// Ask a running coordinator to redeploy the engine workspace
    Reload,
    /// Ask a running coordinator to sync engine user data
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dirs = DirOverrides {
        user_dir: cli.user_dir,
        shared_dir: cli.shared_dir,
        log_dir: cli.log_dir,
        runtime_dir: cli.runtime_dir,
    };

    match cli.command.unwrap_or(Command::Run { full_check: false }) {
        Command::Run { full_check } => run_coordinator(LaunchOptions { dirs, full_check }).await,
        Command::Reload => raise_signal(&dirs, RELOAD_SIGNAL),
        Command::Sync => raise_signal(&dirs, SYNC_SIGNAL),
    }
}

//! CLI entry point for taskdeck.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use taskdeck_app::{AppConfig, AppContext, SimulatedApi};
use taskdeck_core::StatusFilter;
use taskdeck_store::FileStore;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use paths::StoragePaths;

mod commands;
mod paths;

/// Task list with a mocked sign-in, kept on local disk.
#[derive(Parser, Debug)]
#[command(
    name = "taskdeck",
    version,
    about = "taskdeck: a small task list behind a mocked sign-in"
)]
struct Cli {
    /// Configuration file (defaults to <config dir>/taskdeck/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding both stores, overriding the configured data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with any non-empty email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out and clear the session.
    Logout,

    /// Add a task.
    Add {
        #[arg(long)]
        title: String,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: String,
    },

    /// Flip a task between pending and completed.
    Toggle { id: String },

    /// Delete a task.
    Delete { id: String },

    /// List tasks.
    Ls {
        /// all, pending or completed.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Show whether a session is active.
    Status,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli {
        config,
        data_dir,
        cmd,
    } = Cli::parse();

    install_tracing();

    let config_path = config
        .or_else(paths::default_config_path)
        .ok_or_else(|| anyhow!("could not determine a config directory; pass --config"))?;
    let config = AppConfig::load(&config_path)?;
    let paths = StoragePaths::resolve(&config.storage, data_dir.as_deref())?;
    debug!(config = %config_path.display(), ?paths, "resolved locations");

    let session = Arc::new(FileStore::open_or_empty(&paths.session)?);
    let persistent = Arc::new(FileStore::open_or_empty(&paths.persistent)?);
    let context = AppContext::open(SimulatedApi::from_config(&config.api), session, persistent)?;

    tokio::runtime::Runtime::new()?.block_on(async move {
        let mut stdout = std::io::stdout().lock();
        commands::run(cmd, &context, &mut stdout).await
    })
}

fn install_tracing() {
    let filter = log_filter(std::env::var("RUST_LOG").ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// `RUST_LOG` directives when present and valid, INFO otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

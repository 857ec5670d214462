//! dirmirror - periodic one-way directory synchronization
//!
//! Keeps a replica directory identical to a source directory by reconciling
//! the two on a fixed interval, logging every change to a file and stdout.

mod display;
mod logging;

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use dirmirror_config::{Config, ConfigBuilder, ConfigLoader, LOG_LEVELS};
use dirmirror_engine::SyncSession;
use dirmirror_sync::TracingSink;
use dirmirror_types::{FailurePolicy, SyncInterval};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

/// dirmirror - periodic one-way directory synchronization
#[derive(Parser, Debug)]
#[command(
    name = "dirmirror",
    version = env!("CARGO_PKG_VERSION"),
    about = "Periodically mirror a source directory into a replica directory",
    long_about = "dirmirror keeps DESTINATION identical to SOURCE. Every INTERVAL seconds it\n\
                  copies new entries, overwrites changed files and removes entries that no\n\
                  longer exist in SOURCE. Every change is logged to LOGS/synchronization.log."
)]
struct Cli {
    /// Directory to mirror from (created if missing)
    source: PathBuf,

    /// Replica directory (created by the first cycle if missing)
    destination: PathBuf,

    /// Seconds between synchronization cycles
    interval: SyncInterval,

    /// Directory that receives the log file (created if missing)
    logs: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log failed cycles and keep the schedule instead of exiting
    #[arg(long)]
    continue_on_error: bool,

    /// Skip entries that fail instead of abandoning the whole cycle
    #[arg(long)]
    isolate_failures: bool,

    /// Stop after this many cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Log level (overrides the configuration file)
    #[arg(long, value_name = "LEVEL", value_parser = PossibleValuesParser::new(LOG_LEVELS))]
    log_level: Option<String>,

    /// Do not mirror log lines to stdout
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Command-line flags win over every other configuration layer
    fn apply_overrides(&self, config: &mut Config) {
        if self.continue_on_error {
            config.sync.failure_policy = FailurePolicy::Continue;
        }
        if self.isolate_failures {
            config.sync.isolate_entry_failures = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if self.quiet {
            config.logging.console = false;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ConfigLoader::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    ConfigBuilder::validate(&config).context("Invalid configuration")?;

    create_dir(&cli.source).await?;
    create_dir(&cli.logs).await?;

    let guard = logging::init(&cli.logs, &config.logging, config.logging.console)?;

    let session = SyncSession::from_config(
        &cli.source,
        &cli.destination,
        cli.interval,
        &config,
        Arc::new(TracingSink),
    );

    let outcome = tokio::select! {
        result = drive(&session, cli.cycles) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted, stopping synchronization");
            Ok(())
        }
    };

    let stats = session.statistics().await;
    info!(
        "Synchronization session ended after {} cycles, log written to '{}'",
        stats.total_cycles(),
        guard.log_path.display()
    );
    if outcome.is_ok() && config.logging.console {
        display::print_statistics(&stats);
    }

    drop(guard);
    outcome
}

async fn drive(session: &SyncSession, cycles: Option<u64>) -> Result<()> {
    match cycles {
        Some(cycles) => {
            let summary = session.run_cycles(cycles).await?;
            info!(
                "Completed {} cycles, {} failed",
                summary.cycles, summary.failures
            );
            Ok(())
        }
        None => match session.run_forever().await? {},
    }
}

async fn create_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["dirmirror", "src", "dst", "30", "logs"]).unwrap();

        assert_eq!(cli.source, PathBuf::from("src"));
        assert_eq!(cli.destination, PathBuf::from("dst"));
        assert_eq!(cli.interval.as_secs(), 30);
        assert_eq!(cli.logs, PathBuf::from("logs"));
        assert!(cli.cycles.is_none());
        assert!(!cli.continue_on_error);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["dirmirror", "src", "dst", "0", "logs"]).is_err());
        assert!(Cli::try_parse_from(["dirmirror", "src", "dst", "soon", "logs"]).is_err());
    }

    #[test]
    fn test_missing_positional_is_rejected() {
        assert!(Cli::try_parse_from(["dirmirror", "src", "dst", "30"]).is_err());
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let result =
            Cli::try_parse_from(["dirmirror", "src", "dst", "5", "logs", "--log-level", "verbose"]);
        assert!(result.is_err());

        for level in LOG_LEVELS {
            let cli =
                Cli::try_parse_from(["dirmirror", "src", "dst", "5", "logs", "--log-level", level])
                    .unwrap();
            let mut config = Config::default();
            cli.apply_overrides(&mut config);
            assert!(ConfigBuilder::validate(&config).is_ok());
        }
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "dirmirror",
            "src",
            "dst",
            "5",
            "logs",
            "--continue-on-error",
            "--isolate-failures",
            "--log-level",
            "debug",
            "--quiet",
            "--cycles",
            "3",
        ])
        .unwrap();
        let mut config = Config::default();

        cli.apply_overrides(&mut config);

        assert_eq!(config.sync.failure_policy, FailurePolicy::Continue);
        assert!(config.sync.isolate_entry_failures);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.console);
        assert_eq!(cli.cycles, Some(3));
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::try_parse_from(["dirmirror", "src", "dst", "5", "logs"]).unwrap();
        let mut config = Config::default();
        config.sync.failure_policy = FailurePolicy::Continue;

        cli.apply_overrides(&mut config);

        assert_eq!(config.sync.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.console);
    }

    #[tokio::test]
    async fn test_create_dir_is_idempotent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let logs = temp_dir.path().join("nested/logs");

        create_dir(&logs).await.unwrap();
        create_dir(&logs).await.unwrap();

        assert!(logs.is_dir());
    }
}

//! Quorum command line: print a starter configuration or replay a governance
//! scenario against an in-memory token with simulated time.

mod scenario;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use quorum_governance::GovernanceConfig;
use quorum_types::Address;
use quorum_utils::LogFormat;

use crate::scenario::{Replay, Scenario};

#[derive(Parser)]
#[command(name = "quorum", about = "Token-weighted governance engine")]
struct Cli {
    /// Log level or filter directive: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "warn", env = "QUORUM_LOG_LEVEL")]
    log_level: String,

    /// Log output format: "human" or "json".
    #[arg(long, default_value = "human", env = "QUORUM_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print a default configuration as TOML.
    #[command(name = "default-config")]
    DefaultConfig,

    /// Run a JSON scenario and print every step's result, then the final state.
    Replay {
        /// Engine configuration (TOML). Defaults are used when omitted.
        #[arg(long, env = "QUORUM_CONFIG")]
        config: Option<PathBuf>,

        /// Scenario file (JSON).
        #[arg(long)]
        scenario: PathBuf,

        /// Write the engine snapshot here after the replay.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,

        /// Keep going after a step fails instead of stopping.
        #[arg(long)]
        continue_on_error: bool,
    },
}

fn default_config() -> anyhow::Result<GovernanceConfig> {
    Ok(GovernanceConfig::new(
        Address::new("chair"),
        Address::new("dao"),
        50,
        300,
    )?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    quorum_utils::init_logging(cli.log_format, &cli.log_level);

    match cli.command {
        Command::DefaultConfig => {
            print!("{}", default_config()?.to_toml_string()?);
        }
        Command::Replay {
            config,
            scenario,
            snapshot_out,
            continue_on_error,
        } => {
            let config = match config {
                Some(path) => {
                    let config = GovernanceConfig::from_toml_file(&path)?;
                    tracing::info!(path = %path.display(), "loaded config");
                    config
                }
                None => default_config()?,
            };
            let raw = std::fs::read_to_string(&scenario)
                .with_context(|| format!("reading scenario {}", scenario.display()))?;
            let scenario: Scenario = serde_json::from_str(&raw)
                .with_context(|| format!("parsing scenario {}", scenario.display()))?;

            tracing::info!(
                administrator = %config.administrator,
                escrow = %config.escrow,
                quorum_percent = config.quorum_percent,
                voting_window = %quorum_utils::format_window(config.voting_duration_secs),
                steps = scenario.steps.len(),
                "replaying scenario"
            );
            let mut replay = Replay::new(config, &scenario)?;
            let mut failed = 0usize;
            for (index, step) in scenario.steps.iter().enumerate() {
                let report = replay.apply(index, step);
                println!("{}", serde_json::to_string(&report)?);
                if !report.ok {
                    failed += 1;
                    if !continue_on_error {
                        break;
                    }
                }
            }

            println!("{}", serde_json::to_string_pretty(&replay.state())?);

            if let Some(path) = snapshot_out {
                std::fs::write(&path, replay.snapshot()?)
                    .with_context(|| format!("writing snapshot {}", path.display()))?;
                tracing::info!(path = %path.display(), "snapshot written");
            }

            if failed > 0 && !continue_on_error {
                anyhow::bail!("scenario stopped after a failed step");
            }
        }
    }
    Ok(())
}

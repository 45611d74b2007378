//! gator CLI: replay daily bars through the signal engine.

mod bars;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gator_core::engine::{replay, DEFAULT_ATR_PERIOD};
use gator_core::fingerprint::RunSummary;
use gator_core::{EngineConfig, StrategyPreset};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "gator", about = "Shifted-smoother trend signal engine")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "gator_core=debug")
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV of daily bars and write one report per bar
    Run {
        /// CSV with columns date,open,high,low,close[,volume]
        #[arg(long)]
        bars: PathBuf,

        /// Path to a TOML engine config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset (e.g. shifted_alligator, peak_filtered)
        #[arg(long)]
        preset: Option<String>,

        /// Wilder ATR period
        #[arg(long, default_value_t = DEFAULT_ATR_PERIOD)]
        atr_period: usize,

        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
        format: OutputFormat,
    },

    /// Validate a config and print its hash
    CheckConfig {
        /// Path to a TOML engine config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset
        #[arg(long)]
        preset: Option<String>,
    },

    /// Print a preset as TOML
    Preset {
        /// Preset name; omit to list all
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Run {
            bars,
            config,
            preset,
            atr_period,
            output,
            format,
        } => {
            let config = resolve_config(config.as_deref(), preset.as_deref())?;
            let summary = run_replay(&bars, &config, atr_period, output.as_deref(), format)?;
            eprintln!("{}", output::format_summary(&summary));
            Ok(())
        }
        Commands::CheckConfig { config, preset } => {
            let config = resolve_config(config.as_deref(), preset.as_deref())?;
            println!("OK {}", config.config_hash()?);
            Ok(())
        }
        Commands::Preset { name } => run_preset(name.as_deref()),
    }
}

fn init_tracing(default_filter: &str) {
    // Logs go to stderr so report output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(config_path: Option<&Path>, preset_name: Option<&str>) -> Result<EngineConfig> {
    match (config_path, preset_name) {
        (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
        (None, None) => bail!("one of --config or --preset is required"),
        (Some(path), None) => EngineConfig::from_file(path)
            .with_context(|| format!("invalid config: {}", path.display())),
        (None, Some(name)) => {
            let preset: StrategyPreset = name.parse()?;
            Ok(preset.to_config())
        }
    }
}

fn run_replay(
    bars_path: &Path,
    config: &EngineConfig,
    atr_period: usize,
    output_path: Option<&Path>,
    format: OutputFormat,
) -> Result<RunSummary> {
    let bars = bars::load_bars(bars_path)?;
    info!(bars = bars.len(), path = %bars_path.display(), "loaded bars");

    let outcome = replay(config, &bars, atr_period)?;
    output::emit(output_path, &outcome.reports, format)?;

    let summary = RunSummary::new(config, &outcome.log)?;
    info!(
        buys = summary.buys,
        sells = summary.sells,
        digest = %summary.decision_digest,
        "replay complete"
    );
    Ok(summary)
}

fn run_preset(name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => {
            let preset: StrategyPreset = name.parse()?;
            print!("{}", preset.to_config().to_toml()?);
        }
        None => {
            for preset in StrategyPreset::all() {
                println!("{preset}");
            }
        }
    }
    Ok(())
}

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use discovery_core::{DiscoveryConfig, Driver, HttpOracle};

/// Discover a crafting graph by pairing items against the oracle.
#[derive(Parser, Debug)]
#[command(name = "crafting-discovery", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of discovery rounds.
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Delay before each oracle call and between passes, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Snapshot file written after every round.
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Pairing endpoint.
    #[arg(long)]
    oracle_url: Option<String>,

    /// Continue from an existing snapshot instead of the seed items.
    #[arg(long)]
    resume: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<DiscoveryConfig> {
        let mut config = match &self.config {
            Some(path) => DiscoveryConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DiscoveryConfig::default(),
        };

        if let Some(rounds) = self.rounds {
            config.round_count = rounds;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.inter_call_delay_ms = delay_ms;
        }
        if let Some(snapshot) = self.snapshot {
            config.snapshot_path = snapshot;
        }
        if let Some(oracle_url) = self.oracle_url {
            config.oracle_url = oracle_url;
        }
        config.resume |= self.resume;

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config()?;
    info!(
        rounds = config.round_count,
        snapshot = ?config.snapshot_path,
        resume = config.resume,
        "starting discovery"
    );

    let rounds = config.round_count;
    let oracle = HttpOracle::new(&config.oracle_url, config.inter_call_delay())?;
    let mut driver = Driver::new(config, oracle)?;

    for _ in 0..rounds {
        let report = driver.run_round()?;
        println!("{report}");
    }
    Ok(())
}

//! emprobe CLI
//!
//! Drives a simulated probe through the processing pipeline: useful for
//! exercising calibration settings, inspecting processed output, and
//! smoke-testing config files before a field session.
//!
//! # Usage
//! ```bash
//! emprobe --scenario shallow -n 200 --json > processed.jsonl
//! ```

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use emprobe::acquisition::{Scenario, SensorSource, SimulatedProbe};
use emprobe::pipeline::{DeviceState, SignalProcessor};
use emprobe::{ProbeConfig, Reading};

#[derive(Parser, Debug)]
#[command(name = "emprobe")]
#[command(about = "EM-induction probe signal processing")]
#[command(version)]
struct Args {
    /// Survey scenario to simulate: air, shallow, deep or drift
    #[arg(long, default_value = "shallow")]
    scenario: Scenario,

    /// Number of readings to process
    #[arg(short = 'n', long, default_value = "100")]
    count: u64,

    /// Acquisition rate in Hz
    #[arg(long, default_value = "50")]
    rate: u32,

    /// Path to a probe config TOML (overrides the default search order)
    #[arg(long, env = "EMPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit each processed reading as a JSON line on stdout
    #[arg(long)]
    json: bool,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ProbeConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ProbeConfig::load(),
    };

    info!(
        probe = %config.probe.name,
        scenario = %args.scenario,
        count = args.count,
        rate = args.rate,
        "Starting session"
    );

    let mut probe = match args.seed {
        Some(seed) => SimulatedProbe::with_seed(args.scenario, seed),
        None => SimulatedProbe::new(args.scenario),
    };
    probe.connect().await.context("connecting probe")?;

    let (tx, rx) = mpsc::channel::<Reading>(64);
    let state = Arc::new(RwLock::new(DeviceState::default()));
    let shutdown = Arc::new(AtomicBool::new(false));

    let period = Duration::from_secs_f64(1.0 / f64::from(args.rate.max(1)));
    let count = args.count;
    let producer = tokio::spawn(async move {
        for _ in 0..count {
            match probe.read().await {
                Ok(batch) => {
                    for reading in batch {
                        if tx.send(reading).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Probe read failed, stopping producer");
                    return;
                }
            }
            tokio::time::sleep(period).await;
        }
    });

    let mut processor = SignalProcessor::new(config);

    if args.json {
        // JSON mode bypasses the shared-state loop and streams each
        // processed reading to stdout as it completes.
        let mut rx = rx;
        while let Some(raw) = rx.recv().await {
            match processor.process(raw) {
                Ok(processed) => {
                    let line =
                        serde_json::to_string(&processed).context("serializing reading")?;
                    println!("{line}");
                }
                Err(e) => warn!(error = %e, "Reading rejected"),
            }
        }
    } else {
        processor
            .run(rx, state.clone(), shutdown)
            .await
            .context("processing loop failed")?;
    }

    producer.await.context("producer task panicked")?;

    let stats = processor.stats();
    info!(
        processed = processor.processed_count(),
        rejected = processor.rejected_count(),
        history = stats.history_size,
        noise = stats.average_noise_level,
        "Session complete"
    );

    Ok(())
}

//! Trace replay tool
//!
//! Replays a trace into an in-memory measurement store and prints the final
//! latest-value snapshot as JSON.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vtel_core::{BaseDataSink, BroadcastHook, DataSink, Measurement};
use vtel_replay::{ConfigOverrides, ReplayConfig, TracePlayer};

#[derive(Parser, Debug)]
#[command(name = "vtel-replay")]
#[command(about = "Replay a recorded vehicle trace into a measurement store")]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trace file to replay (overrides the config file)
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Honour recorded timestamps
    #[arg(long)]
    realtime: bool,

    /// Playback speed multiplier for realtime mode
    #[arg(long)]
    speed: Option<f64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ReplayConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ReplayConfig::default(),
    };
    config.apply_overrides(ConfigOverrides {
        trace_file: args.trace,
        realtime: args.realtime,
        speed: args.speed,
        verbose: args.verbose,
    })?;

    let default_filter = format!("vtel_core={0},vtel_replay={0}", config.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let trace_file = config
        .trace_file
        .clone()
        .context("No trace file given (use --trace or trace_file in the config)")?;

    let player = TracePlayer::open(&trace_file)
        .with_context(|| format!("Failed to read trace {}", trace_file.display()))?
        .realtime(config.realtime)
        .speed(config.speed);

    info!(
        trace = %trace_file.display(),
        records = player.len(),
        realtime = config.realtime,
        speed = config.speed,
        "Starting replay"
    );

    let sink = BaseDataSink::with_hook(BroadcastHook::with_capacity(config.broadcast_capacity));

    let mut updates = sink.hook().subscribe();
    let monitor = tokio::spawn(async move {
        let mut seen = 0usize;
        loop {
            match updates.recv().await {
                Ok(update) => {
                    seen += 1;
                    debug!(name = %update.name, value = %update.measurement, "Update");
                }
                Err(RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Update monitor lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        seen
    });

    let stats = player.play(&sink).await;
    sink.stop();

    let observed = monitor.await.context("Update monitor task failed")?;
    info!(
        records = stats.records,
        names = stats.names,
        observed,
        "Replay complete"
    );

    let snapshot: BTreeMap<String, Measurement> = sink
        .entries()
        .into_iter()
        .map(|(name, m)| (name, m.as_ref().clone()))
        .collect();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}

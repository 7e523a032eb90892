//! compass-core - sensor-fusion navigation pipeline
//!
//! Reads a JSONL sensor-event stream (file or stdin), fuses orientation
//! samples into a heading, tracks distance/bearing/arrival for an active
//! destination, and prints display updates as JSON lines.
//!
//! Module structure:
//! - `domain/` - Core types (GeoPoint, SensorEvent, Heading) and geodesy
//! - `io/` - External interfaces (places, replay, updates, session log)
//! - `services/` - Business logic (Navigator, estimator, tracker, finder)
//! - `infra/` - Infrastructure (Config, Metrics)

use clap::Parser;
use compass_core::infra::{Config, Metrics};
use compass_core::io::{create_update_channel, run_replay, PlaceStore};
use compass_core::services::{LocationFinder, Navigator};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// compass-core - sensor-fusion navigation pipeline
#[derive(Parser, Debug)]
#[command(name = "compass-core", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,

    /// JSONL sensor-event stream to replay ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    replay: String,

    /// Delay between replayed events in milliseconds (0 = as fast as possible)
    #[arg(long, default_value_t = 0)]
    pace_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=debug for full event visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::load_from_path(&args.config);

    info!(
        build_rev = env!("BUILD_REV"),
        config_file = %config.config_file(),
        places_file = %config.places_file(),
        session_log = %config.session_log_file(),
        heading_smoothing = %config.heading_smoothing(),
        arrow_smoothing = %config.arrow_smoothing(),
        arrival_buffer_m = %config.arrival_buffer_m(),
        "compass-core starting"
    );

    // Load the place dataset; a missing dataset degrades search to empty
    let store = match PlaceStore::from_file(config.places_file()) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(error = %e, "place_store_unavailable");
            PlaceStore::empty()
        }
    };
    let finder = LocationFinder::new(Arc::new(store));

    let metrics = Arc::new(Metrics::new());

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Sensor-event channel (bounded for backpressure)
    let (event_tx, event_rx) = mpsc::channel(config.event_queue_capacity());

    // Display-update channel and stdout consumer
    let (update_tx, mut update_rx) =
        create_update_channel(config.update_queue_capacity(), metrics.clone());
    let printer = tokio::spawn(async move {
        while let Some(message) = update_rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!(error = %e, "update_serialize_failed"),
            }
        }
    });

    // Start the replay source
    let pace = Duration::from_millis(args.pace_ms);
    let replay_path = args.replay.clone();
    let replay_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        let result = if replay_path == "-" {
            run_replay(BufReader::new(tokio::io::stdin()), pace, event_tx, replay_shutdown).await
        } else {
            match tokio::fs::File::open(&replay_path).await {
                Ok(file) => {
                    run_replay(BufReader::new(file), pace, event_tx, replay_shutdown).await
                }
                Err(e) => {
                    tracing::error!(path = %replay_path, error = %e, "replay_open_failed");
                    return;
                }
            }
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "replay_error");
        }
    });

    // Periodic metrics reporter
    let metrics_clone = metrics.clone();
    let metrics_interval = config.metrics_interval_secs();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(metrics_interval));
        interval.tick().await; // First tick fires immediately; skip it
        loop {
            interval.tick().await;
            metrics_clone.report().log();
        }
    });

    // Handle shutdown on Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_tx.send(true);
    });

    // Run the navigator - consumes events until the channel closes
    let mut navigator = Navigator::new(&config, finder, update_tx, metrics.clone());
    info!("navigator_started");
    navigator.run(event_rx).await;

    // Close the update channel so the printer drains and exits
    drop(navigator);
    printer.await.ok();

    metrics.report().log();
    info!("compass-core shutdown complete");
    Ok(())
}

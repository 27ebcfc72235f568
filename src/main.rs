//! # AirBit Remote
//!
//! Transmitter for AirBit drones over a micro:bit radio bridge.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber
//!    - Load configuration (first argument, or `config/default.toml`)
//!    - Open the radio bridge and join the configured radio group
//!
//! 2. **Main Loop**
//!    - Send control state at the configured rate through the active
//!      strategy (packed, values or delta)
//!    - Decode telemetry buffers forwarded by the radio reader task and,
//!      if logging is enabled, append them to the telemetry log
//!    - Handle Ctrl+C for graceful shutdown
//!
//! 3. **Graceful Shutdown**
//!    - Disarm and send a final update
//!    - Log totals and exit

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use airbit_remote::config::Config;
use airbit_remote::radio::{self, RadioTransport, SerialRadio};
use airbit_remote::remote::Remote;
use airbit_remote::telemetry::TelemetryLogger;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Capacity of the received-buffer channel
const RECEIVE_QUEUE_DEPTH: usize = 32;

/// Number of sends between status log messages
const LOG_INTERVAL_SENDS: u64 = 200;

#[tokio::main]
async fn main() -> Result<()> {
    let (log_writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(log_writer)
        .init();

    info!("AirBit Remote v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    info!("Loaded configuration from {}", config_path);

    let (radio_tx, receiver) = SerialRadio::open(&config.radio)?;

    let (buffer_tx, mut buffer_rx) = mpsc::channel::<Bytes>(RECEIVE_QUEUE_DEPTH);
    tokio::spawn(async move {
        if let Err(e) = radio::forward_received(receiver, buffer_tx).await {
            warn!("Radio reader stopped: {}", e);
        }
    });

    let mut remote = Remote::new(radio_tx, config.link.mode);
    remote.initialise();
    remote.connect_to_channel(config.radio.group).await?;

    // Decoding always runs; the flag only controls the JSONL log
    let mut telemetry_log = if config.telemetry.enabled {
        Some(TelemetryLogger::from_config(&config.telemetry)?)
    } else {
        info!("Telemetry logging disabled");
        None
    };

    let period_ms = 1000 / config.link.send_rate_hz as u64;
    let mut send_interval = interval(Duration::from_millis(period_ms));

    info!(
        "Sending controls at {}Hz in {:?} mode",
        config.link.send_rate_hz,
        remote.mode()
    );
    info!("Press Ctrl+C to exit");

    let mut send_count: u64 = 0;
    let mut received_count: u64 = 0;

    loop {
        tokio::select! {
            _ = send_interval.tick() => {
                if let Err(e) = remote.send_controls().await {
                    debug!("Failed to send controls: {}", e);
                    continue;
                }

                send_count += 1;
                if send_count % LOG_INTERVAL_SENDS == 0 {
                    info!("Sent {} updates, received {} telemetry packets", send_count, received_count);
                }
            }

            Some(buffer) = buffer_rx.recv() => {
                if handle_received(&mut remote, telemetry_log.as_mut(), &buffer) {
                    received_count += 1;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    remote.disarm();
    if let Err(e) = remote.send_controls().await {
        warn!("Failed to send final disarm: {}", e);
    }

    info!("Total updates sent: {}, telemetry packets received: {}", send_count, received_count);
    Ok(())
}

/// Decode one received buffer and append the result to the log, if any
///
/// Returns `true` if the buffer was decoded. Logging failures are reported
/// but do not affect decoding.
fn handle_received<T: RadioTransport>(
    remote: &mut Remote<T>,
    log: Option<&mut TelemetryLogger>,
    buffer: &[u8],
) -> bool {
    if let Err(e) = remote.on_received_buffer(buffer) {
        warn!("Dropping telemetry buffer: {}", e);
        return false;
    }

    if let Some(log) = log {
        if let Err(e) = log.log(remote.telemetry()) {
            warn!("Failed to write telemetry log: {}", e);
        }
    }

    true
}

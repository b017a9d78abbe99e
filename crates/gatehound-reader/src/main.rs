mod alarm;
mod api;
mod pipeline;
mod serial;

use alarm::AlarmBell;
use api::CollectorClient;
use clap::Parser;
use pipeline::TagPipeline;
use serialport::SerialPort;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Idle sleep between polls when the device has nothing buffered.
const POLL_IDLE: Duration = Duration::from_millis(100);
/// Cooldown after a forward, while the tag is still in front of the antenna.
const FORWARD_COOLDOWN: Duration = Duration::from_secs(1);

#[derive(Clone, Debug)]
struct Config {
    port: String,
    baud: u32,
    collector_url: String,
    device_id: String,
    alarm_sound: String,
    heartbeat_interval: Duration,
    dedup_epoch: Duration,
}

#[derive(Parser, Debug)]
#[command(name = "gatehound-reader")]
struct Args {
    #[arg(long, default_value = "")]
    port: String,
    #[arg(long, default_value_t = 57_600)]
    baud: u32,
    #[arg(long, default_value = "")]
    collector_url: String,
    #[arg(long, default_value = "")]
    device_id: String,
    #[arg(long, default_value = "alarm_sound.mp3")]
    alarm_sound: String,
    #[arg(long, default_value_t = 60)]
    heartbeat_interval: u64,
    #[arg(long, default_value_t = 60)]
    dedup_epoch: u64,
}

#[tokio::main]
async fn main() {
    let config = load_config();
    init_logging();

    if config.port.is_empty() {
        error!(event = "missing_port", hint = "--port or GATEHOUND_SERIAL_PORT");
        return;
    }

    let port = match serial::open_port(&config.port, config.baud) {
        Ok(value) => value,
        Err(err) => {
            error!(event = "serial_open_error", port = %config.port, error = %err);
            return;
        }
    };

    let client = CollectorClient::new(config.collector_url.clone());
    let bell = AlarmBell::new(config.alarm_sound.clone());
    let pipeline = TagPipeline::new(config.dedup_epoch);

    info!(
        event = "reader_start",
        port = %config.port,
        baud = config.baud,
        device_id = %config.device_id,
        collector_url = %config.collector_url
    );

    let heartbeat = tokio::spawn(run_heartbeat(
        client.clone(),
        config.device_id.clone(),
        config.heartbeat_interval,
    ));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!(event = "reader_shutdown");
        }
        _ = run_poll_loop(port, pipeline, client, bell, config) => {}
    }

    heartbeat.abort();
}

/// Poll cycle: drain the serial buffer, run the tag pipeline, and for each
/// new tag ring the alarm and forward the event. Serial and network faults
/// are logged and the loop continues; there is no retry and a failed
/// delivery stays recorded in the dedup window.
async fn run_poll_loop(
    mut port: Box<dyn SerialPort>,
    mut pipeline: TagPipeline,
    client: CollectorClient,
    bell: AlarmBell,
    config: Config,
) {
    loop {
        let raw = match serial::read_available(&mut port) {
            Ok(None) => {
                tokio::time::sleep(POLL_IDLE).await;
                continue;
            }
            Ok(Some(raw)) => raw,
            Err(err) => {
                warn!(event = "serial_read_error", error = %err);
                tokio::time::sleep(POLL_IDLE).await;
                continue;
            }
        };
        debug!(event = "raw_read", len = raw.len());

        let Some(tag) = pipeline.process(&raw, Instant::now()) else {
            continue;
        };

        info!(event = "tag_forwarding", tag = %tag.display());
        bell.ring();
        if let Err(err) = client.send_tag_event(tag.as_str(), &config.device_id).await {
            warn!(event = "tag_send_failed", tag = %tag, error = %err);
        }
        tokio::time::sleep(FORWARD_COOLDOWN).await;
    }
}

/// Liveness loop: one ping immediately on start, then one per interval,
/// forever. Failures are logged and never end the loop.
async fn run_heartbeat(client: CollectorClient, device_id: String, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match client.send_gate_status(&device_id, 1).await {
            Ok(()) => debug!(event = "gate_status_sent", device_id = %device_id),
            Err(err) => warn!(event = "gate_status_send_failed", device_id = %device_id, error = %err),
        }
    }
}

fn load_config() -> Config {
    let args = Args::parse();
    Config {
        port: resolve_flag(&args.port, "GATEHOUND_SERIAL_PORT", ""),
        baud: args.baud,
        collector_url: resolve_flag(
            &args.collector_url,
            "GATEHOUND_COLLECTOR_URL",
            "http://127.0.0.1:5000",
        ),
        device_id: resolve_flag(&args.device_id, "GATEHOUND_DEVICE_ID", "GateA"),
        alarm_sound: args.alarm_sound,
        heartbeat_interval: Duration::from_secs(args.heartbeat_interval),
        dedup_epoch: Duration::from_secs(args.dedup_epoch),
    }
}

fn resolve_flag(flag: &str, env_key: &str, default: &str) -> String {
    if !flag.trim().is_empty() {
        return flag.to_string();
    }
    if let Ok(value) = std::env::var(env_key) {
        if !value.trim().is_empty() {
            return value;
        }
    }
    default.to_string()
}

fn init_logging() {
    let level = std::env::var("GATEHOUND_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

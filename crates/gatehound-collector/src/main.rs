use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::get,
    routing::post,
    Router,
};
use clap::Parser;
use gatehound_core::liveness::{LivenessError, LivenessTracker};
use gatehound_core::timefmt::format_display_timestamp;
use gatehound_core::{GateStatusPayload, TagEventPayload, TagRecord};
use gatehound_store::EventLog;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Config {
    addr: String,
    data_file: String,
    liveness_timeout: Duration,
}

#[derive(Parser, Debug)]
#[command(name = "gatehound-collector")]
struct Args {
    #[arg(long, default_value = "")]
    addr: String,
    #[arg(long, default_value = "")]
    data_file: String,
    #[arg(long, default_value_t = 120)]
    liveness_timeout: u64,
}

struct CollectorState {
    log: Mutex<EventLog>,
    liveness: Mutex<LivenessTracker>,
}

impl CollectorState {
    fn new(config: &Config) -> Self {
        Self {
            log: Mutex::new(EventLog::new(config.data_file.clone())),
            liveness: Mutex::new(LivenessTracker::new(config.liveness_timeout)),
        }
    }
}

#[tokio::main]
async fn main() {
    let config = load_config();
    init_logging();

    let addr: SocketAddr = match config.addr.parse() {
        Ok(value) => value,
        Err(err) => {
            error!(event = "invalid_addr", error = %err, addr = %config.addr);
            return;
        }
    };

    let state = Arc::new(CollectorState::new(&config));
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(value) => value,
        Err(err) => {
            error!(event = "bind_error", error = %err, addr = %config.addr);
            return;
        }
    };

    info!(
        event = "collector_start",
        addr = %config.addr,
        data_file = %config.data_file,
        liveness_timeout_secs = config.liveness_timeout.as_secs()
    );

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!(event = "collector_shutdown");
    };

    if let Err(err) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        error!(event = "collector_error", error = %err);
    }
}

fn router(state: Arc<CollectorState>) -> Router {
    Router::new()
        .route("/receive", post(receive))
        .route("/strings", get(strings))
        .route("/clear", get(clear).post(clear))
        .route("/gate_status", post(ingest_gate_status).get(query_gate_status))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn receive(
    State(state): State<Arc<CollectorState>>,
    Json(payload): Json<TagEventPayload>,
) -> (StatusCode, Json<Value>) {
    let Some(tag) = payload.string else {
        warn!(event = "receive_rejected", reason = "missing_string");
        return error_body(
            StatusCode::BAD_REQUEST,
            "Missing \"string\" in request body",
        );
    };

    let timestamp = payload
        .timestamp
        .map(|raw| format_display_timestamp(&raw));
    let record = TagRecord {
        string: tag,
        timestamp,
        device: payload.device,
    };

    let log = state.log.lock().await;
    match log.append(record) {
        Ok(stored) => {
            info!(event = "tag_received", tag = %stored.string, device = stored.device.as_deref().unwrap_or(""));
            (
                StatusCode::OK,
                Json(json!({
                    "message": "String received",
                    "received": stored.string,
                    "timestamp": stored.timestamp,
                    "device": stored.device,
                })),
            )
        }
        Err(err) => {
            error!(event = "persist_error", error = %err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "failed to persist event")
        }
    }
}

async fn strings(State(state): State<Arc<CollectorState>>) -> (StatusCode, Json<Value>) {
    // Re-read from disk on every call; the file is the source of truth.
    let log = state.log.lock().await;
    match log.load() {
        Ok(records) => (StatusCode::OK, Json(json!({ "strings": records }))),
        Err(err) => {
            error!(event = "load_error", error = %err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "failed to read event log")
        }
    }
}

async fn clear(State(state): State<Arc<CollectorState>>) -> (StatusCode, Json<Value>) {
    let log = state.log.lock().await;
    match log.clear() {
        Ok(()) => {
            info!(event = "log_cleared");
            (StatusCode::OK, Json(json!({ "message": "All strings cleared" })))
        }
        Err(err) => {
            error!(event = "persist_error", error = %err);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "failed to clear event log")
        }
    }
}

async fn ingest_gate_status(
    State(state): State<Arc<CollectorState>>,
    Json(payload): Json<GateStatusPayload>,
) -> (StatusCode, Json<Value>) {
    let (Some(gate_id), Some(status)) = (payload.gate_id, payload.status) else {
        warn!(event = "gate_status_rejected", reason = "missing_fields");
        return error_body(
            StatusCode::BAD_REQUEST,
            "Missing \"gate_id\" or \"status\" in request body",
        );
    };
    if gate_id.is_empty() {
        warn!(event = "gate_status_rejected", reason = "empty_gate_id");
        return error_body(StatusCode::BAD_REQUEST, "\"gate_id\" must not be empty");
    }

    let mut liveness = state.liveness.lock().await;
    match liveness.record_ping(&gate_id, status, Instant::now()) {
        Ok(()) => {
            info!(event = "gate_status_received", gate_id = %gate_id, status = status);
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Gate status received",
                    "gate_id": gate_id,
                    "status": status,
                })),
            )
        }
        Err(err @ LivenessError::InvalidStatus(_)) => {
            warn!(event = "gate_status_rejected", reason = "invalid_status", error = %err);
            error_body(StatusCode::BAD_REQUEST, "\"status\" must be 0 or 1")
        }
    }
}

async fn query_gate_status(State(state): State<Arc<CollectorState>>) -> (StatusCode, Json<Value>) {
    let liveness = state.liveness.lock().await;
    let statuses = liveness.query_all(Instant::now());
    (StatusCode::OK, Json(json!(statuses)))
}

fn error_body(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

fn load_config() -> Config {
    let args = Args::parse();
    Config {
        addr: resolve_addr(&args.addr),
        data_file: resolve_data_file(&args.data_file),
        liveness_timeout: Duration::from_secs(args.liveness_timeout),
    }
}

fn init_logging() {
    let level = std::env::var("GATEHOUND_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn resolve_addr(addr_flag: &str) -> String {
    if !addr_flag.trim().is_empty() {
        return addr_flag.to_string();
    }
    if let Ok(value) = std::env::var("GATEHOUND_COLLECTOR_ADDR") {
        if !value.trim().is_empty() {
            return value;
        }
    }
    "0.0.0.0:5000".to_string()
}

fn resolve_data_file(data_file_flag: &str) -> String {
    if !data_file_flag.trim().is_empty() {
        return data_file_flag.to_string();
    }
    if let Ok(value) = std::env::var("GATEHOUND_DATA_FILE") {
        if !value.trim().is_empty() {
            return value;
        }
    }
    ".gatehound/events.json".to_string()
}

use chrono::{SecondsFormat, Utc};
use gatehound_core::{GateStatusPayload, TagEventPayload};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("collector returned {status}: {body}")]
    Server { status: u16, body: String },
}

/// HTTP client for the collector's ingest endpoints.
#[derive(Clone)]
pub struct CollectorClient {
    client: reqwest::Client,
    base_url: String,
}

impl CollectorClient {
    /// `base_url` is like `http://localhost:5000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Forward one tag event, stamped with the current UTC time.
    pub async fn send_tag_event(&self, tag: &str, device: &str) -> Result<(), ApiError> {
        let payload = TagEventPayload {
            string: Some(tag.to_string()),
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            device: Some(device.to_string()),
        };
        self.post("/receive", &payload).await
    }

    /// Report gate liveness.
    pub async fn send_gate_status(&self, gate_id: &str, status: u8) -> Result<(), ApiError> {
        let payload = GateStatusPayload {
            gate_id: Some(gate_id.to_string()),
            status: Some(i64::from(status)),
        };
        self.post("/gate_status", &payload).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<(), ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

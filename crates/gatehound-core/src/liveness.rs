use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LivenessError {
    #[error("status must be 0 or 1, got {0}")]
    InvalidStatus(i64),
}

#[derive(Debug, Clone)]
struct LivenessRecord {
    last_seen: Instant,
    reported_status: u8,
}

/// Per-source liveness, derived lazily at query time.
///
/// Sources are created on first ping and never evicted; one that stops
/// pinging reports offline once the timeout elapses and stays in the map
/// forever. The effective status never trusts the reported value alone.
#[derive(Debug)]
pub struct LivenessTracker {
    records: HashMap<String, LivenessRecord>,
    timeout: Duration,
}

impl LivenessTracker {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(timeout: Duration) -> Self {
        Self {
            records: HashMap::new(),
            timeout,
        }
    }

    /// Upsert the record for `source_id`. A status outside {0, 1} is
    /// rejected without touching state.
    pub fn record_ping(
        &mut self,
        source_id: &str,
        reported_status: i64,
        now: Instant,
    ) -> Result<(), LivenessError> {
        let reported_status = match reported_status {
            0 | 1 => reported_status as u8,
            other => return Err(LivenessError::InvalidStatus(other)),
        };
        self.records.insert(
            source_id.to_string(),
            LivenessRecord {
                last_seen: now,
                reported_status,
            },
        );
        Ok(())
    }

    /// Effective status for every known source: online only if the last ping
    /// reported 1 and arrived within the timeout. Unknown sources are simply
    /// absent.
    pub fn query_all(&self, now: Instant) -> BTreeMap<String, u8> {
        self.records
            .iter()
            .map(|(source_id, record)| {
                let fresh = now.saturating_duration_since(record.last_seen) <= self.timeout;
                let effective = u8::from(record.reported_status == 1 && fresh);
                (source_id.clone(), effective)
            })
            .collect()
    }
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

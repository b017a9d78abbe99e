use crate::tag::CanonicalTag;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Tags already forwarded during the current epoch.
///
/// The reader polls much faster than one physical tag presentation lasts, so
/// the same tag would otherwise alarm and forward on every cycle. The window
/// suppresses re-forwarding until the next epoch sweep clears it. A tag
/// re-presented within the same epoch is silently ignored; that false
/// negative is accepted. The window is not persisted across restarts.
#[derive(Debug)]
pub struct DedupWindow {
    seen: HashSet<String>,
    last_reset: Instant,
    epoch: Duration,
}

impl DedupWindow {
    pub const DEFAULT_EPOCH: Duration = Duration::from_secs(60);

    pub fn new(epoch: Duration) -> Self {
        Self {
            seen: HashSet::new(),
            last_reset: Instant::now(),
            epoch,
        }
    }

    /// Global epoch sweep. Call once per poll cycle, before any membership
    /// check. Clearing is not per-tag aging; every member goes at once.
    pub fn maybe_reset(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_reset) > self.epoch {
            self.seen.clear();
            self.last_reset = now;
        }
    }

    /// False for the empty tag and for tags already forwarded this epoch.
    pub fn should_forward(&self, tag: &CanonicalTag) -> bool {
        !tag.is_empty() && !self.seen.contains(tag.as_str())
    }

    /// Mark a tag as forwarded. Must run immediately after a positive
    /// `should_forward`, before any blocking side effect, so a slow forward
    /// cannot double-send the same tag.
    pub fn record(&mut self, tag: &CanonicalTag) {
        self.seen.insert(tag.as_str().to_string());
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EPOCH)
    }
}

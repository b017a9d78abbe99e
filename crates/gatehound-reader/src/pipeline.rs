use gatehound_core::dedup::DedupWindow;
use gatehound_core::tag::{canonicalize, CanonicalTag};
use std::time::{Duration, Instant};

/// Per-cycle tag decision: epoch sweep, canonicalize, dedup.
///
/// Owns the dedup window so the poll loop body stays free of state. A
/// returned tag has already been recorded in the window; the caller fires
/// the alarm and network side effects afterwards, and a failed delivery is
/// still treated as forwarded for the rest of the epoch.
pub struct TagPipeline {
    window: DedupWindow,
}

impl TagPipeline {
    pub fn new(epoch: Duration) -> Self {
        Self {
            window: DedupWindow::new(epoch),
        }
    }

    pub fn process(&mut self, raw: &[u8], now: Instant) -> Option<CanonicalTag> {
        self.window.maybe_reset(now);
        let tag = canonicalize(raw);
        if !self.window.should_forward(&tag) {
            return None;
        }
        self.window.record(&tag);
        Some(tag)
    }
}

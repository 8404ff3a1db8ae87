//! Coalescing of rapid seek input into one delayed seek.

use std::time::{Duration, Instant};

/// A seek waiting for its quiet period to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSeek {
    pub target: u64,
    pub requested_at: Instant,
}

/// Holds at most one pending seek; newer requests replace older ones.
///
/// A burst of requests produces a single seek, issued once no request has
/// arrived for `quiet`.
#[derive(Debug)]
pub struct ScrubDebouncer {
    quiet: Duration,
    pending: Option<PendingSeek>,
}

impl ScrubDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn set_quiet_period(&mut self, quiet: Duration) {
        self.quiet = quiet;
    }

    /// Record `target` as the pending seek, restarting the quiet period.
    pub fn request(&mut self, target: u64, now: Instant) {
        self.pending = Some(PendingSeek {
            target,
            requested_at: now,
        });
    }

    pub fn pending(&self) -> Option<PendingSeek> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Take the pending target if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        let pending = self.pending?;
        if now.saturating_duration_since(pending.requested_at) < self.quiet {
            return None;
        }
        self.pending = None;
        Some(pending.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(150);

    #[test]
    fn burst_collapses_to_last_target() {
        let mut scrub = ScrubDebouncer::new(QUIET);
        let start = Instant::now();
        for i in 0..10 {
            let now = start + Duration::from_millis(i * 14);
            scrub.request(i * 3, now);
            assert_eq!(scrub.poll(now), None);
        }
        let last = start + Duration::from_millis(9 * 14);
        assert_eq!(scrub.poll(last + Duration::from_millis(149)), None);
        assert_eq!(scrub.poll(last + QUIET), Some(27));
        assert_eq!(scrub.poll(last + QUIET * 4), None);
    }

    #[test]
    fn clear_drops_the_request() {
        let mut scrub = ScrubDebouncer::new(QUIET);
        let now = Instant::now();
        scrub.request(8, now);
        scrub.clear();
        assert_eq!(scrub.poll(now + QUIET), None);
        assert!(scrub.pending().is_none());
    }
}

//! Throttled reporting of records an output could not deliver.
//!
//! Drops are counted as they happen and summarised at most once per
//! interval, so a collector outage yields one warning every few seconds
//! rather than one per record.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default spacing between dropped-record summaries.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Default)]
struct DropCounts {
    last_warn: Option<Instant>,
    pending: u64,
    total: u64,
}

/// Accumulates dropped records and reports them through a callback.
///
/// [`warn_if_due`](Self::warn_if_due) reports the pending count once the
/// interval since the previous report has elapsed; the first report is
/// never held back. [`flush`](Self::flush) reports whatever is pending.
pub struct RateLimitedWarner {
    interval: Duration,
    counts: Mutex<DropCounts>,
}

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}

impl RateLimitedWarner {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            counts: Mutex::new(DropCounts::default()),
        }
    }

    pub fn record_drop(&self) {
        let mut counts = self.counts.lock();
        counts.pending += 1;
        counts.total += 1;
    }

    /// Records dropped over the warner's lifetime.
    pub fn total_dropped(&self) -> u64 {
        self.counts.lock().total
    }

    pub fn warn_if_due(&self, warn: impl FnOnce(u64)) {
        let now = Instant::now();
        let due = {
            let mut counts = self.counts.lock();
            let elapsed = counts
                .last_warn
                .is_none_or(|last| now.duration_since(last) >= self.interval);
            if elapsed && counts.pending > 0 {
                counts.last_warn = Some(now);
                Some(std::mem::take(&mut counts.pending))
            } else {
                None
            }
        };
        if let Some(count) = due {
            warn(count);
        }
    }

    pub fn flush(&self, warn: impl FnOnce(u64)) {
        let pending = {
            let mut counts = self.counts.lock();
            let pending = std::mem::take(&mut counts.pending);
            if pending > 0 {
                counts.last_warn = Some(Instant::now());
            }
            pending
        };
        if pending > 0 {
            warn(pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn first_summary_is_immediate() {
        let warner = RateLimitedWarner::default();
        let mut warnings = Vec::new();
        warner.record_drop();
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![1]);
    }

    #[test]
    fn summaries_wait_for_the_interval() {
        let warner = RateLimitedWarner::new(Duration::from_secs(60));
        let mut warnings = Vec::new();
        warner.record_drop();
        warner.warn_if_due(|c| warnings.push(c));
        warner.record_drop();
        warner.record_drop();
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![1]);
        warner.flush(|c| warnings.push(c));
        assert_eq!(warnings, vec![1, 2]);
        assert_eq!(warner.total_dropped(), 3);
    }

    #[test]
    fn sub_second_intervals_elapse() {
        let warner = RateLimitedWarner::new(Duration::from_millis(20));
        let mut warnings = Vec::new();
        warner.record_drop();
        warner.warn_if_due(|c| warnings.push(c));
        warner.record_drop();
        thread::sleep(Duration::from_millis(40));
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![1, 1]);
    }

    #[test]
    fn nothing_pending_stays_silent() {
        let warner = RateLimitedWarner::default();
        let mut warnings = Vec::new();
        warner.warn_if_due(|c| warnings.push(c));
        warner.flush(|c| warnings.push(c));
        assert!(warnings.is_empty());
        assert_eq!(warner.total_dropped(), 0);
    }
}

//! Debounce gate between the search box and the fetch cycle
//!
//! Every raw-text update cancels the pending commit and schedules a new one
//! a quiet interval later. The caller drives time explicitly through `now`,
//! which keeps the gate deterministic under test.

use std::time::{Duration, Instant};

/// A value waiting for its quiet interval to elapse
#[derive(Debug, Clone)]
struct PendingCommit {
    value: String,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct DebounceGate {
    quiet: Duration,
    committed: String,
    pending: Option<PendingCommit>,
}

impl DebounceGate {
    /// Start with an empty committed query
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            committed: String::new(),
            pending: None,
        }
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    /// Last value that made it through the gate
    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value will commit, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Record new raw text, replacing whatever was scheduled
    pub fn update(&mut self, raw: &str, now: Instant) {
        self.pending = Some(PendingCommit {
            value: raw.to_string(),
            deadline: now + self.quiet,
        });
    }

    /// Commit the pending value if its quiet interval has elapsed.
    ///
    /// Returns the new committed query only when it differs from the
    /// previous one.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.commit_pending(),
            _ => None,
        }
    }

    /// Commit the pending value right away
    pub fn flush(&mut self) -> Option<String> {
        self.commit_pending()
    }

    /// Drop the pending value without committing it
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    fn commit_pending(&mut self) -> Option<String> {
        let pending = self.pending.take()?;
        if pending.value == self.committed {
            return None;
        }
        self.committed = pending.value;
        Some(self.committed.clone())
    }
}

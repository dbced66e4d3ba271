//! Search session: owns the display state and the fetch worker
//!
//! Each committed query gets a sequence number. Only the outcome of the most
//! recently issued request is applied, so a slow response for an old query
//! can never overwrite the results of a newer one.

use crate::api::MovieSource;
use crate::error::{CineSearchError, Result};
use crate::fetch::{spawn_worker, FetchOutcome, FetchRequest};
use crate::logging;
use crate::state::DisplayState;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct SearchSession {
    display: DisplayState,
    /// Query of the most recently issued request
    query: String,
    /// Sequence number of the most recently issued request (0 = none yet)
    latest_seq: u64,
    /// Sequence number of the last applied outcome
    applied_seq: u64,
    loading_since: Option<Instant>,
    last_elapsed: Option<Duration>,
    total_results: Option<u64>,
    req_tx: Sender<FetchRequest>,
    outcome_rx: Receiver<FetchOutcome>,
}

impl SearchSession {
    /// Start a session with its own fetch worker
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        let (req_tx, req_rx) = crossbeam_channel::unbounded();
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded();
        spawn_worker(source, req_rx, outcome_tx);

        Self {
            display: DisplayState::Loading,
            query: String::new(),
            latest_seq: 0,
            applied_seq: 0,
            loading_since: None,
            last_elapsed: None,
            total_results: None,
            req_tx,
            outcome_rx,
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn is_loading(&self) -> bool {
        self.display.is_loading()
    }

    /// When the current request went out, while it is still in flight
    pub fn loading_since(&self) -> Option<Instant> {
        self.loading_since
    }

    /// Round-trip time of the last applied request
    pub fn last_elapsed(&self) -> Option<Duration> {
        self.last_elapsed
    }

    /// `total_results` reported by the last successful payload
    pub fn total_results(&self) -> Option<u64> {
        self.total_results
    }

    /// Issue a request for a newly committed query and enter `Loading`
    pub fn commit(&mut self, query: &str) -> Result<u64> {
        self.latest_seq += 1;
        self.query = query.to_string();
        self.display = DisplayState::Loading;
        self.loading_since = Some(Instant::now());

        self.req_tx
            .send(FetchRequest {
                seq: self.latest_seq,
                query: self.query.clone(),
            })
            .map_err(|_| CineSearchError::WorkerGone)?;

        Ok(self.latest_seq)
    }

    /// Apply any settled outcomes without blocking.
    ///
    /// Returns true if the display state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            changed |= self.apply(outcome);
        }
        changed
    }

    /// Block until the latest request settles or `timeout` passes.
    ///
    /// Returns true if the session left `Loading`.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.outcome_rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    self.apply(outcome);
                }
                Err(_) => return !self.is_loading(),
            }
        }
        true
    }

    fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.seq != self.latest_seq {
            logging::log_stale_outcome(outcome.seq, self.latest_seq);
            return false;
        }

        logging::log_settled(outcome.seq, &outcome.state.summary(), outcome.elapsed);
        self.applied_seq = outcome.seq;
        self.display = outcome.state;
        self.total_results = outcome.total_results;
        self.last_elapsed = Some(outcome.elapsed);
        self.loading_since = None;
        true
    }

    /// Sequence number of the outcome currently on display
    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }
}

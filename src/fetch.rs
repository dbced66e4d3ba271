//! Fetch cycle: one committed query in, one display state out
//!
//! `resolve` performs a single request and maps every failure onto
//! `DisplayState::Error`. `spawn_worker` runs it on a background thread,
//! coalescing queued requests so only the newest is executed.

use crate::api::{Endpoint, MovieSource};
use crate::error::CineSearchError;
use crate::logging;
use crate::state::DisplayState;
use crossbeam_channel::{Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Request sent to the fetch worker
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub seq: u64,
    pub query: String,
}

/// Settled request sent back from the worker
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub seq: u64,
    pub query: String,
    pub state: DisplayState,
    pub total_results: Option<u64>,
    pub elapsed: Duration,
}

/// Run one request for `query` and interpret the result.
///
/// Never returns `Loading`.
pub fn resolve(source: &dyn MovieSource, seq: u64, query: &str) -> (DisplayState, Option<u64>) {
    let endpoint = Endpoint::for_query(query);
    logging::log_request(seq, query, &source.describe(&endpoint));

    match source.fetch(&endpoint) {
        Ok(payload) => {
            let total = payload.total_results;
            (DisplayState::from_payload(payload), total)
        }
        Err(e) => {
            logging::log_fetch_failure(seq, &e);
            (DisplayState::failed(), None)
        }
    }
}

/// Like `resolve`, but a panicking source still settles the request
pub fn resolve_guarded(
    source: &dyn MovieSource,
    seq: u64,
    query: &str,
) -> (DisplayState, Option<u64>) {
    match panic::catch_unwind(AssertUnwindSafe(|| resolve(source, seq, query))) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            logging::log_fetch_failure(seq, &CineSearchError::Panicked(msg));
            (DisplayState::failed(), None)
        }
    }
}

/// Spawn the fetch worker thread.
///
/// The thread exits once every sender for `req_rx` has been dropped.
pub fn spawn_worker(
    source: Arc<dyn MovieSource>,
    req_rx: Receiver<FetchRequest>,
    outcome_tx: Sender<FetchOutcome>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(mut req) = req_rx.recv() {
            // Coalesce queued requests, keep only the latest
            while let Ok(next) = req_rx.try_recv() {
                logging::log_coalesced(req.seq, next.seq);
                req = next;
            }

            let start = Instant::now();
            let (state, total_results) = resolve_guarded(source.as_ref(), req.seq, &req.query);

            let outcome = FetchOutcome {
                seq: req.seq,
                query: req.query,
                state,
                total_results,
                elapsed: start.elapsed(),
            };
            if outcome_tx.send(outcome).is_err() {
                break;
            }
        }
    })
}

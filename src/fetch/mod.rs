//! Fetching layer.
//!
//! One long-lived worker thread takes jobs off a channel and reports back
//! over a second one, so the UI thread never blocks on the network. Jobs
//! carry a generation number; deciding which replies are stale is left to
//! the caller.

pub mod cache;
pub mod client;

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use serde_json::Value;
use tracing::{debug, error, info};

pub use cache::CachedSource;
pub use client::{build_indicator_url, IndicatorSource, OfflineSource, RequestKey, WorldBankClient, YearSpan};

use crate::error::FetchError;

/// Which view a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Whole-domain series for every country (table, map).
    Table,
    /// Whole-domain series for the selected countries (line, bar).
    Selection,
    /// The three scatter indicators for one year.
    Scatter,
}

#[derive(Debug, Clone)]
pub enum Job {
    Series { slot: Slot, generation: u64, key: RequestKey, refresh: bool },
    /// Fan-in: the reply is sent once all three keys resolve.
    Joined { slot: Slot, generation: u64, keys: [RequestKey; 3], refresh: bool },
}

#[derive(Debug)]
pub enum Reply {
    Series { slot: Slot, generation: u64, result: Result<Value, FetchError> },
    Joined { slot: Slot, generation: u64, result: Result<[Value; 3], FetchError> },
}

impl Reply {
    pub fn slot(&self) -> Slot {
        match self {
            Reply::Series { slot, .. } | Reply::Joined { slot, .. } => *slot,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Reply::Series { generation, .. } | Reply::Joined { generation, .. } => *generation,
        }
    }
}

/// Handle to the fetch worker. Dropping it closes the job channel, which
/// ends the worker once its current job is done.
pub struct Fetcher {
    source: Arc<CachedSource>,
    jobs_tx: Sender<Job>,
    replies_rx: Receiver<Reply>,
}

impl Fetcher {
    pub fn new(source: Box<dyn IndicatorSource>) -> Self {
        let source = Arc::new(CachedSource::new(source));
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let (replies_tx, replies_rx) = mpsc::channel();

        let worker_source = Arc::clone(&source);
        thread::spawn(move || {
            for job in jobs_rx {
                let reply = run_job(&worker_source, job);
                if replies_tx.send(reply).is_err() {
                    break;
                }
            }
            debug!("fetch worker stopped");
        });

        Self { source, jobs_tx, replies_rx }
    }

    pub fn submit(&self, job: Job) {
        if self.jobs_tx.send(job).is_err() {
            error!("fetch worker is gone, job dropped");
        }
    }

    /// Next finished reply, if any, without blocking.
    pub fn try_recv(&self) -> Option<Reply> {
        self.replies_rx.try_recv().ok()
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Reply> {
        self.replies_rx.recv_timeout(timeout).ok()
    }

    pub fn cached_entries(&self) -> usize {
        self.source.cached_entries()
    }
}

fn run_job(source: &CachedSource, job: Job) -> Reply {
    match job {
        Job::Series { slot, generation, key, refresh } => {
            let result = source.get(&key, refresh);
            log_outcome(&key, &result);
            Reply::Series { slot, generation, result }
        }
        Job::Joined { slot, generation, keys, refresh } => {
            let result = fetch_all(source, &keys, refresh);
            Reply::Joined { slot, generation, result }
        }
    }
}

/// Fetches every key concurrently and waits for all of them. The first
/// failure (in key order) fails the whole set.
pub fn fetch_all(source: &CachedSource, keys: &[RequestKey; 3], refresh: bool) -> Result<[Value; 3], FetchError> {
    let results: Vec<Result<Value, FetchError>> = thread::scope(|s| {
        let handles: Vec<_> = keys
            .iter()
            .map(|key| s.spawn(move || source.get(key, refresh)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or(Err(FetchError::WorkerGone)))
            .collect()
    });

    for (key, result) in keys.iter().zip(&results) {
        log_outcome(key, result);
    }

    let mut values = Vec::with_capacity(3);
    for result in results {
        values.push(result?);
    }
    values.try_into().map_err(|_| FetchError::WorkerGone)
}

fn log_outcome(key: &RequestKey, result: &Result<Value, FetchError>) {
    match result {
        Ok(_) => info!(indicator = %key.indicator, span = %key.span.query(), "indicator fetched"),
        Err(FetchError::Offline) => debug!(indicator = %key.indicator, "offline, skipped"),
        Err(err) => error!(indicator = %key.indicator, error = %err, "indicator fetch failed"),
    }
}

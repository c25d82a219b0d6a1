//! Fixed-size worker pool draining the dispatcher into the result sink.
//!
//! Lifecycle: the dispatcher is already filled and closed when [`WorkerPool::run`]
//! starts. Workers take one index at a time, compute that group to
//! completion, emit it, and exit once the dispatcher is drained. The scoped
//! join is the barrier that closes the sink.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};

use super::dispatch::WorkDispatcher;
use super::netting::NettingContext;
use super::sink::ResultSink;
use crate::error::EngineError;
use crate::model::{CircuitGroupPool, GroupNetSupply};

/// Pool size: `max(1, min(hardware, quota))`.
pub fn worker_count(hardware: usize, quota: usize) -> usize {
    hardware.min(quota).max(1)
}

/// Pool size from the logical CPUs reported by the OS and the parallelism
/// the process scheduler grants.
pub fn detect_worker_count() -> usize {
    let hardware = num_cpus::get();
    let quota = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    worker_count(hardware, quota)
}

/// Outcome of one pool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolReport {
    /// Number of workers spawned.
    pub workers: usize,
    /// Groups computed by each worker, indexed by worker id.
    pub per_worker: Vec<usize>,
}

impl PoolReport {
    pub fn completed(&self) -> usize {
        self.per_worker.iter().sum()
    }
}

/// A fixed set of parallel workers, sized once.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    progress_every: usize,
}

impl WorkerPool {
    /// Creates a pool of `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            progress_every: 0,
        }
    }

    /// Creates a pool sized by [`detect_worker_count`].
    pub fn detect() -> Self {
        Self::new(detect_worker_count())
    }

    /// Logs a progress line every `n` completed groups (0 disables).
    pub fn with_progress_every(mut self, n: usize) -> Self {
        self.progress_every = n;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Drains `dispatcher`, emitting each computed group into `sink`.
    ///
    /// Blocks until every worker has exited, then closes `sink` exactly once.
    ///
    /// # Errors
    ///
    /// Returns the first worker error, or [`EngineError::WorkerPanicked`].
    /// The sink is closed in every case.
    pub fn run(
        &self,
        groups: &CircuitGroupPool,
        ctx: &NettingContext<'_>,
        dispatcher: WorkDispatcher,
        sink: ResultSink,
    ) -> Result<PoolReport, EngineError> {
        let started = Instant::now();
        let total = dispatcher.total();
        let done = AtomicUsize::new(0);
        let progress = Progress {
            done: &done,
            total,
            every: self.progress_every,
        };

        let joined: Vec<Result<usize, EngineError>> = thread::scope(|s| {
            let handles: Vec<_> = (0..self.workers)
                .map(|id| {
                    let rx = dispatcher.receiver();
                    let tx = sink.sender();
                    let progress = &progress;
                    s.spawn(move || worker_loop(id, groups, ctx, rx, tx, progress))
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(id, h)| h.join().unwrap_or(Err(EngineError::WorkerPanicked(id))))
                .collect()
        });
        sink.close();

        let undrained = dispatcher.pending();
        if undrained > 0 {
            debug!(undrained, total, "pool stopped with groups left in the dispatcher");
        }

        let mut per_worker = Vec::with_capacity(joined.len());
        for outcome in joined {
            per_worker.push(outcome?);
        }
        let report = PoolReport {
            workers: self.workers,
            per_worker,
        };
        info!(
            workers = report.workers,
            groups = report.completed(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "worker pool joined"
        );
        Ok(report)
    }
}

struct Progress<'a> {
    done: &'a AtomicUsize,
    total: usize,
    every: usize,
}

impl Progress<'_> {
    fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if self.every > 0 && (done % self.every == 0 || done == self.total) {
            info!(done, total = self.total, "circuit groups computed");
        }
    }
}

fn worker_loop(
    id: usize,
    groups: &CircuitGroupPool,
    ctx: &NettingContext<'_>,
    rx: Receiver<usize>,
    tx: Sender<GroupNetSupply>,
    progress: &Progress<'_>,
) -> Result<usize, EngineError> {
    let mut computed = 0;
    for index in rx.iter() {
        let group = groups.get(index).ok_or(EngineError::UnknownGroupIndex(index))?;
        let result = ctx.net_supply(index, group)?;
        debug!(worker = id, group = %result.id, parcels = result.parcel_count, "group computed");
        tx.send(result).map_err(|_| EngineError::SinkClosed(id))?;
        computed += 1;
        progress.tick();
    }
    debug!(worker = id, computed, "dispatcher drained, worker exiting");
    Ok(computed)
}

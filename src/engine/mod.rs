//! Concurrent per-circuit-group aggregation engine.
//!
//! Control flow for one batch:
//!
//! 1. [`WorkDispatcher::load`] enqueues every group index and closes.
//! 2. [`WorkerPool::run`] drains it, computing each group with
//!    [`NettingContext::net_supply`] and emitting into the [`ResultSink`].
//! 3. The pool's join barrier closes the sink; the collector drains the
//!    [`ResultStream`] until it ends.

pub mod dispatch;
pub mod netting;
pub mod sink;
pub mod summary;
pub mod workers;

use std::thread;

use tracing::info;

pub use dispatch::WorkDispatcher;
pub use netting::NettingContext;
pub use sink::{ResultSink, ResultStream, result_channel};
pub use summary::RunSummary;
pub use workers::{PoolReport, WorkerPool, detect_worker_count, worker_count};

use crate::error::EngineError;
use crate::model::{CircuitGroupPool, GroupNetSupply};

/// Results of a completed batch, in pool order.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<GroupNetSupply>,
    pub report: PoolReport,
}

/// Computes every group of `pool` on `workers`.
///
/// The collector drains the result stream on its own thread while the pool
/// runs, and returns results sorted by pool index.
///
/// # Errors
///
/// Any worker error fails the whole batch; partial results are discarded.
pub fn run_batch(
    pool: &CircuitGroupPool,
    ctx: &NettingContext<'_>,
    workers: &WorkerPool,
) -> Result<BatchOutcome, EngineError> {
    let dispatcher = WorkDispatcher::load(pool.len())?;
    let (sink, stream) = result_channel(pool.len());
    info!(
        groups = pool.len(),
        parcels = pool.parcel_count(),
        workers = workers.workers(),
        "dispatching circuit groups"
    );

    let (report, results) = thread::scope(|s| {
        let collector = s.spawn(move || stream.collect_ordered());
        let report = workers.run(pool, ctx, dispatcher, sink);
        (report, collector.join().unwrap_or_default())
    });
    let report = report?;

    if results.len() != pool.len() {
        return Err(EngineError::Incomplete {
            expected: pool.len(),
            received: results.len(),
        });
    }
    Ok(BatchOutcome { results, report })
}

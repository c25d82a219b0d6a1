//! Work dispatch: a channel pre-loaded with every circuit group index.
//!
//! The producer enqueues every index and drops its sender before any worker
//! starts, so "no more work" is signalled by the producer alone. Workers
//! observe the closure once the buffered indices are drained.

use crossbeam_channel::{Receiver, bounded};
use tracing::debug;

use crate::error::EngineError;

/// A filled and closed queue of circuit group indices.
#[derive(Debug)]
pub struct WorkDispatcher {
    rx: Receiver<usize>,
    total: usize,
}

impl WorkDispatcher {
    /// Enqueues `0..count` and closes the channel.
    ///
    /// The channel capacity equals `count`, so loading never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DispatchClosed`] if the channel rejects an
    /// index, which can only happen when every receiver is gone.
    pub fn load(count: usize) -> Result<Self, EngineError> {
        let (tx, rx) = bounded(count.max(1));
        for index in 0..count {
            tx.send(index)
                .map_err(|_| EngineError::DispatchClosed(index))?;
        }
        drop(tx);
        debug!(count, "dispatcher filled and closed");
        Ok(Self { rx, total: count })
    }

    /// Returns a receiving handle for one worker.
    pub fn receiver(&self) -> Receiver<usize> {
        self.rx.clone()
    }

    /// Number of indices originally enqueued.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of indices not yet taken by a worker.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

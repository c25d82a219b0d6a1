//! Result collection: the fan-in channel between workers and the writer.

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::model::GroupNetSupply;

/// Sending side of the result channel, owned by the worker pool.
///
/// The pool hands a clone to each worker and calls [`ResultSink::close`]
/// once its join barrier fires. Closure never depends on how many results
/// have arrived.
#[derive(Debug)]
pub struct ResultSink {
    tx: Sender<GroupNetSupply>,
}

/// Receiving side of the result channel, drained by the writer.
#[derive(Debug)]
pub struct ResultStream {
    rx: Receiver<GroupNetSupply>,
}

/// Creates a result channel with room for `capacity` groups.
pub fn result_channel(capacity: usize) -> (ResultSink, ResultStream) {
    let (tx, rx) = bounded(capacity.max(1));
    (ResultSink { tx }, ResultStream { rx })
}

impl ResultSink {
    /// Sending handle for one worker.
    pub fn sender(&self) -> Sender<GroupNetSupply> {
        self.tx.clone()
    }

    /// Drops the pool's sender. The stream ends once every worker handle is
    /// gone as well.
    pub fn close(self) {
        drop(self.tx);
    }
}

impl ResultStream {
    /// Blocks until the sink closes and returns results in pool order.
    pub fn collect_ordered(self) -> Vec<GroupNetSupply> {
        let mut results: Vec<GroupNetSupply> = self.rx.iter().collect();
        results.sort_by_key(|r| r.index);
        results
    }
}

impl IntoIterator for ResultStream {
    type Item = GroupNetSupply;
    type IntoIter = crossbeam_channel::IntoIter<GroupNetSupply>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.into_iter()
    }
}

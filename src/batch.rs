//! Staged mutation batches: planned in memory, committed atomically per
//! partition by the store.

/// One staged operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BatchOp {
    /// Write `value` under `key`.
    Put(Vec<u8>, Vec<u8>),
    /// Delete `key`.
    Remove(Vec<u8>),
}

impl BatchOp {
    /// The key this operation targets.
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOp::Put(key, _) => key,
            BatchOp::Remove(key) => key,
        }
    }
}

/// Ordered operations for one partition, committed as a unit.
pub type MutationBatch = Vec<BatchOp>;

/// Append-only staging container for one partition's batch.
///
/// Commit order is exactly staging order; nothing is reordered or merged.
#[derive(Debug, Default)]
pub struct BatchHolder {
    ops: MutationBatch,
}

impl BatchHolder {
    /// Creates an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a put.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put(key, value));
    }

    /// Stages a remove.
    pub fn remove(&mut self, key: Vec<u8>) {
        self.ops.push(BatchOp::Remove(key));
    }

    /// Number of staged operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consumes the holder, yielding the batch in staging order.
    pub fn into_batch(self) -> MutationBatch {
        self.ops
    }
}

//! The sorted key-value substrate consumed by the mutation path.

mod memory;

pub use memory::MemStore;

use crate::batch::MutationBatch;
use crate::error::Result;
use crate::types::{PartitionId, SpaceId};

/// Forward-ordered, finite scan over the rows sharing one prefix.
pub type ScanIter<'a> = Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + Send + 'a>;

/// Completion callback of an asynchronous batch commit.
pub type CommitCallback = Box<dyn FnOnce(Result<()>) + Send>;

/// Narrow store interface: ordered prefix iteration plus an atomic
/// batch-append primitive keyed by partition.
pub trait Kvstore: Send + Sync {
    /// Scans all rows of one partition whose key starts with `prefix`,
    /// in key order.
    fn prefix<'a>(
        &'a self,
        space: SpaceId,
        part: PartitionId,
        prefix: &[u8],
    ) -> Result<ScanIter<'a>>;

    /// Commits `batch` to one partition atomically and in staging order,
    /// reporting the outcome through `on_done`. Submission never blocks
    /// the caller on the commit itself.
    fn async_append_batch(
        &self,
        space: SpaceId,
        part: PartitionId,
        batch: MutationBatch,
        on_done: CommitCallback,
    );
}

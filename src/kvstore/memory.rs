use std::collections::BTreeMap;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{CommitCallback, Kvstore, ScanIter};
use crate::batch::{BatchOp, MutationBatch};
use crate::error::{ErrorCode, Result};
use crate::types::{PartitionId, SpaceId};

type PartMap = FxHashMap<(SpaceId, PartitionId), BTreeMap<Vec<u8>, Vec<u8>>>;

/// In-process sorted store. One ordered map per `(space, partition)`;
/// batch commits apply under a single lock acquisition, so each
/// partition's batch is atomic with respect to concurrent scans.
#[derive(Debug, Default)]
pub struct MemStore {
    parts: Mutex<PartMap>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a partition; scans and commits against unknown partitions
    /// fail with [`ErrorCode::PartNotFound`].
    pub fn add_part(&self, space: SpaceId, part: PartitionId) {
        self.parts.lock().entry((space, part)).or_default();
    }

    /// Writes one row directly, outside any batch.
    pub fn put(&self, space: SpaceId, part: PartitionId, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        let mut parts = self.parts.lock();
        let rows = parts
            .get_mut(&(space, part))
            .ok_or(ErrorCode::PartNotFound)?;
        rows.insert(key, value);
        Ok(())
    }

    /// Reads one row.
    pub fn get(&self, space: SpaceId, part: PartitionId, key: &[u8]) -> Option<Vec<u8>> {
        self.parts.lock().get(&(space, part))?.get(key).cloned()
    }

    /// Snapshot of every row in one partition, in key order.
    pub fn entries(&self, space: SpaceId, part: PartitionId) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.parts
            .lock()
            .get(&(space, part))
            .map(|rows| rows.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Number of rows in one partition.
    pub fn part_len(&self, space: SpaceId, part: PartitionId) -> usize {
        self.parts
            .lock()
            .get(&(space, part))
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

impl Kvstore for MemStore {
    fn prefix<'a>(
        &'a self,
        space: SpaceId,
        part: PartitionId,
        prefix: &[u8],
    ) -> Result<ScanIter<'a>> {
        let parts = self.parts.lock();
        let rows = parts.get(&(space, part)).ok_or(ErrorCode::PartNotFound)?;
        let matching: Vec<(Vec<u8>, Vec<u8>)> = rows
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(matching.into_iter()))
    }

    fn async_append_batch(
        &self,
        space: SpaceId,
        part: PartitionId,
        batch: MutationBatch,
        on_done: CommitCallback,
    ) {
        let result = {
            let mut parts = self.parts.lock();
            match parts.get_mut(&(space, part)) {
                Some(rows) => {
                    for op in batch {
                        match op {
                            BatchOp::Put(key, value) => {
                                rows.insert(key, value);
                            }
                            BatchOp::Remove(key) => {
                                rows.remove(&key);
                            }
                        }
                    }
                    Ok(())
                }
                None => Err(ErrorCode::PartNotFound),
            }
        };
        on_done(result);
    }
}

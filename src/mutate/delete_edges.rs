//! Edge deletion: removes every physical representation of each requested
//! edge (lock markers, the current record, stale versions, and secondary
//! index entries) and commits one ordered batch per partition.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tokio::sync::oneshot;
use tracing::{error, warn};

use crate::batch::{BatchHolder, MutationBatch};
use crate::env::StorageEnv;
use crate::error::{ErrorCode, Result};
use crate::index::projection::collect_index_values;
use crate::index::{IndexDef, MutationTicket};
use crate::keys;
use crate::lock::EdgeLockGuard;
use crate::schema::{decode_edge_row, RowReader};
use crate::types::{EdgeRef, PartitionId, SpaceId};

/// Edges to delete, grouped by partition.
///
/// The graph layer above guarantees edge uniqueness per partition;
/// deduplication is not performed here.
#[derive(Clone, Debug)]
pub struct DeleteEdgesRequest {
    /// The space every partition belongs to.
    pub space: SpaceId,
    /// Partitions and the edges to delete in each.
    pub parts: Vec<(PartitionId, Vec<EdgeRef>)>,
}

/// Per-partition outcomes of one delete request.
///
/// A mixed response (some partitions succeeded, others failed) is the
/// expected shape; nothing collapses it into a single status.
#[derive(Debug, Default)]
pub struct DeleteEdgesResponse {
    results: FxHashMap<PartitionId, Result<()>>,
}

impl DeleteEdgesResponse {
    fn record(&mut self, part: PartitionId, result: Result<()>) {
        self.results.insert(part, result);
    }

    /// Outcome of one partition, if it was part of the request.
    pub fn partition(&self, part: PartitionId) -> Option<Result<()>> {
        self.results.get(&part).copied()
    }

    /// Iterates over every partition's outcome.
    pub fn iter(&self) -> impl Iterator<Item = (PartitionId, Result<()>)> + '_ {
        self.results.iter().map(|(part, result)| (*part, *result))
    }

    /// Number of partitions that reported.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no partition reported.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether every partition succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.results.values().all(|result| result.is_ok())
    }
}

/// Deletes batches of edges, one atomically committed batch per partition.
pub struct DeleteEdgesProcessor {
    env: Arc<StorageEnv>,
}

impl DeleteEdgesProcessor {
    /// Builds a processor over the given environment.
    pub fn new(env: Arc<StorageEnv>) -> Self {
        Self { env }
    }

    /// Processes one request. Always reports a result for every requested
    /// partition; partitions proceed independently, and one partition's
    /// failure never prevents another from committing.
    pub async fn process(&self, req: DeleteEdgesRequest) -> DeleteEdgesResponse {
        let space = req.space;
        let mut resp = DeleteEdgesResponse::default();

        let vid_len = match self.env.schema.space_vid_len(space) {
            Ok(len) => len,
            Err(code) => {
                error!("space {space} has no usable vid length: {code}");
                for (part, _) in &req.parts {
                    resp.record(*part, Err(ErrorCode::InvalidSpaceVidLen));
                }
                return resp;
            }
        };

        let indexes = match self.env.index.edge_indexes(space) {
            Ok(defs) => defs,
            Err(code) => {
                error!("edge index lookup failed for space {space}: {code}");
                for (part, _) in &req.parts {
                    resp.record(*part, Err(ErrorCode::SpaceNotFound));
                }
                return resp;
            }
        };

        let mut pending = Vec::with_capacity(req.parts.len());
        if indexes.is_empty() {
            // No index to synchronize: remove the exact edge keys without
            // scanning and without touching the lock registry.
            for (part, edges) in req.parts {
                match plan_unindexed(vid_len, part, &edges) {
                    Ok(batch) => self.submit(space, part, batch, None, &mut pending),
                    Err(code) => resp.record(part, Err(code)),
                }
            }
        } else {
            for (part, edges) in req.parts {
                let ticket = self.env.index_writes.begin();
                let batch = match self.plan_indexed(space, vid_len, part, &edges, &indexes) {
                    Ok(batch) => batch,
                    Err(code) => {
                        resp.record(part, Err(code));
                        continue;
                    }
                };
                let lock_keys = edges.iter().map(|e| e.lock_key(space, part)).collect();
                let guard = match self.env.edge_locks.try_lock_all(lock_keys) {
                    Ok(guard) => guard,
                    Err(conflict) => {
                        error!("edge conflict on {conflict:?}");
                        resp.record(part, Err(ErrorCode::DataConflict));
                        continue;
                    }
                };
                self.submit(space, part, batch, Some((guard, ticket)), &mut pending);
            }
        }

        for (part, rx) in pending {
            let result = rx.await.unwrap_or(Err(ErrorCode::StoreFailure));
            resp.record(part, result);
        }
        resp
    }

    fn submit(
        &self,
        space: SpaceId,
        part: PartitionId,
        batch: MutationBatch,
        held: Option<(EdgeLockGuard, MutationTicket)>,
        pending: &mut Vec<(PartitionId, oneshot::Receiver<Result<()>>)>,
    ) {
        let (tx, rx) = oneshot::channel();
        self.env.store.async_append_batch(
            space,
            part,
            batch,
            Box::new(move |result| {
                // The continuation owns the guard and ticket; both release
                // exactly once, whatever the commit outcome.
                drop(held);
                let _ = tx.send(result);
            }),
        );
        pending.push((part, rx));
    }

    /// Plans one partition's batch: per edge, in request order, removes
    /// leading lock markers, stages index dispositions, removes the
    /// current record, then removes trailing stale rows. Performs no
    /// commit I/O.
    fn plan_indexed(
        &self,
        space: SpaceId,
        vid_len: usize,
        part: PartitionId,
        edges: &[EdgeRef],
        indexes: &[Arc<IndexDef>],
    ) -> Result<MutationBatch> {
        let mut holder = BatchHolder::new();
        for edge in edges {
            if !keys::is_valid_vid_len(vid_len, &edge.src, &edge.dst) {
                error!(
                    "vertex id length invalid in space {space} partition {part}: \
                     expected {vid_len} bytes, got src {} dst {}",
                    edge.src.len(),
                    edge.dst.len()
                );
                return Err(ErrorCode::InvalidVid);
            }
            let prefix =
                keys::edge_prefix(vid_len, part, &edge.src, edge.edge_type, edge.rank, &edge.dst);
            let mut rows = self.env.store.prefix(space, part, &prefix)?.peekable();

            while let Some((key, _)) = rows.next_if(|(key, _)| keys::is_lock(vid_len, key)) {
                holder.remove(key);
            }

            if let Some((key, value)) =
                rows.next_if(|(key, _)| keys::is_edge_record(vid_len, key))
            {
                let matching: SmallVec<[&Arc<IndexDef>; 4]> = indexes
                    .iter()
                    .filter(|index| index.edge_type == edge.edge_type)
                    .collect();
                // Only the latest version feeds the indexes; decoded once,
                // on the first definition that needs it.
                let mut row: Option<RowReader> = None;
                for index in matching {
                    if row.is_none() {
                        match decode_edge_row(
                            self.env.schema.as_ref(),
                            space,
                            edge.edge_type,
                            &value,
                        ) {
                            Some(decoded) => row = Some(decoded),
                            None => {
                                warn!("bad format row");
                                return Err(ErrorCode::InvalidData);
                            }
                        }
                    }
                    let row = row.as_ref().ok_or(ErrorCode::InvalidData)?;
                    let Some(values) = collect_index_values(row, &index.fields) else {
                        // The row predates this definition; skip just it.
                        continue;
                    };
                    let index_key = keys::edge_index_key(
                        vid_len,
                        part,
                        index.index_id,
                        &edge.src,
                        edge.rank,
                        &edge.dst,
                        &values,
                    );
                    let state = self.env.index.index_state(space, part);
                    if state.is_rebuilding() {
                        holder.put(keys::delete_operation_key(part), index_key);
                    } else if state.is_locked() {
                        error!("index {} is locked", index.index_id.0);
                        return Err(ErrorCode::DataConflict);
                    } else {
                        holder.remove(index_key);
                    }
                }
                holder.remove(key);
            }

            for (key, _) in rows {
                holder.remove(key);
            }
        }
        Ok(holder.into_batch())
    }
}

fn plan_unindexed(vid_len: usize, part: PartitionId, edges: &[EdgeRef]) -> Result<MutationBatch> {
    let mut holder = BatchHolder::new();
    for edge in edges {
        if !keys::is_valid_vid_len(vid_len, &edge.src, &edge.dst) {
            error!(
                "vertex id length invalid in partition {part}: expected {vid_len} bytes, \
                 got src {} dst {}",
                edge.src.len(),
                edge.dst.len()
            );
            return Err(ErrorCode::InvalidVid);
        }
        holder.remove(keys::edge_key(
            vid_len,
            part,
            &edge.src,
            edge.edge_type,
            edge.rank,
            &edge.dst,
        ));
    }
    Ok(holder.into_batch())
}

//! Physical key codec shared by the mutation path and the readers.
//!
//! All keys are fixed-layout big-endian composites so that a prefix scan
//! over one edge's family yields rows in a deterministic order: lock
//! markers first, then the current record, then stale versions.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{EdgeRank, EdgeType, IndexId, PartitionId};

/// Leading tag byte of edge data keys.
pub const TAG_EDGE: u8 = 0x02;
/// Leading tag byte of secondary index keys.
pub const TAG_INDEX: u8 = 0x03;
/// Leading tag byte of rebuild-log operation keys.
pub const TAG_OPERATION: u8 = 0x04;

/// Record-kind discriminant of a write-intent lock marker.
pub const KIND_LOCK: u8 = 0x00;
/// Record-kind discriminant of the current edge record.
pub const KIND_RECORD: u8 = 0x01;

static OPERATION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Returns `true` when both vertex ids match the space's configured
/// byte length.
pub fn is_valid_vid_len(vid_len: usize, src: &[u8], dst: &[u8]) -> bool {
    src.len() == vid_len && dst.len() == vid_len
}

/// Byte length of an edge prefix for the given vid length.
pub const fn edge_prefix_len(vid_len: usize) -> usize {
    1 + 4 + vid_len + 4 + 8 + vid_len
}

fn encode_edge_type(edge_type: EdgeType) -> [u8; 4] {
    // Sign-flip keeps negative (reverse) types ordered before positive ones.
    ((edge_type.0 as u32) ^ (1 << 31)).to_be_bytes()
}

fn encode_rank(rank: EdgeRank) -> [u8; 8] {
    ((rank.0 as u64) ^ (1 << 63)).to_be_bytes()
}

/// Prefix shared by every physical row of one logical edge.
pub fn edge_prefix(
    vid_len: usize,
    part: PartitionId,
    src: &[u8],
    edge_type: EdgeType,
    rank: EdgeRank,
    dst: &[u8],
) -> Vec<u8> {
    debug_assert!(is_valid_vid_len(vid_len, src, dst));
    let mut buf = Vec::with_capacity(edge_prefix_len(vid_len) + 1);
    buf.push(TAG_EDGE);
    buf.extend_from_slice(&part.0.to_be_bytes());
    buf.extend_from_slice(src);
    buf.extend_from_slice(&encode_edge_type(edge_type));
    buf.extend_from_slice(&encode_rank(rank));
    buf.extend_from_slice(dst);
    buf
}

/// Physical key of the current edge record.
pub fn edge_key(
    vid_len: usize,
    part: PartitionId,
    src: &[u8],
    edge_type: EdgeType,
    rank: EdgeRank,
    dst: &[u8],
) -> Vec<u8> {
    let mut buf = edge_prefix(vid_len, part, src, edge_type, rank, dst);
    buf.push(KIND_RECORD);
    buf
}

/// Physical key of a write-intent lock marker for the edge.
pub fn lock_key(
    vid_len: usize,
    part: PartitionId,
    src: &[u8],
    edge_type: EdgeType,
    rank: EdgeRank,
    dst: &[u8],
) -> Vec<u8> {
    let mut buf = edge_prefix(vid_len, part, src, edge_type, rank, dst);
    buf.push(KIND_LOCK);
    buf
}

/// Physical key of a stale edge version. `generation` 1 is the newest
/// obsolete row; higher generations sort after it.
pub fn obsolete_edge_key(
    vid_len: usize,
    part: PartitionId,
    src: &[u8],
    edge_type: EdgeType,
    rank: EdgeRank,
    dst: &[u8],
    generation: u8,
) -> Vec<u8> {
    let mut buf = edge_prefix(vid_len, part, src, edge_type, rank, dst);
    buf.push(KIND_RECORD.saturating_add(generation.max(1)));
    buf
}

fn record_kind(vid_len: usize, key: &[u8]) -> Option<u8> {
    if key.first() != Some(&TAG_EDGE) || key.len() <= edge_prefix_len(vid_len) {
        return None;
    }
    Some(key[edge_prefix_len(vid_len)])
}

/// Whether the key names a lock marker of the edge key space.
pub fn is_lock(vid_len: usize, key: &[u8]) -> bool {
    record_kind(vid_len, key) == Some(KIND_LOCK)
}

/// Whether the key names a current edge record.
pub fn is_edge_record(vid_len: usize, key: &[u8]) -> bool {
    record_kind(vid_len, key) == Some(KIND_RECORD)
}

/// Secondary index entry key for one edge under one index definition.
pub fn edge_index_key(
    vid_len: usize,
    part: PartitionId,
    index_id: IndexId,
    src: &[u8],
    rank: EdgeRank,
    dst: &[u8],
    values: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + 4 + 4 + values.len() + vid_len * 2 + 8);
    buf.push(TAG_INDEX);
    buf.extend_from_slice(&part.0.to_be_bytes());
    buf.extend_from_slice(&index_id.0.to_be_bytes());
    buf.extend_from_slice(values);
    buf.extend_from_slice(src);
    buf.extend_from_slice(&encode_rank(rank));
    buf.extend_from_slice(dst);
    buf
}

/// Rebuild-log key recording one pending index deletion. Every call
/// yields a distinct key so entries within a batch never collide.
pub fn delete_operation_key(part: PartitionId) -> Vec<u8> {
    let seq = OPERATION_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut buf = Vec::with_capacity(1 + 4 + 8);
    buf.push(TAG_OPERATION);
    buf.extend_from_slice(&part.0.to_be_bytes());
    buf.extend_from_slice(&seq.to_be_bytes());
    buf
}

/// Whether the key belongs to the rebuild log.
pub fn is_delete_operation(key: &[u8]) -> bool {
    key.first() == Some(&TAG_OPERATION)
}

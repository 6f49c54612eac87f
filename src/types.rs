use std::fmt;

/// Identifier of a graph space (a logical database with its own schema
/// and vertex-id length).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SpaceId(pub u32);

/// Identifier of one partition within a space's key range.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PartitionId(pub u32);

/// Edge type identifier. Negative values denote the reverse direction of
/// the corresponding positive type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeType(pub i32);

/// Ranking value distinguishing parallel edges of the same type between
/// the same pair of vertices.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeRank(pub i64);

/// Identifier of a secondary index definition.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct IndexId(pub u32);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque vertex identifier. Valid only when its byte length equals the
/// owning space's configured vid length.
pub type VertexId = Vec<u8>;

/// One edge named by a deletion request, scoped to a space and partition
/// supplied alongside it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct EdgeRef {
    /// Source vertex id.
    pub src: VertexId,
    /// Edge type.
    pub edge_type: EdgeType,
    /// Edge ranking.
    pub rank: EdgeRank,
    /// Destination vertex id.
    pub dst: VertexId,
}

impl EdgeRef {
    /// Builds an edge reference from its parts.
    pub fn new(
        src: impl Into<VertexId>,
        edge_type: EdgeType,
        rank: EdgeRank,
        dst: impl Into<VertexId>,
    ) -> Self {
        Self {
            src: src.into(),
            edge_type,
            rank,
            dst: dst.into(),
        }
    }

    /// The process-wide mutual-exclusion key for this edge.
    pub fn lock_key(&self, space: SpaceId, part: PartitionId) -> EdgeLockKey {
        (
            space,
            part,
            self.src.clone(),
            self.edge_type,
            self.rank,
            self.dst.clone(),
        )
    }
}

/// Key of the in-memory edge lock registry: one logical edge identity.
pub type EdgeLockKey = (SpaceId, PartitionId, VertexId, EdgeType, EdgeRank, VertexId);

//! Shared collaborator handles threaded through every mutation processor.

use std::sync::Arc;

use crate::index::{IndexManager, MutationTracker};
use crate::kvstore::Kvstore;
use crate::lock::EdgeLockMap;
use crate::schema::SchemaManager;

/// Bundle of the storage collaborators: schema metadata, index catalog,
/// the sorted store, the edge lock registry, and in-flight index write
/// accounting.
#[derive(Clone)]
pub struct StorageEnv {
    /// Space metadata and edge schemas.
    pub schema: Arc<dyn SchemaManager>,
    /// Index catalog and lifecycle state.
    pub index: Arc<dyn IndexManager>,
    /// The sorted key-value substrate.
    pub store: Arc<dyn Kvstore>,
    /// Process-wide logical edge locks.
    pub edge_locks: Arc<EdgeLockMap>,
    /// In-flight index mutation counter, drained by rebuild orchestration.
    pub index_writes: Arc<MutationTracker>,
}

impl StorageEnv {
    /// Builds an environment around the given collaborators.
    pub fn new(
        schema: Arc<dyn SchemaManager>,
        index: Arc<dyn IndexManager>,
        store: Arc<dyn Kvstore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            schema,
            index,
            store,
            edge_locks: EdgeLockMap::new(),
            index_writes: MutationTracker::new(),
        })
    }
}

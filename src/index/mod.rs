//! Secondary index catalog: definitions, lifecycle state, and in-flight
//! mutation accounting consumed by the rebuild orchestrator.

pub mod projection;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{ErrorCode, Result};
use crate::types::{EdgeType, IndexId, PartitionId, SpaceId};

/// Definition of one secondary edge index.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexDef {
    /// Index identifier.
    pub index_id: IndexId,
    /// Edge type the index covers.
    pub edge_type: EdgeType,
    /// Indexed fields, in key order.
    pub fields: Vec<String>,
}

impl IndexDef {
    /// Builds an index definition.
    pub fn new(
        index_id: IndexId,
        edge_type: EdgeType,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            index_id,
            edge_type,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Lifecycle state of a partition's indexes, read fresh at planning time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IndexState {
    /// Indexes are live; mutations apply directly.
    #[default]
    Normal,
    /// A rebuild scan is in flight; deletions go through the rebuild log.
    Rebuilding,
    /// Structural mutations are forbidden.
    Locked,
}

impl IndexState {
    /// Whether a rebuild scan is converging on this partition.
    pub fn is_rebuilding(self) -> bool {
        matches!(self, IndexState::Rebuilding)
    }

    /// Whether the index forbids concurrent structural mutation.
    pub fn is_locked(self) -> bool {
        matches!(self, IndexState::Locked)
    }
}

/// Supplies index definitions and lifecycle state to the mutation path.
pub trait IndexManager: Send + Sync {
    /// All edge index definitions of the space. Unknown spaces fail with
    /// [`ErrorCode::SpaceNotFound`].
    fn edge_indexes(&self, space: SpaceId) -> Result<Vec<Arc<IndexDef>>>;

    /// Current index lifecycle state of one partition.
    fn index_state(&self, space: SpaceId, part: PartitionId) -> IndexState;
}

/// Counts index-affecting mutations currently in flight, so a rebuild
/// orchestrator can drain writers before switching phases.
#[derive(Debug, Default)]
pub struct MutationTracker {
    active: AtomicUsize,
}

impl MutationTracker {
    /// Creates a tracker with no active mutations.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one in-flight mutation; the count drops when the returned
    /// ticket is dropped.
    pub fn begin(self: &Arc<Self>) -> MutationTicket {
        self.active.fetch_add(1, Ordering::AcqRel);
        MutationTicket {
            tracker: Arc::clone(self),
        }
    }

    /// Number of mutations currently in flight.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

/// RAII registration of one in-flight index mutation.
#[derive(Debug)]
pub struct MutationTicket {
    tracker: Arc<MutationTracker>,
}

impl Drop for MutationTicket {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Default)]
struct CatalogEntry {
    indexes: Vec<Arc<IndexDef>>,
}

/// In-process index catalog with per-partition state overrides.
#[derive(Default)]
pub struct MemIndexManager {
    spaces: Mutex<FxHashMap<SpaceId, CatalogEntry>>,
    states: Mutex<FxHashMap<(SpaceId, PartitionId), IndexState>>,
}

impl MemIndexManager {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a space with no indexes.
    pub fn register_space(&self, space: SpaceId) {
        self.spaces.lock().entry(space).or_default();
    }

    /// Adds an index definition to a space, registering the space if needed.
    pub fn add_index(&self, space: SpaceId, def: IndexDef) {
        self.spaces
            .lock()
            .entry(space)
            .or_default()
            .indexes
            .push(Arc::new(def));
    }

    /// Overrides the index state of one partition.
    pub fn set_index_state(&self, space: SpaceId, part: PartitionId, state: IndexState) {
        self.states.lock().insert((space, part), state);
    }
}

impl IndexManager for MemIndexManager {
    fn edge_indexes(&self, space: SpaceId) -> Result<Vec<Arc<IndexDef>>> {
        let spaces = self.spaces.lock();
        spaces
            .get(&space)
            .map(|entry| entry.indexes.clone())
            .ok_or(ErrorCode::SpaceNotFound)
    }

    fn index_state(&self, space: SpaceId, part: PartitionId) -> IndexState {
        self.states
            .lock()
            .get(&(space, part))
            .copied()
            .unwrap_or_default()
    }
}

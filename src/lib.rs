//! Vesper: the mutation layer of a partitioned, index-maintaining graph
//! storage engine.
//!
//! Edges live in a sorted key-value substrate as families of physical
//! rows sharing a byte prefix; secondary indexes are kept consistent with
//! primary data even while an index rebuild is in flight. Mutations are
//! planned in memory, serialized per logical edge by an in-process lock
//! registry, and committed as one atomic ordered batch per partition.

#![warn(missing_docs)]

pub mod batch;
pub mod env;
pub mod error;
pub mod index;
pub mod keys;
pub mod kvstore;
pub mod lock;
pub mod mutate;
pub mod schema;
pub mod types;

/// Shared collaborator bundle for processors.
pub use env::StorageEnv;

/// Per-partition result codes.
pub use error::{ErrorCode, Result};

/// Edge deletion processor and its request/response types.
pub use mutate::{DeleteEdgesProcessor, DeleteEdgesRequest, DeleteEdgesResponse};

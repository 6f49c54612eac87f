//! Mutation processors: each consumes one request, plans per-partition
//! batches, and reports one result per partition.

mod delete_edges;

pub use delete_edges::{DeleteEdgesProcessor, DeleteEdgesRequest, DeleteEdgesResponse};

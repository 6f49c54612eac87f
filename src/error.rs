use thiserror::Error;

/// Crate-wide result alias; per-partition outcomes use `Result<()>`.
pub type Result<T> = std::result::Result<T, ErrorCode>;

/// Result codes reported per partition by the mutation processors.
///
/// Success is the `Ok` arm of [`Result`], never a variant here. Store
/// implementations report their own failures through the same codes so
/// scan and commit errors propagate to the caller verbatim.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The space has no usable vertex-id length configured.
    #[error("invalid space vid length")]
    InvalidSpaceVidLen,
    /// The space is unknown to the index catalog.
    #[error("space not found")]
    SpaceNotFound,
    /// A vertex id's byte length does not match the space configuration.
    #[error("invalid vertex id")]
    InvalidVid,
    /// A stored edge row could not be decoded.
    #[error("invalid stored data")]
    InvalidData,
    /// A conflicting concurrent mutation or a locked index was observed.
    #[error("data conflict")]
    DataConflict,
    /// The partition does not exist in the store.
    #[error("partition not found")]
    PartNotFound,
    /// The store failed to complete a scan or batch commit.
    #[error("store failure")]
    StoreFailure,
}

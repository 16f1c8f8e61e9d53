//! Checkpoint error types.

use crate::core::TreeError;
use thiserror::Error;

/// Errors that can occur while writing or restoring checkpoints
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint was written by an incompatible format version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpoint data is internally inconsistent
    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(String),

    /// The snapshotted tree breaks a structural rule
    #[error("Checkpoint tree cannot be rebuilt: {0}")]
    Restore(#[from] TreeError),
}

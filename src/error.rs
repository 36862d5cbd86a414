//! The single error type shared by every stage of the pipeline.
//!
//! Codec-level inconsistencies are never silently recovered: a corrupt chunk
//! fails its whole decode, and the orchestrator fails the whole call rather
//! than returning a partially reconstructed buffer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuffzipError {
    /// A user-supplied setting is unusable (zero chunk size, zero threads).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Decode-time inconsistency: malformed serialized tree, truncated bit
    /// buffer, or bits left over beyond the declared padding.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    /// Propagated opaquely from the byte-buffer boundary.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker task failed internally.
    #[error("worker task failed: {0}")]
    TaskFailure(String),
}

pub type Result<T> = std::result::Result<T, HuffzipError>;

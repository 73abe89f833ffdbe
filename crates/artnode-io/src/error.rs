//! Error types for host I/O.

/// Result type alias for host I/O operations.
pub type Result<T> = std::result::Result<T, IoError>;

/// Errors raised while loading or persisting node state on the host.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON parsing failed
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// RON serialization failed
    #[error("RON error: {0}")]
    RonWrite(#[from] ron::Error),

    /// File extension not understood
    #[error("Unsupported params format: {0}")]
    UnsupportedFormat(String),

    /// Params file exceeds the size limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        /// Actual size in bytes
        size: u64,
        /// Allowed size in bytes
        limit: u64,
    },

    /// Params file written by an incompatible version
    #[error("Params version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build writes
        expected: String,
        /// Version found in the file
        found: String,
    },

    /// Node configuration rejected by the engine
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] artnode_core::NodeError),
}

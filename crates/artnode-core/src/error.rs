//! Error types for the node engine
use thiserror::Error;

/// Node engine errors
///
/// Only configuration and explicit setter calls return these. Packet handling
/// never fails: malformed or foreign traffic is dropped.
#[derive(Error, Debug)]
pub enum NodeError {
    /// Port index outside `0..MAX_PORTS`
    #[error("Invalid port index: {0}")]
    InvalidPort(usize),

    /// Port-Address above the 15-bit range
    #[error("Invalid port address: {0:#06x}")]
    InvalidPortAddress(u16),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Optional subsystem required but not attached
    #[error("Subsystem not available: {0}")]
    NotAvailable(&'static str),

    /// I/O error reported by a collaborator
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for node operations
pub type Result<T> = std::result::Result<T, NodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(NodeError::InvalidPort(7).to_string(), "Invalid port index: 7");
        assert_eq!(
            NodeError::InvalidPortAddress(0x8000).to_string(),
            "Invalid port address: 0x8000"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "flash busy");
        let err: NodeError = io.into();
        assert!(err.to_string().contains("flash busy"));
    }
}

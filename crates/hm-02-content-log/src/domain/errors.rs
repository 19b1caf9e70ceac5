//! Error types for the content log.

use thiserror::Error;

/// Errors returned by log queries. Appends cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    /// Leaf index past the end of the log.
    #[error("Leaf index {index} out of range (log has {len} leaves)")]
    IndexOutOfRange { index: usize, len: usize },
}

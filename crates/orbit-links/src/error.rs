//! Error types for orbit-links.

use thiserror::Error;

use crate::NodeId;

/// Result type for orbit-links operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during link topology operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// `update_links` was called before a satellite was mounted, or the
    /// mounted satellite no longer exists.
    #[error("satellite not mounted")]
    NotMounted,

    /// The protocol does not manage this kind of topology change.
    #[error("{operation} not implemented")]
    Unsupported { operation: &'static str },

    /// A link was requested between a node and itself.
    #[error("cannot link node {0} to itself")]
    SelfLink(NodeId),

    /// The registry has no node with this id.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Configuration value out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

//! Model error types

use crate::id::{EdgeId, GroupId, NodeId};

/// Errors raised by graph and catalog operations
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Actor id already present in the graph
    #[error("duplicate node: {0}")]
    DuplicateNode(NodeId),

    /// Relation id already present in the graph
    #[error("duplicate edge: {0}")]
    DuplicateEdge(EdgeId),

    /// Group id already present in the graph
    #[error("duplicate group: {0}")]
    DuplicateGroup(GroupId),

    /// Referenced actor does not exist
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Referenced group does not exist
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// Malformed fingerprint string
    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    /// JSON encoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

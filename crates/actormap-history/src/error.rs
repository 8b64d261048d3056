//! Error types for snapshot capture

use actormap_model::ModelError;
use actormap_timeline::TimelineError;
use thiserror::Error;

/// Errors raised while building or hashing snapshots
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Raw state collection did not form a valid timeline
    #[error("invalid timeline in snapshot: {0}")]
    Timeline(#[from] TimelineError),

    /// Encoding failed
    #[error(transparent)]
    Model(#[from] ModelError),
}

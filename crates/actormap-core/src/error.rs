//! Error types for the document coordinator
//!
//! Nothing here is fatal: every error leaves the live document, timeline
//! and history exactly as they were before the call.

use actormap_model::{DocumentId, StateId};
use actormap_timeline::TimelineError;

/// Coordinator error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinatorError {
    /// Operation needs an active document
    #[error("no active document")]
    NoActiveDocument,

    /// Document id is not open
    #[error("document not open: {0}")]
    UnknownDocument(DocumentId),

    /// Document id is already open
    #[error("document already open: {0}")]
    DocumentAlreadyOpen(DocumentId),

    /// Timeline operation on a document without a timeline
    #[error("timeline not initialized for document {0}")]
    TimelineNotInitialized(DocumentId),

    /// Second initialization of a document's timeline
    #[error("timeline already initialized for document {0}")]
    TimelineAlreadyInitialized(DocumentId),

    /// State id not in the active timeline
    #[error("state not found: {0}")]
    StateNotFound(StateId),

    /// Valid target, structurally disallowed (root or current state)
    #[error("{reason}")]
    Forbidden { reason: String },

    /// The user declined to delete a state with children
    #[error("deletion of state {state} was not confirmed")]
    ConfirmationDeclined { state: StateId },

    /// Undo stack is empty
    #[error("nothing to undo")]
    NothingToUndo,

    /// Redo stack is empty
    #[error("nothing to redo")]
    NothingToRedo,

    /// Any other timeline failure
    #[error("timeline error: {0}")]
    Timeline(TimelineError),
}

impl From<TimelineError> for CoordinatorError {
    fn from(err: TimelineError) -> Self {
        match err {
            TimelineError::StateNotFound(id) => Self::StateNotFound(id),
            e if e.is_structural_guard() => Self::Forbidden {
                reason: e.to_string(),
            },
            e => Self::Timeline(e),
        }
    }
}

impl CoordinatorError {
    /// Shown to the user as an error toast
    #[inline]
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Forbidden { .. } | Self::StateNotFound(_) | Self::Timeline(_)
        )
    }

    /// Empty stack; callers usually disable the button instead
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NothingToUndo | Self::NothingToRedo)
    }
}

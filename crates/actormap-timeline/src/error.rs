//! Timeline error types

use crate::validation::TimelineViolation;
use actormap_model::StateId;

/// Errors raised by timeline operations
///
/// `StateNotFound` covers unknown ids; the `CannotDelete*` variants cover
/// valid ids whose operation is structurally disallowed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    /// No state with this id
    #[error("state not found: {0}")]
    StateNotFound(StateId),

    /// The root state can never be deleted
    #[error("cannot delete the root state {0}")]
    CannotDeleteRoot(StateId),

    /// The active state can never be deleted
    #[error("cannot delete the current state {0}; switch to another state first")]
    CannotDeleteCurrent(StateId),

    /// Deleting would orphan children; caller must confirm first
    #[error("state {state} has {} child state(s); deletion requires confirmation", .children.len())]
    ConfirmationRequired {
        state: StateId,
        children: Vec<StateId>,
    },

    /// A sibling of the root would be a second parentless state
    #[error("cannot duplicate the root state {0} as a sibling; duplicate it as a child instead")]
    CannotDuplicateRoot(StateId),

    /// Same id appears twice in a state collection
    #[error("duplicate state id: {0}")]
    DuplicateState(StateId),

    /// Keyed collection entry disagrees with the id inside its state
    #[error("state keyed as {key} carries id {id}")]
    KeyMismatch { key: StateId, id: StateId },

    /// Structural invariants do not hold
    #[error("invalid timeline: {}", format_violations(.0))]
    Invalid(Vec<TimelineViolation>),
}

fn format_violations(violations: &[TimelineViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TimelineError {
    /// Unknown id, as opposed to a valid id whose operation is disallowed
    #[inline]
    #[must_use]
    pub fn is_missing_state(&self) -> bool {
        matches!(self, Self::StateNotFound(_))
    }

    /// Valid id, operation disallowed by the tree structure
    #[inline]
    #[must_use]
    pub fn is_structural_guard(&self) -> bool {
        matches!(
            self,
            Self::CannotDeleteRoot(_) | Self::CannotDeleteCurrent(_) | Self::CannotDuplicateRoot(_)
        )
    }
}

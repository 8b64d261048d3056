//! Structural validation of a timeline
//!
//! The tree invariants are: current and root exist, the root has no parent,
//! every other state has a parent, and parent links never loop. A missing
//! parent (an orphan left behind by a deletion under
//! [`OrphanPolicy::Retain`](crate::OrphanPolicy::Retain)) is reported but is
//! not fatal.

use crate::repr::StateMap;
use actormap_model::StateId;
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// One broken invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineViolation {
    /// `currentStateId` points at nothing
    MissingCurrent(StateId),
    /// `rootStateId` points at nothing
    MissingRoot(StateId),
    /// The root declares a parent
    RootHasParent { root: StateId, parent: StateId },
    /// A non-root state without any parent link
    DetachedState(StateId),
    /// A state whose parent no longer exists
    MissingParent { state: StateId, parent: StateId },
    /// Parent links loop through these states
    Cycle(Vec<StateId>),
}

impl TimelineViolation {
    /// Whether the timeline can still be navigated
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MissingParent { .. })
    }
}

impl Display for TimelineViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCurrent(id) => write!(f, "current state {id} does not exist"),
            Self::MissingRoot(id) => write!(f, "root state {id} does not exist"),
            Self::RootHasParent { root, parent } => {
                write!(f, "root state {root} has parent {parent}")
            }
            Self::DetachedState(id) => write!(f, "state {id} has no parent but is not the root"),
            Self::MissingParent { state, parent } => {
                write!(f, "state {state} has missing parent {parent}")
            }
            Self::Cycle(ids) => {
                let path: Vec<&str> = ids.iter().map(StateId::as_str).collect();
                write!(f, "parent cycle through {}", path.join(" -> "))
            }
        }
    }
}

pub(crate) fn validate(states: &StateMap, current: &StateId, root: &StateId) -> Vec<TimelineViolation> {
    let mut out = Vec::new();

    if !states.contains_key(current) {
        out.push(TimelineViolation::MissingCurrent(current.clone()));
    }
    match states.get(root) {
        None => out.push(TimelineViolation::MissingRoot(root.clone())),
        Some(state) => {
            if let Some(parent) = &state.parent_state_id {
                out.push(TimelineViolation::RootHasParent {
                    root: root.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    for (id, state) in states {
        if id == root {
            continue;
        }
        match &state.parent_state_id {
            None => out.push(TimelineViolation::DetachedState(id.clone())),
            Some(parent) if !states.contains_key(parent) => {
                out.push(TimelineViolation::MissingParent {
                    state: id.clone(),
                    parent: parent.clone(),
                });
            }
            Some(_) => {}
        }
    }

    out.extend(find_cycles(states).into_iter().map(TimelineViolation::Cycle));
    out
}

/// Each cycle is reported once, listed from the state where it was entered
fn find_cycles(states: &StateMap) -> Vec<Vec<StateId>> {
    let mut cleared: HashSet<&StateId> = HashSet::new();
    let mut cycles = Vec::new();

    for start in states.keys() {
        if cleared.contains(start) {
            continue;
        }
        let mut path: Vec<&StateId> = Vec::new();
        let mut on_path: HashSet<&StateId> = HashSet::new();
        let mut cursor = Some(start);

        while let Some(id) = cursor {
            if cleared.contains(id) {
                break;
            }
            if on_path.contains(id) {
                let entry = path.iter().position(|p| *p == id).unwrap_or(0);
                cycles.push(path[entry..].iter().map(|p| (*p).clone()).collect());
                break;
            }
            on_path.insert(id);
            path.push(id);
            cursor = states
                .get(id)
                .and_then(|s| s.parent_state_id.as_ref())
                .filter(|p| states.contains_key(*p));
        }
        cleared.extend(path);
    }
    cycles
}

//! The per-document state tree
//!
//! [`Timeline`] owns every [`State`] of one document, a fixed root, and a
//! movable "current" pointer. Operations here are pure tree bookkeeping; the
//! live graph is passed in and handed back by value, so the caller decides
//! when the canvas is read and written.

use crate::error::TimelineError;
use crate::repr::{StateMap, StatesRepr};
use crate::state::{State, StateUpdate, COPY_SUFFIX, INITIAL_STATE_LABEL};
use crate::validation::{self, TimelineViolation};
use actormap_model::{Graph, StateId};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// What happens to the children of a deleted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Children are re-pointed at the deleted state's parent
    #[default]
    ReparentToGrandparent,
    /// Children keep their now-dangling parent id
    Retain,
}

/// Whether deleting a state with children has been confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Refuse if the state has children
    Guarded,
    /// The user accepted the effect on child states
    Confirmed,
}

/// Result of a successful deletion
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedState {
    pub state: State,
    /// Children moved to the deleted state's parent
    pub reparented: Vec<StateId>,
    /// Children left pointing at the deleted id
    pub orphaned: Vec<StateId>,
}

/// Tree of named graph snapshots for one document
///
/// # Invariants
/// - `current_state_id` and `root_state_id` reference existing states
/// - the root has no parent and never changes
/// - parent links never form a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTimeline")]
pub struct Timeline {
    states: StateMap,
    current_state_id: StateId,
    root_state_id: StateId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeline {
    states: StatesRepr,
    current_state_id: StateId,
    root_state_id: StateId,
}

impl TryFrom<RawTimeline> for Timeline {
    type Error = TimelineError;

    fn try_from(raw: RawTimeline) -> Result<Self, Self::Error> {
        Self::from_parts(raw.states, raw.current_state_id, raw.root_state_id)
    }
}

impl Timeline {
    /// Create a timeline whose root "Initial State" holds `initial_graph`
    #[must_use]
    pub fn new(initial_graph: Graph) -> Self {
        Self::with_root_label(INITIAL_STATE_LABEL, initial_graph)
    }

    #[must_use]
    pub fn with_root_label(label: impl Into<String>, initial_graph: Graph) -> Self {
        let root = State::new(label, None, initial_graph);
        let id = root.id.clone();
        let mut states = StateMap::new();
        states.insert(id.clone(), root);
        Self {
            states,
            current_state_id: id.clone(),
            root_state_id: id,
        }
    }

    /// Build from loaded parts
    ///
    /// Orphans (missing parents) are tolerated; every other violation is
    /// rejected.
    ///
    /// # Errors
    /// Returns error if the collection cannot be normalized or a fatal
    /// invariant does not hold
    pub fn from_parts(
        states: impl Into<StatesRepr>,
        current_state_id: StateId,
        root_state_id: StateId,
    ) -> Result<Self, TimelineError> {
        let states = states.into().into_map()?;
        let fatal: Vec<TimelineViolation> =
            validation::validate(&states, &current_state_id, &root_state_id)
                .into_iter()
                .filter(TimelineViolation::is_fatal)
                .collect();
        if !fatal.is_empty() {
            return Err(TimelineError::Invalid(fatal));
        }
        Ok(Self {
            states,
            current_state_id,
            root_state_id,
        })
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn current_state_id(&self) -> &StateId {
        &self.current_state_id
    }

    #[inline]
    #[must_use]
    pub fn root_state_id(&self) -> &StateId {
        &self.root_state_id
    }

    /// The active state
    #[must_use]
    pub fn current_state(&self) -> &State {
        &self.states[&self.current_state_id]
    }

    #[must_use]
    pub fn root_state(&self) -> &State {
        &self.states[&self.root_state_id]
    }

    #[inline]
    #[must_use]
    pub fn get_state(&self, id: &StateId) -> Option<&State> {
        self.states.get(id)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &StateId) -> bool {
        self.states.contains_key(id)
    }

    /// Direct children, found by scanning parent links
    #[must_use]
    pub fn get_child_states(&self, id: &StateId) -> Vec<&State> {
        self.states
            .values()
            .filter(|s| s.parent_state_id.as_ref() == Some(id))
            .collect()
    }

    #[must_use]
    pub fn get_all_states(&self) -> Vec<&State> {
        self.states.values().collect()
    }

    #[inline]
    #[must_use]
    pub fn states(&self) -> &StateMap {
        &self.states
    }

    #[inline]
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The state itself followed by each ancestor up to the root
    ///
    /// Stops early at a missing parent.
    #[must_use]
    pub fn ancestors(&self, id: &StateId) -> Vec<&State> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = self.states.get(id);
        while let Some(state) = cursor {
            if !seen.insert(&state.id) {
                break;
            }
            out.push(state);
            cursor = state
                .parent_state_id
                .as_ref()
                .and_then(|p| self.states.get(p));
        }
        out
    }

    /// Every state below `id`, breadth first
    #[must_use]
    pub fn descendants(&self, id: &StateId) -> Vec<&State> {
        let mut out = Vec::new();
        let mut seen: HashSet<&StateId> = HashSet::new();
        let mut queue: VecDeque<&StateId> = VecDeque::from([id]);
        while let Some(next) = queue.pop_front() {
            for child in self.get_child_states(next) {
                if seen.insert(&child.id) {
                    queue.push_back(&child.id);
                    out.push(child);
                }
            }
        }
        out
    }

    /// States whose parent id points at a deleted state
    #[must_use]
    pub fn orphaned_states(&self) -> Vec<&State> {
        self.states
            .values()
            .filter(|s| {
                s.parent_state_id
                    .as_ref()
                    .is_some_and(|p| !self.states.contains_key(p))
            })
            .collect()
    }

    /// Every broken invariant, fatal or not
    #[must_use]
    pub fn validate(&self) -> Vec<TimelineViolation> {
        validation::validate(&self.states, &self.current_state_id, &self.root_state_id)
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Write the live graph back into the current state
    ///
    /// Returns whether the stored payload changed; `updated_at` is only
    /// touched on change.
    pub fn capture_graph(&mut self, live: &Graph) -> bool {
        let current = self.current_state_id.clone();
        let Some(state) = self.states.get_mut(&current) else {
            return false;
        };
        if &state.graph == live {
            return false;
        }
        state.graph = live.clone();
        state.touch();
        true
    }

    /// Add a child of the current state and make it current
    ///
    /// The caller supplies the payload: a copy of the live graph to branch
    /// from the present, or an empty graph to start fresh.
    pub fn create_state(
        &mut self,
        label: impl Into<String>,
        description: Option<String>,
        graph: Graph,
    ) -> StateId {
        let state = State::new(label, Some(self.current_state_id.clone()), graph)
            .with_description(description);
        let id = state.id.clone();
        tracing::debug!(state_id = %id, parent = %self.current_state_id, "created timeline state");
        self.states.insert(id.clone(), state);
        self.current_state_id = id.clone();
        id
    }

    /// Move the current pointer to `id`
    ///
    /// `live` is first written back into the outgoing state. Returns the
    /// graph to load into the canvas, or `None` when `id` is already
    /// current (nothing is mutated in that case).
    ///
    /// # Errors
    /// Returns `StateNotFound` without mutating if `id` is unknown
    pub fn switch_to_state(&mut self, id: &StateId, live: &Graph) -> Result<Option<Graph>, TimelineError> {
        if id == &self.current_state_id {
            return Ok(None);
        }
        let target = self
            .states
            .get(id)
            .map(|s| s.graph.clone())
            .ok_or_else(|| TimelineError::StateNotFound(id.clone()))?;
        self.capture_graph(live);
        self.current_state_id = id.clone();
        Ok(Some(target))
    }

    /// Merge label, description and metadata changes into a state
    ///
    /// # Errors
    /// Returns `StateNotFound` if `id` is unknown
    pub fn update_state(&mut self, id: &StateId, update: StateUpdate) -> Result<&State, TimelineError> {
        let state = self
            .states
            .get_mut(id)
            .ok_or_else(|| TimelineError::StateNotFound(id.clone()))?;
        update.apply_to(state);
        Ok(state)
    }

    /// Remove a state that is neither the root nor current
    ///
    /// # Errors
    /// - `StateNotFound` for an unknown id
    /// - `CannotDeleteRoot` / `CannotDeleteCurrent` for guarded states
    /// - `ConfirmationRequired` if the state has children and `mode` is
    ///   [`DeleteMode::Guarded`]
    pub fn delete_state(
        &mut self,
        id: &StateId,
        mode: DeleteMode,
        policy: OrphanPolicy,
    ) -> Result<DeletedState, TimelineError> {
        if !self.states.contains_key(id) {
            return Err(TimelineError::StateNotFound(id.clone()));
        }
        if id == &self.root_state_id {
            return Err(TimelineError::CannotDeleteRoot(id.clone()));
        }
        if id == &self.current_state_id {
            return Err(TimelineError::CannotDeleteCurrent(id.clone()));
        }

        let children: Vec<StateId> = self
            .get_child_states(id)
            .into_iter()
            .map(|s| s.id.clone())
            .collect();
        if !children.is_empty() && mode == DeleteMode::Guarded {
            return Err(TimelineError::ConfirmationRequired {
                state: id.clone(),
                children,
            });
        }

        let state = self
            .states
            .shift_remove(id)
            .ok_or_else(|| TimelineError::StateNotFound(id.clone()))?;

        let (reparented, orphaned) = match policy {
            OrphanPolicy::ReparentToGrandparent => {
                for child in &children {
                    if let Some(child_state) = self.states.get_mut(child) {
                        child_state.parent_state_id.clone_from(&state.parent_state_id);
                        child_state.touch();
                    }
                }
                (children, Vec::new())
            }
            OrphanPolicy::Retain => (Vec::new(), children),
        };

        tracing::debug!(
            state_id = %id,
            reparented = reparented.len(),
            orphaned = orphaned.len(),
            "deleted timeline state"
        );
        Ok(DeletedState {
            state,
            reparented,
            orphaned,
        })
    }

    /// Copy a state as a parallel branch: same parent, copied graph
    ///
    /// The current pointer does not move.
    ///
    /// # Errors
    /// - `StateNotFound` for an unknown id
    /// - `CannotDuplicateRoot` when `id` is the root, which has no parent
    ///   to share
    pub fn duplicate_state(&mut self, id: &StateId, label: Option<String>) -> Result<StateId, TimelineError> {
        let source = self
            .states
            .get(id)
            .ok_or_else(|| TimelineError::StateNotFound(id.clone()))?;
        let Some(parent) = source.parent_state_id.clone() else {
            return Err(TimelineError::CannotDuplicateRoot(id.clone()));
        };
        Ok(self.insert_copy(id, parent, label))
    }

    /// Copy a state as its own child: a serial continuation
    ///
    /// # Errors
    /// Returns `StateNotFound` for an unknown id
    pub fn duplicate_state_as_child(&mut self, id: &StateId, label: Option<String>) -> Result<StateId, TimelineError> {
        if !self.states.contains_key(id) {
            return Err(TimelineError::StateNotFound(id.clone()));
        }
        Ok(self.insert_copy(id, id.clone(), label))
    }

    fn insert_copy(&mut self, source_id: &StateId, parent: StateId, label: Option<String>) -> StateId {
        let source = &self.states[source_id];
        let label = label.unwrap_or_else(|| format!("{}{COPY_SUFFIX}", source.label));
        let mut copy = State::new(label, Some(parent), source.graph.clone())
            .with_description(source.description.clone());
        copy.metadata = source.metadata.clone();
        let id = copy.id.clone();
        tracing::debug!(state_id = %id, source = %source_id, "duplicated timeline state");
        self.states.insert(id.clone(), copy);
        id
    }
}

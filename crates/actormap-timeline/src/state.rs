//! Timeline states
//!
//! A [`State`] is a named snapshot of the graph only. Types and labels are
//! document-global and never stored per state.

use actormap_model::{Attributes, Graph, StateId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label given to the root state of every new timeline
pub const INITIAL_STATE_LABEL: &str = "Initial State";

/// Suffix appended to the label of a duplicated state
pub const COPY_SUFFIX: &str = " (Copy)";

/// One node of the timeline tree
///
/// Only the parent link is stored; children are derived by scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub id: StateId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absent only for the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_state_id: Option<StateId>,
    #[serde(default)]
    pub graph: Graph,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: Attributes,
}

impl State {
    /// Create a state with a fresh id, stamped now
    #[must_use]
    pub fn new(label: impl Into<String>, parent: Option<StateId>, graph: Graph) -> Self {
        let now = Utc::now();
        Self {
            id: StateId::generate(),
            label: label.into(),
            description: None,
            parent_state_id: parent,
            graph,
            created_at: now,
            updated_at: now,
            metadata: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_state_id.is_none()
    }

    #[inline]
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Field changes for [`Timeline::update_state`](crate::Timeline::update_state)
///
/// `None` leaves a field untouched. Metadata entries are merged key by key;
/// a JSON `null` value removes the key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<Attributes>,
}

impl StateUpdate {
    /// Rename only
    #[must_use]
    pub fn rename(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value);
        self
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.description.is_none() && self.metadata.is_none()
    }

    pub(crate) fn apply_to(self, state: &mut State) {
        if let Some(label) = self.label {
            state.label = label;
        }
        if let Some(description) = self.description {
            state.description = Some(description);
        }
        if let Some(metadata) = self.metadata {
            for (key, value) in metadata {
                if value.is_null() {
                    state.metadata.remove(&key);
                } else {
                    state.metadata.insert(key, value);
                }
            }
        }
        state.touch();
    }
}

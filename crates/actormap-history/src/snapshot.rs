//! Snapshot codec
//!
//! [`capture`] turns the live graph, timeline and type catalog into one
//! owned [`DocumentSnapshot`]; [`restore`] is its exact inverse and the only
//! source of values written back into live stores. Both are pure.
//!
//! The live graph is folded into the snapshot's copy of the current state,
//! so a snapshot never carries a separate graph that could disagree with
//! its timeline.

use crate::error::HistoryError;
use actormap_model::{Fingerprint, Graph, StateId, TypeCatalog};
use actormap_timeline::{StatesRepr, Timeline};
use serde::{Deserialize, Serialize};

/// Deep copy of everything undo/redo restores
///
/// Wire shape: `{timeline: {states, currentStateId, rootStateId},
/// nodeTypes, edgeTypes, labels}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub timeline: Timeline,
    #[serde(flatten)]
    pub type_catalog: TypeCatalog,
}

impl DocumentSnapshot {
    /// Graph of the snapshot's current state
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.timeline.current_state().graph
    }

    #[inline]
    #[must_use]
    pub fn current_state_id(&self) -> &StateId {
        self.timeline.current_state_id()
    }

    /// Content hash over the canonical JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn fingerprint(&self) -> Result<Fingerprint, HistoryError> {
        Ok(Fingerprint::of(self)?)
    }
}

/// Values to write back into the live stores in one step
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredDocument {
    pub graph: Graph,
    pub timeline: Timeline,
    pub type_catalog: TypeCatalog,
}

/// Capture the live document into an independent snapshot
///
/// The live timeline is not modified; `live_graph` is written into the
/// snapshot's own copy of the current state.
#[must_use]
pub fn capture(live_graph: &Graph, live_timeline: &Timeline, live_catalog: &TypeCatalog) -> DocumentSnapshot {
    let mut timeline = live_timeline.clone();
    timeline.capture_graph(live_graph);
    DocumentSnapshot {
        timeline,
        type_catalog: live_catalog.clone(),
    }
}

/// Capture from a raw state collection in any accepted form
///
/// # Errors
/// Returns error if the collection does not normalize into a valid timeline
pub fn capture_parts(
    live_graph: &Graph,
    states: impl Into<StatesRepr>,
    current_state_id: StateId,
    root_state_id: StateId,
    live_catalog: &TypeCatalog,
) -> Result<DocumentSnapshot, HistoryError> {
    let timeline = Timeline::from_parts(states, current_state_id, root_state_id)?;
    Ok(capture(live_graph, &timeline, live_catalog))
}

/// Unpack a snapshot into the values for the live stores
#[must_use]
pub fn restore(snapshot: &DocumentSnapshot) -> RestoredDocument {
    restore_owned(snapshot.clone())
}

/// Consuming form of [`restore`]
#[must_use]
pub fn restore_owned(snapshot: DocumentSnapshot) -> RestoredDocument {
    let graph = snapshot.timeline.current_state().graph.clone();
    RestoredDocument {
        graph,
        timeline: snapshot.timeline,
        type_catalog: snapshot.type_catalog,
    }
}

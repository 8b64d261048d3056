//! Document coordinator
//!
//! The only entry point UI handlers call. It owns every open [`Document`]
//! (and through it each timeline) plus one undo/redo history per document,
//! and enforces the ordering the lower layers cannot see:
//!
//! 1. Before any undoable mutation the live graph is written back into the
//!    current state, the document is captured, and the capture is pushed.
//! 2. Undo, redo, state switches and activation replace graph, timeline and
//!    type catalog through a single [`LiveStore::load_document_state`] call.
//! 3. Switching to the current state, or pushing with no active document,
//!    leaves the history untouched.

use crate::config::CoordinatorConfig;
use crate::document::Document;
use crate::error::CoordinatorError;
use crate::feedback::{TracingFeedback, UserFeedback};
use crate::live::{LiveStore, LoadDocumentState};
use crate::persist::{NoopNotifier, PersistNotifier};
use actormap_history::{
    capture, restore_owned, DocumentHistory, HistoryAction, HistoryRegistry, RestoredDocument,
};
use actormap_model::{DocumentId, Graph, StateId, TypeCatalog};
use actormap_timeline::{DeleteMode, DeletedState, OrphanPolicy, StateUpdate, Timeline, TimelineError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

#[derive(Debug, Clone)]
struct Gesture {
    document_id: DocumentId,
    description: String,
}

/// Façade over documents, timelines, histories and the live store
pub struct DocumentCoordinator<L: LiveStore> {
    config: CoordinatorConfig,
    live: Arc<L>,
    notifier: Arc<dyn PersistNotifier>,
    feedback: Arc<dyn UserFeedback>,
    documents: HashMap<DocumentId, Document>,
    histories: HistoryRegistry,
    active: Option<DocumentId>,
    gesture: Option<Gesture>,
}

impl<L: LiveStore> std::fmt::Debug for DocumentCoordinator<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCoordinator")
            .field("config", &self.config)
            .field("documents", &self.documents.len())
            .field("active", &self.active)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}

impl<L: LiveStore> DocumentCoordinator<L> {
    /// Create a coordinator writing into `live`
    #[must_use]
    pub fn new(config: CoordinatorConfig, live: Arc<L>) -> Self {
        let histories = HistoryRegistry::new(config.history);
        Self {
            config,
            live,
            notifier: Arc::new(NoopNotifier),
            feedback: Arc::new(TracingFeedback),
            documents: HashMap::new(),
            histories,
            active: None,
            gesture: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn PersistNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_feedback(mut self, feedback: Arc<dyn UserFeedback>) -> Self {
        self.feedback = feedback;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn live(&self) -> &Arc<L> {
        &self.live
    }

    // ---------------------------------------------------------------------
    // Document lifecycle
    // ---------------------------------------------------------------------

    /// Register a document and give it an empty history
    ///
    /// The first document opened becomes active.
    ///
    /// # Errors
    /// Returns `DocumentAlreadyOpen` if the id is taken
    pub fn open_document(&mut self, document: Document) -> Result<DocumentId, CoordinatorError> {
        let id = document.id.clone();
        if self.documents.contains_key(&id) {
            return Err(self.reject(CoordinatorError::DocumentAlreadyOpen(id)));
        }
        info!(document_id = %id, title = %document.title, "document opened");
        self.histories.initialize(&id);
        self.documents.insert(id.clone(), document);
        if self.active.is_none() {
            self.activate_document(&id)?;
        }
        Ok(id)
    }

    /// Make `id` the active document
    ///
    /// The outgoing document keeps its live edits; the incoming one is
    /// loaded into the live store in one step.
    ///
    /// # Errors
    /// Returns `UnknownDocument` if `id` is not open
    pub fn activate_document(&mut self, id: &DocumentId) -> Result<(), CoordinatorError> {
        let Some(document) = self.documents.get(id) else {
            return Err(self.reject(CoordinatorError::UnknownDocument(id.clone())));
        };
        if self.active.as_ref() == Some(id) {
            debug!(document_id = %id, "document already active");
            return Ok(());
        }
        let load = LoadDocumentState {
            document_id: Some(id.clone()),
            graph: document
                .timeline
                .as_ref()
                .map_or_else(Graph::new, |t| t.current_state().graph.clone()),
            timeline: document.timeline.clone(),
            type_catalog: document.type_catalog.clone(),
        };

        self.sync_active();
        self.live.load_document_state(load);
        self.active = Some(id.clone());
        info!(document_id = %id, "document activated");
        Ok(())
    }

    /// Unregister a document and drop its history
    ///
    /// Returns the document with live edits folded in. Closing the active
    /// document empties the live store.
    ///
    /// # Errors
    /// Returns `UnknownDocument` if `id` is not open
    pub fn close_document(&mut self, id: &DocumentId) -> Result<Document, CoordinatorError> {
        if !self.documents.contains_key(id) {
            return Err(self.reject(CoordinatorError::UnknownDocument(id.clone())));
        }
        if self.active.as_ref() == Some(id) {
            self.sync_active();
            self.live.load_document_state(LoadDocumentState::empty());
            self.active = None;
        }
        self.histories.remove(id);
        let document = self
            .documents
            .remove(id)
            .ok_or_else(|| CoordinatorError::UnknownDocument(id.clone()))?;
        info!(document_id = %id, "document closed");
        Ok(document)
    }

    #[inline]
    #[must_use]
    pub fn active_document_id(&self) -> Option<&DocumentId> {
        self.active.as_ref()
    }

    /// Stored copy; for the active document this lags the live store
    #[must_use]
    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    #[must_use]
    pub fn document_ids(&self) -> Vec<&DocumentId> {
        self.documents.keys().collect()
    }

    /// Copy for the persistence layer, with live edits folded in
    ///
    /// # Errors
    /// Returns `UnknownDocument` if `id` is not open
    pub fn export_document(&self, id: &DocumentId) -> Result<Document, CoordinatorError> {
        let mut document = self
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| CoordinatorError::UnknownDocument(id.clone()))?;
        if self.active.as_ref() == Some(id) {
            if let Some(timeline) = document.timeline.as_mut() {
                timeline.capture_graph(&self.live.graph());
            }
            document.type_catalog = self.live.type_catalog();
        }
        Ok(document)
    }

    // ---------------------------------------------------------------------
    // Timeline
    // ---------------------------------------------------------------------

    /// Give the active document a timeline rooted at `initial_graph`
    ///
    /// # Errors
    /// - `NoActiveDocument`
    /// - `TimelineAlreadyInitialized` if the document has one; nothing
    ///   changes in that case
    pub fn initialize_timeline(&mut self, initial_graph: Graph) -> Result<StateId, CoordinatorError> {
        let id = self.active_id()?;
        let label = self.config.initial_state_label.clone();
        let document = self.document_mut(&id)?;
        if document.timeline.is_some() {
            warn!(document_id = %id, "timeline already initialized");
            return Err(CoordinatorError::TimelineAlreadyInitialized(id));
        }
        let timeline = Timeline::with_root_label(label, initial_graph.clone());
        let root = timeline.root_state_id().clone();
        document.timeline = Some(timeline);

        info!(document_id = %id, state_id = %root, "timeline initialized");
        self.publish(&id, initial_graph);
        self.changed(&id);
        Ok(root)
    }

    /// Timeline of the active document
    ///
    /// The current state's stored graph may lag the live graph until the
    /// next capture.
    ///
    /// # Errors
    /// `NoActiveDocument` or `TimelineNotInitialized`
    pub fn timeline(&self) -> Result<&Timeline, CoordinatorError> {
        let Some(id) = self.active.as_ref() else {
            warn!("no active document");
            return Err(CoordinatorError::NoActiveDocument);
        };
        self.timeline_of(id)
    }

    /// Branch from the current state and make the branch current
    ///
    /// With `clone_from_current` the new state starts from the live graph;
    /// otherwise it starts (and the canvas switches to) an empty graph.
    ///
    /// # Errors
    /// `NoActiveDocument` or `TimelineNotInitialized`
    pub fn create_state(
        &mut self,
        label: impl Into<String>,
        description: Option<String>,
        clone_from_current: bool,
    ) -> Result<StateId, CoordinatorError> {
        let id = self.active_with_timeline()?;
        let label = label.into();
        self.record(&id, format!("Create State: {label}"))?;

        let graph = if clone_from_current {
            self.live.graph()
        } else {
            Graph::new()
        };
        let state_id = self.timeline_mut(&id)?.create_state(label, description, graph.clone());

        self.publish(&id, graph);
        self.changed(&id);
        Ok(state_id)
    }

    /// Make `state_id` current and load its graph
    ///
    /// Switching to the state that is already current does nothing and
    /// records no history.
    ///
    /// # Errors
    /// `StateNotFound` if the id is not in the timeline; nothing changes
    pub fn switch_to_state(&mut self, state_id: &StateId) -> Result<(), CoordinatorError> {
        let id = self.active_with_timeline()?;
        let timeline = self.timeline_of(&id)?;
        if timeline.current_state_id() == state_id {
            debug!(state_id = %state_id, "already the current state; ignoring switch");
            return Ok(());
        }
        let Some(target) = timeline.get_state(state_id) else {
            warn!(state_id = %state_id, "switch to unknown state ignored");
            return Err(self.reject(CoordinatorError::StateNotFound(state_id.clone())));
        };
        let description = format!("Switch to State: {}", target.label);
        self.record(&id, description)?;

        let live_graph = self.live.graph();
        let graph = self
            .timeline_mut(&id)?
            .switch_to_state(state_id, &live_graph)?
            .unwrap_or(live_graph);

        debug!(document_id = %id, state_id = %state_id, "switched state");
        self.publish(&id, graph);
        self.changed(&id);
        Ok(())
    }

    /// Merge label, description and metadata into a state
    ///
    /// # Errors
    /// `StateNotFound` if the id is not in the timeline
    pub fn update_state(&mut self, state_id: &StateId, update: StateUpdate) -> Result<(), CoordinatorError> {
        let id = self.active_with_timeline()?;
        let Some(label) = self.timeline_of(&id)?.get_state(state_id).map(|s| s.label.clone()) else {
            return Err(self.reject(CoordinatorError::StateNotFound(state_id.clone())));
        };
        if update.is_empty() {
            return Ok(());
        }
        self.record(&id, format!("Update State: {label}"))?;
        self.timeline_mut(&id)?.update_state(state_id, update)?;

        self.publish(&id, self.live.graph());
        self.changed(&id);
        Ok(())
    }

    /// Delete a state that is neither the root nor current
    ///
    /// A state with children is only deleted after the user confirms; its
    /// children are then handled per the configured [`OrphanPolicy`].
    ///
    /// # Errors
    /// - `StateNotFound`
    /// - `Forbidden` for the root or the current state
    /// - `ConfirmationDeclined` if the user says no
    pub fn delete_state(&mut self, state_id: &StateId) -> Result<DeletedState, CoordinatorError> {
        let id = self.active_with_timeline()?;
        let timeline = self.timeline_of(&id)?;
        let Some(state) = timeline.get_state(state_id) else {
            return Err(self.reject(CoordinatorError::StateNotFound(state_id.clone())));
        };
        let guard = if state_id == timeline.root_state_id() {
            Some(TimelineError::CannotDeleteRoot(state_id.clone()))
        } else if state_id == timeline.current_state_id() {
            Some(TimelineError::CannotDeleteCurrent(state_id.clone()))
        } else {
            None
        };
        if let Some(err) = guard {
            return Err(self.reject(err.into()));
        }

        let label = state.label.clone();
        let children = timeline.get_child_states(state_id).len();
        if children > 0 {
            let effect = match self.config.orphan_policy {
                OrphanPolicy::ReparentToGrandparent => "moved up one level",
                OrphanPolicy::Retain => "left without a parent",
            };
            let question =
                format!("\"{label}\" has {children} child state(s) that will be {effect}. Delete it anyway?");
            if !self.feedback.confirm(&question) {
                info!(state_id = %state_id, "state deletion declined");
                return Err(CoordinatorError::ConfirmationDeclined {
                    state: state_id.clone(),
                });
            }
        }

        self.record(&id, format!("Delete State: {label}"))?;
        let policy = self.config.orphan_policy;
        let deleted = self
            .timeline_mut(&id)?
            .delete_state(state_id, DeleteMode::Confirmed, policy)?;

        self.publish(&id, self.live.graph());
        self.changed(&id);
        Ok(deleted)
    }

    /// Copy a state as a sibling branch
    ///
    /// `label` defaults to the source label plus the configured suffix.
    ///
    /// # Errors
    /// - `StateNotFound`
    /// - `Forbidden` for the root, which has no parent to share
    pub fn duplicate_state(&mut self, state_id: &StateId, label: Option<String>) -> Result<StateId, CoordinatorError> {
        self.duplicate(state_id, label, false)
    }

    /// Copy a state as its own child
    ///
    /// # Errors
    /// `StateNotFound`
    pub fn duplicate_state_as_child(
        &mut self,
        state_id: &StateId,
        label: Option<String>,
    ) -> Result<StateId, CoordinatorError> {
        self.duplicate(state_id, label, true)
    }

    fn duplicate(&mut self, state_id: &StateId, label: Option<String>, as_child: bool) -> Result<StateId, CoordinatorError> {
        let id = self.active_with_timeline()?;
        let timeline = self.timeline_of(&id)?;
        let Some(source) = timeline.get_state(state_id) else {
            return Err(self.reject(CoordinatorError::StateNotFound(state_id.clone())));
        };
        if !as_child && source.parent_state_id.is_none() {
            return Err(self.reject(TimelineError::CannotDuplicateRoot(state_id.clone()).into()));
        }
        let source_label = source.label.clone();
        let label = label.unwrap_or_else(|| format!("{source_label}{}", self.config.copy_suffix));

        self.record(&id, format!("Duplicate State: {source_label}"))?;
        let timeline = self.timeline_mut(&id)?;
        let copy = if as_child {
            timeline.duplicate_state_as_child(state_id, Some(label))?
        } else {
            timeline.duplicate_state(state_id, Some(label))?
        };

        self.publish(&id, self.live.graph());
        self.changed(&id);
        Ok(copy)
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Record the live document as an undo target
    ///
    /// Call before mutating. With no active document this is a logged
    /// no-op.
    ///
    /// # Errors
    /// `TimelineNotInitialized` if the active document has no timeline
    pub fn push_to_history(&mut self, description: impl Into<String>) -> Result<(), CoordinatorError> {
        let Some(id) = self.active.clone() else {
            warn!("history push without an active document ignored");
            return Ok(());
        };
        self.record(&id, description.into())
    }

    /// Restore the document as it was before the last recorded action
    ///
    /// # Errors
    /// `NoActiveDocument`, `NothingToUndo`
    pub fn undo(&mut self) -> Result<(), CoordinatorError> {
        self.step(Direction::Undo)
    }

    /// Re-apply the last undone action
    ///
    /// # Errors
    /// `NoActiveDocument`, `NothingToRedo`
    pub fn redo(&mut self) -> Result<(), CoordinatorError> {
        self.step(Direction::Redo)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.active.as_ref().is_some_and(|id| self.histories.can_undo(id))
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.active.as_ref().is_some_and(|id| self.histories.can_redo(id))
    }

    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.histories.undo_description(self.active.as_ref()?)
    }

    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.histories.redo_description(self.active.as_ref()?)
    }

    /// History of any open document
    #[must_use]
    pub fn history(&self, id: &DocumentId) -> Option<&DocumentHistory> {
        self.histories.get(id)
    }

    /// Forget the active document's undo and redo entries
    pub fn clear_history(&mut self) {
        if let Some(id) = &self.active {
            self.histories.clear(id);
        }
    }

    fn step(&mut self, direction: Direction) -> Result<(), CoordinatorError> {
        let id = self.active_id()?;
        if self.gesture.take().is_some() {
            debug!(document_id = %id, "open gesture closed by {direction:?}");
        }
        let live_graph = self.live.graph();
        let live_catalog = self.live.type_catalog();
        let current = capture(&live_graph, self.timeline_of(&id)?, &live_catalog);

        let action = match direction {
            Direction::Undo => self.histories.undo(&id, current),
            Direction::Redo => self.histories.redo(&id, current),
        };
        let Some(action) = action else {
            debug!(document_id = %id, "{direction:?} stack empty");
            return Err(match direction {
                Direction::Undo => CoordinatorError::NothingToUndo,
                Direction::Redo => CoordinatorError::NothingToRedo,
            });
        };

        let RestoredDocument {
            graph,
            timeline,
            type_catalog,
        } = restore_owned(action.document_state);
        let document = self.document_mut(&id)?;
        document.timeline = Some(timeline.clone());
        document.type_catalog = type_catalog.clone();

        self.live.load_document_state(LoadDocumentState {
            document_id: Some(id.clone()),
            graph,
            timeline: Some(timeline),
            type_catalog,
        });
        info!(
            document_id = %id,
            description = %action.description,
            "{direction:?} applied"
        );
        self.changed(&id);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Direct edits
    // ---------------------------------------------------------------------

    /// Record, then edit the live graph
    ///
    /// Inside an open gesture nothing new is recorded.
    ///
    /// # Errors
    /// `NoActiveDocument`, `TimelineNotInitialized`
    pub fn mutate_graph<R>(
        &mut self,
        description: impl Into<String>,
        f: impl FnOnce(&mut Graph) -> R,
    ) -> Result<R, CoordinatorError> {
        let id = self.active_id()?;
        if !self.in_gesture(&id) {
            self.record(&id, description.into())?;
        }
        let mut graph = self.live.graph();
        let out = f(&mut graph);
        self.live.set_graph(graph);
        self.changed(&id);
        Ok(out)
    }

    /// Record, then edit the document-global type catalog
    ///
    /// # Errors
    /// `NoActiveDocument`, `TimelineNotInitialized`
    pub fn mutate_type_catalog<R>(
        &mut self,
        description: impl Into<String>,
        f: impl FnOnce(&mut TypeCatalog) -> R,
    ) -> Result<R, CoordinatorError> {
        let id = self.active_id()?;
        self.record(&id, description.into())?;
        let mut catalog = self.live.type_catalog();
        let out = f(&mut catalog);
        self.live.set_type_catalog(catalog);
        self.changed(&id);
        Ok(out)
    }

    /// Start a continuous edit such as a drag
    ///
    /// Records one history entry; further calls before
    /// [`end_gesture`](Self::end_gesture) are ignored. Returns whether a
    /// gesture was started.
    ///
    /// # Errors
    /// `NoActiveDocument`, `TimelineNotInitialized`
    pub fn begin_gesture(&mut self, description: impl Into<String>) -> Result<bool, CoordinatorError> {
        let id = self.active_id()?;
        if let Some(open) = &self.gesture {
            debug!(description = %open.description, "gesture already open");
            return Ok(false);
        }
        let description = description.into();
        self.record(&id, description.clone())?;
        self.gesture = Some(Gesture {
            document_id: id,
            description,
        });
        Ok(true)
    }

    /// Finish the open gesture, syncing the live graph into the current
    /// state once
    pub fn end_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        let live_graph = self.live.graph();
        if let Some(timeline) = self
            .documents
            .get_mut(&gesture.document_id)
            .and_then(|d| d.timeline.as_mut())
        {
            timeline.capture_graph(&live_graph);
        }
        debug!(description = %gesture.description, "gesture ended");
        self.publish(&gesture.document_id, live_graph);
        self.changed(&gesture.document_id);
        true
    }

    #[inline]
    #[must_use]
    pub fn gesture_open(&self) -> bool {
        self.gesture.is_some()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    /// Write live graph into the current state, capture, push
    ///
    /// Any open gesture ends here; later edits belong to the new action.
    fn record(&mut self, id: &DocumentId, description: String) -> Result<(), CoordinatorError> {
        if let Some(gesture) = self.gesture.take() {
            debug!(description = %gesture.description, "open gesture closed by {description}");
        }
        let live_graph = self.live.graph();
        let live_catalog = self.live.type_catalog();
        let timeline = self.timeline_mut(id)?;
        timeline.capture_graph(&live_graph);
        let snapshot = capture(&live_graph, timeline, &live_catalog);
        self.histories.push_action(id, HistoryAction::new(description, snapshot));
        Ok(())
    }

    /// Atomic write of `graph` with the document's timeline
    fn publish(&self, id: &DocumentId, graph: Graph) {
        self.live.load_document_state(LoadDocumentState {
            document_id: Some(id.clone()),
            graph,
            timeline: self.documents.get(id).and_then(|d| d.timeline.clone()),
            type_catalog: self.live.type_catalog(),
        });
    }

    fn changed(&mut self, id: &DocumentId) {
        if let Some(document) = self.documents.get_mut(id) {
            document.touch();
        }
        self.notifier.mark_dirty(id);
        self.notifier.schedule_persist(id);
    }

    /// Fold live edits back into the active document
    fn sync_active(&mut self) {
        self.gesture = None;
        let Some(id) = &self.active else {
            return;
        };
        if let Some(document) = self.documents.get_mut(id) {
            if let Some(timeline) = document.timeline.as_mut() {
                timeline.capture_graph(&self.live.graph());
            }
            document.type_catalog = self.live.type_catalog();
        }
    }

    fn in_gesture(&self, id: &DocumentId) -> bool {
        self.gesture.as_ref().is_some_and(|g| &g.document_id == id)
    }

    fn reject(&self, err: CoordinatorError) -> CoordinatorError {
        error!(error = %err, "operation rejected");
        if err.is_user_facing() {
            self.feedback.error(&err.to_string());
        }
        err
    }

    fn active_id(&self) -> Result<DocumentId, CoordinatorError> {
        self.active.clone().ok_or_else(|| {
            warn!("no active document");
            CoordinatorError::NoActiveDocument
        })
    }

    fn active_with_timeline(&self) -> Result<DocumentId, CoordinatorError> {
        let id = self.active_id()?;
        self.timeline_of(&id)?;
        Ok(id)
    }

    fn document_mut(&mut self, id: &DocumentId) -> Result<&mut Document, CoordinatorError> {
        self.documents
            .get_mut(id)
            .ok_or_else(|| CoordinatorError::UnknownDocument(id.clone()))
    }

    fn timeline_of(&self, id: &DocumentId) -> Result<&Timeline, CoordinatorError> {
        self.documents
            .get(id)
            .ok_or_else(|| CoordinatorError::UnknownDocument(id.clone()))?
            .timeline
            .as_ref()
            .ok_or_else(|| CoordinatorError::TimelineNotInitialized(id.clone()))
    }

    fn timeline_mut(&mut self, id: &DocumentId) -> Result<&mut Timeline, CoordinatorError> {
        self.document_mut(id)?
            .timeline
            .as_mut()
            .ok_or_else(|| CoordinatorError::TimelineNotInitialized(id.clone()))
    }
}

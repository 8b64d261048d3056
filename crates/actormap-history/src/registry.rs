//! Per-document history registry

use crate::history::{DocumentHistory, HistoryAction, HistoryConfig};
use crate::snapshot::DocumentSnapshot;
use actormap_model::DocumentId;
use std::collections::HashMap;
use tracing::debug;

/// One [`DocumentHistory`] per open document
///
/// Histories are created lazily on first push and dropped with
/// [`remove`](Self::remove) when the document closes. Documents never share
/// stacks.
#[derive(Debug, Default)]
pub struct HistoryRegistry {
    config: HistoryConfig,
    histories: HashMap<DocumentId, DocumentHistory>,
}

impl HistoryRegistry {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            histories: HashMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Create empty stacks for `id` unless they exist
    pub fn initialize(&mut self, id: &DocumentId) {
        self.histories.entry(id.clone()).or_default();
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.histories.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<&DocumentHistory> {
        self.histories.get(id)
    }

    /// Record a pre-mutation snapshot and invalidate redo
    ///
    /// The snapshot is moved in, so no caller can keep a handle into the
    /// stored copy.
    pub fn push_action(&mut self, id: &DocumentId, action: HistoryAction) {
        let history = self.histories.entry(id.clone()).or_default();
        history.push(action, &self.config);
        debug!(
            document_id = %id,
            undo_len = history.undo_len(),
            description = history.undo_description().unwrap_or_default(),
            "history push"
        );
    }

    /// Pop the newest undo entry, parking `current` on the redo stack
    pub fn undo(&mut self, id: &DocumentId, current: DocumentSnapshot) -> Option<HistoryAction> {
        let history = self.histories.get_mut(id)?;
        let action = history.undo(current, &self.config)?;
        debug!(
            document_id = %id,
            description = %action.description,
            undo_len = history.undo_len(),
            redo_len = history.redo_len(),
            "history undo"
        );
        Some(action)
    }

    /// Pop the newest redo entry, parking `current` on the undo stack
    pub fn redo(&mut self, id: &DocumentId, current: DocumentSnapshot) -> Option<HistoryAction> {
        let history = self.histories.get_mut(id)?;
        let action = history.redo(current, &self.config)?;
        debug!(
            document_id = %id,
            description = %action.description,
            undo_len = history.undo_len(),
            redo_len = history.redo_len(),
            "history redo"
        );
        Some(action)
    }

    #[must_use]
    pub fn can_undo(&self, id: &DocumentId) -> bool {
        self.histories.get(id).is_some_and(DocumentHistory::can_undo)
    }

    #[must_use]
    pub fn can_redo(&self, id: &DocumentId) -> bool {
        self.histories.get(id).is_some_and(DocumentHistory::can_redo)
    }

    #[must_use]
    pub fn undo_description(&self, id: &DocumentId) -> Option<&str> {
        self.histories.get(id)?.undo_description()
    }

    #[must_use]
    pub fn redo_description(&self, id: &DocumentId) -> Option<&str> {
        self.histories.get(id)?.redo_description()
    }

    /// Empty both stacks but keep the entry
    pub fn clear(&mut self, id: &DocumentId) {
        if let Some(history) = self.histories.get_mut(id) {
            history.clear();
        }
    }

    /// Drop the document's history entirely
    pub fn remove(&mut self, id: &DocumentId) -> Option<DocumentHistory> {
        let removed = self.histories.remove(id);
        if removed.is_some() {
            debug!(document_id = %id, "history dropped");
        }
        removed
    }

    /// Number of documents with a history
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::capture;
    use actormap_model::{Graph, TypeCatalog};
    use actormap_timeline::Timeline;

    fn snapshot() -> DocumentSnapshot {
        capture(&Graph::new(), &Timeline::new(Graph::new()), &TypeCatalog::new())
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut registry = HistoryRegistry::default();
        let doc = DocumentId::from("doc_a");
        registry.initialize(&doc);
        registry.push_action(&doc, HistoryAction::new("edit", snapshot()));

        registry.initialize(&doc);

        assert!(registry.can_undo(&doc));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn push_creates_history_lazily() {
        let mut registry = HistoryRegistry::default();
        let doc = DocumentId::from("doc_a");
        assert!(!registry.contains(&doc));

        registry.push_action(&doc, HistoryAction::new("edit", snapshot()));

        assert!(registry.contains(&doc));
        assert_eq!(registry.undo_description(&doc), Some("edit"));
    }

    #[test]
    fn documents_are_independent() {
        let mut registry = HistoryRegistry::default();
        let a = DocumentId::from("doc_a");
        let b = DocumentId::from("doc_b");
        registry.push_action(&a, HistoryAction::new("edit a", snapshot()));
        registry.initialize(&b);

        assert!(registry.can_undo(&a));
        assert!(!registry.can_undo(&b));
        assert!(registry.undo(&b, snapshot()).is_none());
        assert!(registry.undo(&a, snapshot()).is_some());
        assert!(registry.can_redo(&a));
        assert!(!registry.can_redo(&b));
    }

    #[test]
    fn unknown_document_answers_empty() {
        let mut registry = HistoryRegistry::default();
        let doc = DocumentId::from("doc_missing");

        assert!(!registry.can_undo(&doc));
        assert_eq!(registry.redo_description(&doc), None);
        assert!(registry.redo(&doc, snapshot()).is_none());
        assert!(!registry.contains(&doc));
    }

    #[test]
    fn clear_keeps_entry_remove_drops_it() {
        let mut registry = HistoryRegistry::default();
        let doc = DocumentId::from("doc_a");
        registry.push_action(&doc, HistoryAction::new("edit", snapshot()));

        registry.clear(&doc);
        assert!(registry.contains(&doc));
        assert!(!registry.can_undo(&doc));

        assert!(registry.remove(&doc).is_some());
        assert!(!registry.contains(&doc));
        assert!(registry.is_empty());
    }
}

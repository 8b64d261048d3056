//! Undo/redo stacks for one document
//!
//! Each [`HistoryAction`] holds the whole document as it was immediately
//! before a mutation. Undo swaps the live document for the top undo entry
//! and parks the live document on the redo stack; redo is the mirror image.

use crate::snapshot::DocumentSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default bound for both stacks
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Stack bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Oldest undo entries are evicted beyond this
    pub max_undo: usize,
    /// Oldest redo entries are evicted beyond this
    pub max_redo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_ENTRIES,
            max_redo: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl HistoryConfig {
    #[inline]
    #[must_use]
    pub fn with_max_undo(mut self, max: usize) -> Self {
        self.max_undo = max;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_redo(mut self, max: usize) -> Self {
        self.max_redo = max;
        self
    }
}

/// One undo/redo stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryAction {
    /// Human-readable, e.g. "Move Node" or "Switch to State: Q3"
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// The document to restore
    pub document_state: DocumentSnapshot,
}

impl HistoryAction {
    /// Stamp a snapshot with a description, now
    #[must_use]
    pub fn new(description: impl Into<String>, document_state: DocumentSnapshot) -> Self {
        Self {
            description: description.into(),
            timestamp: Utc::now(),
            document_state,
        }
    }
}

/// Undo and redo stacks of one document, oldest entry first
#[derive(Debug, Clone, Default)]
pub struct DocumentHistory {
    undo_stack: VecDeque<HistoryAction>,
    redo_stack: VecDeque<HistoryAction>,
}

impl DocumentHistory {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pre-mutation snapshot
    ///
    /// Evicts the oldest undo entries past the bound and always empties the
    /// redo stack: a new action invalidates every redo target.
    pub fn push(&mut self, action: HistoryAction, config: &HistoryConfig) {
        self.undo_stack.push_back(action);
        trim(&mut self.undo_stack, config.max_undo);
        self.redo_stack.clear();
    }

    /// Step back
    ///
    /// `current` is the live document right now; it becomes the redo target
    /// under the undone entry's description. Returns `None` without touching
    /// either stack when there is nothing to undo.
    pub fn undo(&mut self, current: DocumentSnapshot, config: &HistoryConfig) -> Option<HistoryAction> {
        let action = self.undo_stack.pop_back()?;
        self.redo_stack
            .push_back(HistoryAction::new(action.description.clone(), current));
        trim(&mut self.redo_stack, config.max_redo);
        Some(action)
    }

    /// Step forward; mirror image of [`undo`](Self::undo)
    pub fn redo(&mut self, current: DocumentSnapshot, config: &HistoryConfig) -> Option<HistoryAction> {
        let action = self.redo_stack.pop_back()?;
        self.undo_stack
            .push_back(HistoryAction::new(action.description.clone(), current));
        trim(&mut self.undo_stack, config.max_undo);
        Some(action)
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|a| a.description.as_str())
    }

    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|a| a.description.as_str())
    }

    #[inline]
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    #[inline]
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo descriptions, oldest first
    #[must_use]
    pub fn undo_descriptions(&self) -> Vec<&str> {
        self.undo_stack.iter().map(|a| a.description.as_str()).collect()
    }

    /// Redo descriptions, oldest first
    #[must_use]
    pub fn redo_descriptions(&self) -> Vec<&str> {
        self.redo_stack.iter().map(|a| a.description.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn trim(stack: &mut VecDeque<HistoryAction>, max: usize) {
    while stack.len() > max {
        stack.pop_front();
    }
}

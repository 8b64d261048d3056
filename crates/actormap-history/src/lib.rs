//! Actormap History
//!
//! Whole-document snapshots and the bounded undo/redo stacks built on them.
//!
//! # Core Concepts
//!
//! - [`DocumentSnapshot`]: owned copy of a timeline plus the type catalog
//! - [`capture`] / [`restore`]: the snapshot codec
//! - [`DocumentHistory`]: undo and redo stacks of one document
//! - [`HistoryRegistry`]: one history per open document
//!
//! # Example
//!
//! ```rust
//! use actormap_history::{capture, restore, HistoryAction, HistoryRegistry};
//! use actormap_model::{DocumentId, Graph, Node, TypeCatalog};
//! use actormap_timeline::Timeline;
//!
//! let doc = DocumentId::generate();
//! let catalog = TypeCatalog::default_catalog();
//! let timeline = Timeline::new(Graph::new());
//! let mut registry = HistoryRegistry::default();
//!
//! let mut live = Graph::new();
//! registry.push_action(&doc, HistoryAction::new("Add Actor", capture(&live, &timeline, &catalog)));
//! live.add_node(Node::new("a", "Alice", "actor")).unwrap();
//!
//! let undone = registry.undo(&doc, capture(&live, &timeline, &catalog)).unwrap();
//! let restored = restore(&undone.document_state);
//! assert!(restored.graph.is_empty());
//! assert_eq!(registry.redo_description(&doc), Some("Add Actor"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod history;
mod registry;
mod snapshot;

pub use error::HistoryError;
pub use history::{DocumentHistory, HistoryAction, HistoryConfig, DEFAULT_MAX_ENTRIES};
pub use registry::HistoryRegistry;
pub use snapshot::{capture, capture_parts, restore, restore_owned, DocumentSnapshot, RestoredDocument};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Actormap Core - Document Coordinator
//!
//! The façade UI event handlers call. It keeps three things consistent on
//! every edit, undo and redo:
//! - the live graph the canvas renders
//! - each document's [`Timeline`](actormap_timeline::Timeline) of states
//! - the per-document undo/redo history
//!
//! # Example
//!
//! ```rust
//! use actormap_core::prelude::*;
//! use actormap_model::{Graph, Node};
//!
//! let live = InMemoryLiveStore::shared();
//! let mut coordinator = DocumentCoordinator::new(CoordinatorConfig::new(), live.clone());
//!
//! coordinator.open_document(Document::new("Stakeholders")).unwrap();
//! coordinator.initialize_timeline(Graph::new()).unwrap();
//!
//! coordinator
//!     .mutate_graph("Add Actor", |g| g.add_node(Node::new("a", "Alice", "actor")))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(live.graph().node_count(), 1);
//!
//! coordinator.undo().unwrap();
//! assert!(live.graph().is_empty());
//! assert_eq!(coordinator.redo_description(), Some("Add Actor"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod feedback;
pub mod live;
pub mod persist;

pub use config::CoordinatorConfig;
pub use coordinator::DocumentCoordinator;
pub use document::{Document, DocumentError};
pub use error::CoordinatorError;
pub use feedback::{AutoConfirm, TracingFeedback, UserFeedback};
pub use live::{InMemoryLiveStore, LiveStore, LiveView, LoadDocumentState, SubscriptionId};
pub use persist::{DebouncedPersist, NoopNotifier, PersistNotifier, PersistSink};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a coordinator
    pub use crate::{
        CoordinatorConfig, CoordinatorError, Document, DocumentCoordinator, InMemoryLiveStore,
        LiveStore, PersistNotifier, UserFeedback,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use actormap_model::{Graph, Node};

    #[test]
    fn export_folds_live_edits_and_round_trips() {
        let live = InMemoryLiveStore::shared();
        let mut coordinator = DocumentCoordinator::new(CoordinatorConfig::new(), live.clone());
        let id = coordinator.open_document(Document::new("Board")).unwrap();
        coordinator.initialize_timeline(Graph::new()).unwrap();

        live.set_graph(Graph::with_nodes(vec![Node::new("a", "Alice", "actor")]));
        let exported = coordinator.export_document(&id).unwrap();
        assert_eq!(exported.timeline.as_ref().unwrap().current_state().graph.node_count(), 1);

        let json = exported.to_json_pretty().unwrap();
        assert_eq!(Document::from_json(&json).unwrap(), exported);
    }
}

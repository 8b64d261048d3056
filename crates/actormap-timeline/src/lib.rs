//! Actormap Timeline
//!
//! A per-document tree of named graph snapshots ("states") with one fixed
//! root and one movable "current" pointer.
//!
//! # Core Concepts
//!
//! - [`State`]: a named copy of the graph at one point of the analysis
//! - [`Timeline`]: the tree of states, stored as parent links only
//! - [`OrphanPolicy`]: what happens to children of a deleted state
//! - [`StatesRepr`]: accepted input forms of a state collection
//!
//! # Example
//!
//! ```rust
//! use actormap_model::{Graph, Node};
//! use actormap_timeline::Timeline;
//!
//! let mut timeline = Timeline::new(Graph::with_nodes(vec![Node::new("a", "Alice", "actor")]));
//! let root = timeline.root_state_id().clone();
//!
//! let live = timeline.current_state().graph.clone();
//! let q2 = timeline.create_state("Q2", None, live.clone());
//! assert_eq!(timeline.current_state_id(), &q2);
//!
//! let loaded = timeline.switch_to_state(&root, &live).unwrap();
//! assert!(loaded.is_some());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod repr;
mod state;
mod timeline;
mod validation;

pub use error::TimelineError;
pub use repr::{StateMap, StatesRepr};
pub use state::{State, StateUpdate, COPY_SUFFIX, INITIAL_STATE_LABEL};
pub use timeline::{DeleteMode, DeletedState, OrphanPolicy, Timeline};
pub use validation::TimelineViolation;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Actormap Model
//!
//! Value objects shared by every layer of the document state engine.
//!
//! # Core Concepts
//!
//! - [`Graph`]: actors ([`Node`]), relations ([`Edge`]) and visual [`Group`]s
//!   of one timeline state
//! - [`TypeCatalog`]: document-global node types, edge types and labels
//! - Typed string ids ([`DocumentId`], [`StateId`], [`NodeId`], ...)
//! - [`Fingerprint`]: Blake3 content hash for comparing values by content
//!
//! # Example
//!
//! ```rust
//! use actormap_model::{Edge, Graph, Node};
//!
//! let mut graph = Graph::new();
//! graph.add_node(Node::new("a", "Alice", "actor")).unwrap();
//! graph.add_node(Node::new("b", "Bob", "actor")).unwrap();
//! graph.add_edge(Edge::new("e1", "a", "b", "relation")).unwrap();
//!
//! assert!(graph.is_consistent());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod catalog;
mod error;
mod fingerprint;
mod graph;
mod id;

pub use catalog::{EdgeTypeDef, LabelDef, NodeTypeDef, TypeCatalog};
pub use error::ModelError;
pub use fingerprint::Fingerprint;
pub use graph::{DanglingReference, Edge, Graph, Group, Node, Position};
pub use id::{DocumentId, EdgeId, GroupId, LabelId, NodeId, StateId, TypeId};

/// Free-form JSON attribute map used by nodes, edges, groups and states
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

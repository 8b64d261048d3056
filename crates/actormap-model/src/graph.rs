//! Actor/relation graph value objects
//!
//! [`Graph`] is the payload stored in every timeline state and the value the
//! live canvas reads and overwrites. It is a plain owned value: cloning it
//! yields a structurally independent copy.

use crate::error::ModelError;
use crate::id::{EdgeId, GroupId, LabelId, NodeId, TypeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// Canvas coordinates of an actor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An actor on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub node_type: TypeId,
    #[serde(default)]
    pub position: Position,
    /// Group this actor is drawn inside, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelId>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Node {
    /// Create an actor at the origin
    #[must_use]
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, node_type: impl Into<TypeId>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type: node_type.into(),
            position: Position::default(),
            parent_group: None,
            labels: Vec::new(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    #[must_use]
    pub fn in_group(mut self, group: impl Into<GroupId>) -> Self {
        self.parent_group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<LabelId>) -> Self {
        self.labels.push(label.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A relation between two actors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_directed")]
    pub directed: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

fn default_directed() -> bool {
    true
}

impl Edge {
    /// Create a directed relation
    #[must_use]
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        edge_type: impl Into<TypeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_type: edge_type.into(),
            label: None,
            directed: true,
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn undirected(mut self) -> Self {
        self.directed = false;
        self
    }

    /// Whether this relation touches the given actor
    #[inline]
    #[must_use]
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}

/// A visual group of actors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub label: String,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub members: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Group {
    #[must_use]
    pub fn new(id: impl Into<GroupId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            collapsed: false,
            members: Vec::new(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn collapsed(mut self) -> Self {
        self.collapsed = true;
        self
    }
}

/// A reference inside a graph that points at something missing
///
/// Any graph reporting one of these is structurally invalid for the
/// rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingReference {
    /// Edge source actor does not exist
    EdgeSource { edge: EdgeId, node: NodeId },
    /// Edge target actor does not exist
    EdgeTarget { edge: EdgeId, node: NodeId },
    /// Actor declares a parent group that does not exist
    ParentGroup { node: NodeId, group: GroupId },
    /// Group lists a member actor that does not exist
    GroupMember { group: GroupId, node: NodeId },
}

impl Display for DanglingReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::EdgeSource { edge, node } => {
                write!(f, "edge {edge} has missing source {node}")
            }
            Self::EdgeTarget { edge, node } => {
                write!(f, "edge {edge} has missing target {node}")
            }
            Self::ParentGroup { node, group } => {
                write!(f, "node {node} declares missing parent group {group}")
            }
            Self::GroupMember { group, node } => {
                write!(f, "group {group} lists missing member {node}")
            }
        }
    }
}

/// Actors, relations and groups of one timeline state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Graph {
    /// Empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.groups.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    #[must_use]
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    /// Add an actor
    ///
    /// If the actor declares a parent group that exists, it is also listed
    /// as a member of that group.
    ///
    /// # Errors
    /// Returns error if an actor with the same id already exists
    pub fn add_node(&mut self, node: Node) -> Result<(), ModelError> {
        if self.node(&node.id).is_some() {
            return Err(ModelError::DuplicateNode(node.id));
        }
        if let Some(group_id) = &node.parent_group {
            if let Some(group) = self.groups.iter_mut().find(|g| &g.id == group_id) {
                if !group.members.contains(&node.id) {
                    group.members.push(node.id.clone());
                }
            }
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Remove an actor together with its incident relations and group
    /// memberships
    pub fn remove_node(&mut self, id: &NodeId) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| &n.id == id)?;
        let node = self.nodes.remove(idx);
        self.edges.retain(|e| !e.touches(id));
        for group in &mut self.groups {
            group.members.retain(|m| m != id);
        }
        Some(node)
    }

    /// Add a relation between two existing actors
    ///
    /// # Errors
    /// Returns error on duplicate id or missing endpoints
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), ModelError> {
        if self.edge(&edge.id).is_some() {
            return Err(ModelError::DuplicateEdge(edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if self.node(endpoint).is_none() {
                return Err(ModelError::NodeNotFound(endpoint.clone()));
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let idx = self.edges.iter().position(|e| &e.id == id)?;
        Some(self.edges.remove(idx))
    }

    /// Add a group
    ///
    /// # Errors
    /// Returns error if a group with the same id already exists
    pub fn add_group(&mut self, group: Group) -> Result<(), ModelError> {
        if self.group(&group.id).is_some() {
            return Err(ModelError::DuplicateGroup(group.id));
        }
        self.groups.push(group);
        Ok(())
    }

    /// Remove a group, releasing its members to the top level
    pub fn remove_group(&mut self, id: &GroupId) -> Option<Group> {
        let idx = self.groups.iter().position(|g| &g.id == id)?;
        let group = self.groups.remove(idx);
        for node in &mut self.nodes {
            if node.parent_group.as_ref() == Some(id) {
                node.parent_group = None;
            }
        }
        Some(group)
    }

    /// Move an actor into a group
    ///
    /// # Errors
    /// Returns error if either the actor or the group is missing
    pub fn assign_to_group(&mut self, node: &NodeId, group: &GroupId) -> Result<(), ModelError> {
        if self.group(group).is_none() {
            return Err(ModelError::GroupNotFound(group.clone()));
        }
        let previous = {
            let target = self
                .node_mut(node)
                .ok_or_else(|| ModelError::NodeNotFound(node.clone()))?;
            target.parent_group.replace(group.clone())
        };
        if let Some(previous) = previous {
            if let Some(old) = self.groups.iter_mut().find(|g| g.id == previous) {
                old.members.retain(|m| m != node);
            }
        }
        if let Some(new) = self.groups.iter_mut().find(|g| &g.id == group) {
            if !new.members.contains(node) {
                new.members.push(node.clone());
            }
        }
        Ok(())
    }

    /// Every reference that points at a missing actor or group
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let nodes: HashSet<&NodeId> = self.nodes.iter().map(|n| &n.id).collect();
        let groups: HashSet<&GroupId> = self.groups.iter().map(|g| &g.id).collect();
        let mut out = Vec::new();

        for edge in &self.edges {
            if !nodes.contains(&edge.source) {
                out.push(DanglingReference::EdgeSource {
                    edge: edge.id.clone(),
                    node: edge.source.clone(),
                });
            }
            if !nodes.contains(&edge.target) {
                out.push(DanglingReference::EdgeTarget {
                    edge: edge.id.clone(),
                    node: edge.target.clone(),
                });
            }
        }
        for node in &self.nodes {
            if let Some(group) = &node.parent_group {
                if !groups.contains(group) {
                    out.push(DanglingReference::ParentGroup {
                        node: node.id.clone(),
                        group: group.clone(),
                    });
                }
            }
        }
        for group in &self.groups {
            for member in &group.members {
                if !nodes.contains(member) {
                    out.push(DanglingReference::GroupMember {
                        group: group.id.clone(),
                        node: member.clone(),
                    });
                }
            }
        }
        out
    }

    /// True if no reference dangles
    #[inline]
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.dangling_references().is_empty()
    }
}

//! Document-global type catalog
//!
//! Node types, edge types and labels belong to the document, not to any
//! single timeline state. Switching states never touches the catalog.

use crate::id::{LabelId, TypeId};
use serde::{Deserialize, Serialize};

/// Definition of an actor type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDef {
    pub id: TypeId,
    pub name: String,
    pub color: String,
    #[serde(default = "default_shape")]
    pub shape: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_shape() -> String {
    "circle".to_string()
}

impl NodeTypeDef {
    #[must_use]
    pub fn new(id: impl Into<TypeId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            shape: default_shape(),
            description: None,
        }
    }
}

/// Definition of a relation type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeTypeDef {
    pub id: TypeId,
    pub name: String,
    pub color: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_true")]
    pub directed: bool,
}

fn default_style() -> String {
    "solid".to_string()
}

fn default_true() -> bool {
    true
}

impl EdgeTypeDef {
    #[must_use]
    pub fn new(id: impl Into<TypeId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            style: default_style(),
            directed: true,
        }
    }
}

/// Definition of a free-form label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDef {
    pub id: LabelId,
    pub name: String,
    pub color: String,
}

impl LabelDef {
    #[must_use]
    pub fn new(id: impl Into<LabelId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Node types, edge types and labels of one document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCatalog {
    #[serde(default)]
    pub node_types: Vec<NodeTypeDef>,
    #[serde(default)]
    pub edge_types: Vec<EdgeTypeDef>,
    #[serde(default)]
    pub labels: Vec<LabelDef>,
}

impl TypeCatalog {
    /// Empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded for new documents: one actor type, one relation type
    #[must_use]
    pub fn default_catalog() -> Self {
        Self {
            node_types: vec![NodeTypeDef::new("actor", "Actor", "#6366f1")],
            edge_types: vec![EdgeTypeDef::new("relation", "Relation", "#64748b")],
            labels: Vec::new(),
        }
    }

    #[must_use]
    pub fn node_type(&self, id: &TypeId) -> Option<&NodeTypeDef> {
        self.node_types.iter().find(|t| &t.id == id)
    }

    #[must_use]
    pub fn edge_type(&self, id: &TypeId) -> Option<&EdgeTypeDef> {
        self.edge_types.iter().find(|t| &t.id == id)
    }

    #[must_use]
    pub fn label(&self, id: &LabelId) -> Option<&LabelDef> {
        self.labels.iter().find(|l| &l.id == id)
    }

    /// Insert or replace a node type; returns the replaced definition
    pub fn upsert_node_type(&mut self, def: NodeTypeDef) -> Option<NodeTypeDef> {
        upsert(&mut self.node_types, def, |t| &t.id)
    }

    /// Insert or replace an edge type; returns the replaced definition
    pub fn upsert_edge_type(&mut self, def: EdgeTypeDef) -> Option<EdgeTypeDef> {
        upsert(&mut self.edge_types, def, |t| &t.id)
    }

    /// Insert or replace a label; returns the replaced definition
    pub fn upsert_label(&mut self, def: LabelDef) -> Option<LabelDef> {
        upsert(&mut self.labels, def, |l| &l.id)
    }

    pub fn remove_node_type(&mut self, id: &TypeId) -> Option<NodeTypeDef> {
        remove(&mut self.node_types, |t| &t.id == id)
    }

    pub fn remove_edge_type(&mut self, id: &TypeId) -> Option<EdgeTypeDef> {
        remove(&mut self.edge_types, |t| &t.id == id)
    }

    pub fn remove_label(&mut self, id: &LabelId) -> Option<LabelDef> {
        remove(&mut self.labels, |l| &l.id == id)
    }
}

fn upsert<T, K, F>(items: &mut Vec<T>, item: T, key: F) -> Option<T>
where
    K: PartialEq + ?Sized,
    F: Fn(&T) -> &K,
{
    match items.iter().position(|existing| key(existing) == key(&item)) {
        Some(idx) => Some(std::mem::replace(&mut items[idx], item)),
        None => {
            items.push(item);
            None
        }
    }
}

fn remove<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> Option<T> {
    let idx = items.iter().position(pred)?;
    Some(items.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_actor_and_relation() {
        let catalog = TypeCatalog::default_catalog();
        assert!(catalog.node_type(&TypeId::from("actor")).is_some());
        assert!(catalog.edge_type(&TypeId::from("relation")).is_some());
        assert!(catalog.labels.is_empty());
    }

    #[test]
    fn upsert_replaces_existing() {
        let mut catalog = TypeCatalog::default_catalog();
        let replaced = catalog.upsert_node_type(NodeTypeDef::new("actor", "Person", "#000000"));

        assert_eq!(replaced.unwrap().name, "Actor");
        assert_eq!(catalog.node_types.len(), 1);
        assert_eq!(catalog.node_type(&TypeId::from("actor")).unwrap().name, "Person");
    }

    #[test]
    fn upsert_appends_new() {
        let mut catalog = TypeCatalog::new();
        assert!(catalog.upsert_label(LabelDef::new("urgent", "Urgent", "#ff0000")).is_none());
        assert!(catalog.label(&LabelId::from("urgent")).is_some());
    }

    #[test]
    fn remove_returns_definition() {
        let mut catalog = TypeCatalog::default_catalog();
        let removed = catalog.remove_edge_type(&TypeId::from("relation"));
        assert!(removed.is_some());
        assert!(catalog.edge_types.is_empty());
        assert!(catalog.remove_edge_type(&TypeId::from("relation")).is_none());
    }

    #[test]
    fn camel_case_wire_shape() {
        let json = serde_json::to_value(TypeCatalog::default_catalog()).unwrap();
        assert!(json.get("nodeTypes").is_some());
        assert!(json.get("edgeTypes").is_some());
        assert!(json.get("labels").is_some());
    }
}

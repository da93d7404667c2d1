//! Render tree produced for a surface.
//!
//! A `RenderNode` keeps bindings as path strings: the tree records *where* a
//! renderer should look in the data model, never the looked-up value.
//! Children and templates are replaced by nested nodes.

use crate::component::Binding;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One materialized component instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    /// Component id plus one `:index` per enclosing template expansion.
    pub id: String,
    /// Type tag copied from the descriptor.
    #[serde(rename = "type")]
    pub component_type: String,
    /// Absolute data path of the current template element, empty outside templates.
    pub data_context_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub properties: BTreeMap<String, ResolvedValue>,
}

/// A property value after tree building.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    Literal(Value),
    Binding(Binding),
    Node(Box<RenderNode>),
    Nodes(Vec<RenderNode>),
    List(Vec<ResolvedValue>),
    Map(BTreeMap<String, ResolvedValue>),
}

impl ResolvedValue {
    pub fn as_node(&self) -> Option<&RenderNode> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_nodes(&self) -> Option<&[RenderNode]> {
        match self {
            Self::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    pub fn as_binding(&self) -> Option<&Binding> {
        match self {
            Self::Binding(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }

    fn for_each_node<'a>(&'a self, visit: &mut impl FnMut(&'a RenderNode)) {
        match self {
            Self::Node(node) => node.walk(visit),
            Self::Nodes(nodes) => nodes.iter().for_each(|node| node.walk(visit)),
            Self::List(items) => items.iter().for_each(|item| item.for_each_node(visit)),
            Self::Map(entries) => entries.values().for_each(|item| item.for_each_node(visit)),
            Self::Literal(_) | Self::Binding(_) => {}
        }
    }
}

impl RenderNode {
    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&ResolvedValue> {
        self.properties.get(name)
    }

    /// Child nodes stored under `name` (explicit list or template), empty if none.
    pub fn children(&self, name: &str) -> &[RenderNode] {
        self.property(name)
            .and_then(ResolvedValue::as_nodes)
            .unwrap_or_default()
    }

    /// Single child stored under `name`.
    pub fn child(&self, name: &str) -> Option<&RenderNode> {
        self.property(name).and_then(ResolvedValue::as_node)
    }

    /// Visit this node and every descendant, depth first, in property order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a RenderNode)) {
        visit(self);
        for value in self.properties.values() {
            value.for_each_node(visit);
        }
    }

    /// Find a node in this subtree by its (generated) id.
    pub fn find(&self, id: &str) -> Option<&RenderNode> {
        let mut found = None;
        self.walk(&mut |node| {
            if found.is_none() && node.id == id {
                found = Some(node);
            }
        });
        found
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

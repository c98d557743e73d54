use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{self, Bounds, Rect};
use crate::utils::new_identifier;
use crate::*;

macro_rules! identifier {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn generate() -> Self {
                Self(new_identifier())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(DiagramId);
identifier!(NodeId);
identifier!(EdgeId);

impl DiagramId {
    pub fn root() -> Self {
        Self(ROOT_DIAGRAM_ID.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NodeStyle {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.border_style.is_none() && self.icon.is_none()
    }

    /// Overlays every field that is set in `patch`.
    pub fn merge(&mut self, patch: &NodeStyle) {
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(border) = &patch.border_style {
            self.border_style = Some(border.clone());
        }
        if let Some(icon) = &patch.icon {
            self.icon = Some(icon.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
}

impl EdgeStyle {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.stroke_width.is_none() && self.dash_array.is_none()
    }

    pub fn merge(&mut self, patch: &EdgeStyle) {
        if let Some(color) = &patch.color {
            self.color = Some(color.clone());
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = Some(width);
        }
        if let Some(dash) = &patch.dash_array {
            self.dash_array = Some(dash.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    /// Centre of the node in diagram-local coordinates.
    pub position: Point,
    pub size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<DiagramId>,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            id,
            label: label.into(),
            position,
            size,
            description: None,
            tags: Vec::new(),
            style: NodeStyle::default(),
            child: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default, skip_serializing_if = "EdgeStyle::is_empty")]
    pub style: EdgeStyle,
}

impl Edge {
    pub fn new(id: EdgeId, from: NodeId, to: NodeId) -> Self {
        Self {
            id,
            from,
            to,
            label: String::new(),
            bidirectional: false,
            style: EdgeStyle::default(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from.as_str() == node_id || self.to.as_str() == node_id
    }

    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }
}

/// One canvas worth of nodes and edges.
///
/// Every edge endpoint resolves to a node of this diagram. Mutation goes
/// through the crate so the invariant cannot be broken from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub id: DiagramId,
    pub name: Option<String>,
    /// Diagram holding the node this diagram was expanded from.
    pub parent: Option<DiagramId>,
    pub parent_node: Option<NodeId>,
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
    edges: Vec<Edge>,
}

impl Diagram {
    pub fn new(id: DiagramId) -> Self {
        Self {
            id,
            name: None,
            parent: None,
            parent_node: None,
            nodes: HashMap::new(),
            order: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub(crate) fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.order.iter()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, edge_id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id.as_str() == edge_id)
    }

    pub(crate) fn edge_mut(&mut self, edge_id: &str) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|edge| edge.id.as_str() == edge_id)
    }

    pub fn contains_edge(&self, edge_id: &str) -> bool {
        self.edge(edge_id).is_some()
    }

    pub(crate) fn insert_node(&mut self, node: Node) {
        if !self.nodes.contains_key(&node.id) {
            self.order.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn insert_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Removes the node along with every edge attached to it.
    pub(crate) fn remove_node(&mut self, node_id: &str) -> Option<(Node, Vec<Edge>)> {
        let node = self.nodes.remove(node_id)?;
        self.order.retain(|id| id.as_str() != node_id);

        let (removed, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|edge| edge.touches(node_id));
        self.edges = kept;

        Some((node, removed))
    }

    pub(crate) fn remove_edge(&mut self, edge_id: &str) -> Option<Edge> {
        let index = self
            .edges
            .iter()
            .position(|edge| edge.id.as_str() == edge_id)?;
        Some(self.edges.remove(index))
    }

    /// Swaps in a complete node/edge set. Callers validate first.
    pub(crate) fn replace_contents(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes.clear();
        self.order.clear();
        for node in nodes {
            self.insert_node(node);
        }
        self.edges = edges;
    }

    pub fn edges_touching<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.touches(node_id))
    }

    /// Edges whose endpoints do not both resolve in this diagram.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|edge| !self.contains_node(edge.from.as_str()) || !self.contains_node(edge.to.as_str()))
            .collect()
    }

    pub fn edge_endpoints(&self, edge_id: &str) -> Option<(Point, Point)> {
        let edge = self.edge(edge_id)?;
        let from = self.node(edge.from.as_str())?;
        let to = self.node(edge.to.as_str())?;
        Some(geometry::edge_endpoints(&from.rect(), &to.rect()))
    }

    /// Nodes whose centre falls inside `rect`, in insertion order.
    pub fn nodes_in_rect(&self, rect: &Rect) -> Vec<NodeId> {
        self.nodes()
            .filter(|node| rect.contains(node.position))
            .map(|node| node.id.clone())
            .collect()
    }

    /// Topmost node under `point`; later nodes are drawn above earlier ones.
    pub fn node_at(&self, point: Point) -> Option<&Node> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.nodes.get(id))
            .find(|node| node.rect().contains(point))
    }

    pub fn bounds(&self) -> Bounds {
        geometry::bounds_of(self.nodes().map(Node::rect))
    }
}

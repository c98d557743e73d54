//! Owner of the diagram hierarchy and of all editing state.
//!
//! Node and edge commands address the *current* diagram, the last entry of the
//! navigation stack. The stack is always the ancestry path from the root to
//! the current diagram.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::diagram::{Diagram, DiagramId, Edge, EdgeId, EdgeStyle, Node, NodeId, NodeStyle};
use crate::error::{EditorError, EntityKind, Result};
use crate::geometry::{self, Rect};
use crate::utils::{sanitize_length, sanitize_point};
use crate::{Point, Size};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,
    Nodes(BTreeSet<NodeId>),
    Edge(EdgeId),
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn node_ids(&self) -> Vec<&NodeId> {
        match self {
            Selection::Nodes(ids) => ids.iter().collect(),
            _ => Vec::new(),
        }
    }

    pub fn edge_id(&self) -> Option<&EdgeId> {
        match self {
            Selection::Edge(id) => Some(id),
            _ => None,
        }
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        matches!(self, Selection::Nodes(ids) if ids.contains(node_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConnection {
    pub source: NodeId,
    pub cursor: Point,
    pub diagram: DiagramId,
}

/// Everything removed by a cascading node delete.
#[derive(Debug, Clone)]
pub struct NodeRemoval {
    pub node: Node,
    pub edges: Vec<Edge>,
    pub diagrams: Vec<DiagramId>,
}

#[derive(Debug, Clone)]
pub struct GraphStore {
    root: DiagramId,
    diagrams: HashMap<DiagramId, Diagram>,
    navigation: Vec<DiagramId>,
    selection: Selection,
    pending: Option<PendingConnection>,
    style_clipboard: Option<EdgeStyle>,
    node_size: Size,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(Size::default())
    }
}

impl GraphStore {
    pub fn new(node_size: Size) -> Self {
        let root = DiagramId::root();
        let mut root_diagram = Diagram::new(root.clone());
        root_diagram.name = Some("Root".to_string());

        let mut diagrams = HashMap::new();
        diagrams.insert(root.clone(), root_diagram);

        Self {
            root: root.clone(),
            diagrams,
            navigation: vec![root],
            selection: Selection::None,
            pending: None,
            style_clipboard: None,
            node_size,
        }
    }

    pub fn node_size(&self) -> Size {
        self.node_size
    }

    pub fn current_id(&self) -> &DiagramId {
        self.navigation.last().unwrap_or(&self.root)
    }

    pub fn current(&self) -> Result<&Diagram> {
        let id = self.current_id();
        self.diagrams
            .get(id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Diagram, id))
    }

    fn current_mut(&mut self) -> Result<&mut Diagram> {
        let id = self.current_id().clone();
        self.diagrams
            .get_mut(&id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Diagram, id))
    }

    pub fn diagram(&self, diagram_id: &DiagramId) -> Option<&Diagram> {
        self.diagrams.get(diagram_id)
    }

    pub fn diagram_ids(&self) -> impl Iterator<Item = &DiagramId> {
        self.diagrams.keys()
    }

    pub fn diagram_count(&self) -> usize {
        self.diagrams.len()
    }

    /// Root-to-current path.
    pub fn breadcrumb(&self) -> &[DiagramId] {
        &self.navigation
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pending(&self) -> Option<&PendingConnection> {
        self.pending.as_ref()
    }

    pub fn is_connecting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn create_diagram(&mut self) -> DiagramId {
        let id = DiagramId::generate();
        self.diagrams.insert(id.clone(), Diagram::new(id.clone()));
        debug!(diagram = %id, "created diagram");
        id
    }

    pub fn add_node(
        &mut self,
        diagram_id: &DiagramId,
        position: Point,
        label: impl Into<String>,
    ) -> Result<NodeId> {
        let size = self.node_size;
        let diagram = self
            .diagrams
            .get_mut(diagram_id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Diagram, diagram_id))?;

        let id = NodeId::generate();
        diagram.insert_node(Node::new(id.clone(), label, sanitize_point(position), size));
        debug!(diagram = %diagram_id, node = %id, "added node");
        Ok(id)
    }

    fn with_node<T>(&mut self, node_id: &NodeId, apply: impl FnOnce(&mut Node) -> T) -> Result<T> {
        let node = self
            .current_mut()?
            .node_mut(node_id.as_str())
            .ok_or_else(|| EditorError::not_found(EntityKind::Node, node_id))?;
        Ok(apply(node))
    }

    fn with_edge<T>(&mut self, edge_id: &EdgeId, apply: impl FnOnce(&mut Edge) -> T) -> Result<T> {
        let edge = self
            .current_mut()?
            .edge_mut(edge_id.as_str())
            .ok_or_else(|| EditorError::not_found(EntityKind::Edge, edge_id))?;
        Ok(apply(edge))
    }

    pub fn move_node(&mut self, node_id: &NodeId, position: Point) -> Result<()> {
        let position = sanitize_point(position);
        self.with_node(node_id, |node| node.position = position)
    }

    pub fn rename_node(&mut self, node_id: &NodeId, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        let child = self.with_node(node_id, |node| {
            node.label = label.clone();
            node.child.clone()
        })?;

        // Child diagrams are titled after their node.
        if let Some(diagram) = child.and_then(|id| self.diagrams.get_mut(&id)) {
            diagram.name = Some(label);
        }
        Ok(())
    }

    pub fn resize_node(&mut self, node_id: &NodeId, size: Size) -> Result<()> {
        let fallback = self.node_size;
        self.with_node(node_id, |node| {
            node.size = Size::new(
                sanitize_length(size.width, fallback.width),
                sanitize_length(size.height, fallback.height),
            );
        })
    }

    pub fn style_node(&mut self, node_id: &NodeId, patch: &NodeStyle) -> Result<()> {
        self.with_node(node_id, |node| node.style.merge(patch))
    }

    pub fn describe_node(&mut self, node_id: &NodeId, description: Option<String>) -> Result<()> {
        self.with_node(node_id, |node| {
            node.description = description.filter(|text| !text.is_empty());
        })
    }

    pub fn set_node_tags(&mut self, node_id: &NodeId, tags: Vec<String>) -> Result<()> {
        self.with_node(node_id, |node| {
            let mut seen = HashSet::new();
            node.tags = tags
                .iter()
                .map(|tag| tag.trim())
                .filter(|tag| !tag.is_empty() && seen.insert(*tag))
                .map(str::to_owned)
                .collect();
        })
    }

    /// Deletes the node, every edge attached to it and its whole child
    /// diagram subtree.
    pub fn delete_node(&mut self, node_id: &NodeId) -> Result<NodeRemoval> {
        let (node, edges) = self
            .current_mut()?
            .remove_node(node_id.as_str())
            .ok_or_else(|| EditorError::not_found(EntityKind::Node, node_id))?;

        let diagrams = match &node.child {
            Some(child) => self.remove_subtree(child.clone()),
            None => Vec::new(),
        };

        self.forget_selected(&[node.id.clone()], &edges);
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.source == node.id)
        {
            self.pending = None;
        }

        debug!(
            node = %node.id,
            edges = edges.len(),
            diagrams = diagrams.len(),
            "deleted node"
        );

        Ok(NodeRemoval {
            node,
            edges,
            diagrams,
        })
    }

    fn remove_subtree(&mut self, root: DiagramId) -> Vec<DiagramId> {
        let mut removed = Vec::new();
        let mut queue = vec![root];

        while let Some(id) = queue.pop() {
            if let Some(diagram) = self.diagrams.remove(&id) {
                queue.extend(diagram.nodes().filter_map(|node| node.child.clone()));
                removed.push(id);
            }
        }

        removed
    }

    fn forget_selected(&mut self, nodes: &[NodeId], edges: &[Edge]) {
        match &mut self.selection {
            Selection::Nodes(ids) => {
                for id in nodes {
                    ids.remove(id);
                }
                if ids.is_empty() {
                    self.selection = Selection::None;
                }
            }
            Selection::Edge(id) => {
                if edges.iter().any(|edge| edge.id == *id) {
                    self.selection = Selection::None;
                }
            }
            Selection::None => {}
        }
    }

    pub fn delete_edge(&mut self, edge_id: &EdgeId) -> Result<Edge> {
        let edge = self
            .current_mut()?
            .remove_edge(edge_id.as_str())
            .ok_or_else(|| EditorError::not_found(EntityKind::Edge, edge_id))?;

        if self.selection.edge_id() == Some(&edge.id) {
            self.selection = Selection::None;
        }

        debug!(edge = %edge.id, "deleted edge");
        Ok(edge)
    }

    pub fn reverse_edge(&mut self, edge_id: &EdgeId) -> Result<()> {
        self.with_edge(edge_id, Edge::reverse)
    }

    pub fn set_edge_label(&mut self, edge_id: &EdgeId, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        self.with_edge(edge_id, |edge| edge.label = label)
    }

    pub fn set_edge_bidirectional(&mut self, edge_id: &EdgeId, bidirectional: bool) -> Result<()> {
        self.with_edge(edge_id, |edge| edge.bidirectional = bidirectional)
    }

    pub fn style_edge(&mut self, edge_id: &EdgeId, patch: &EdgeStyle) -> Result<()> {
        self.with_edge(edge_id, |edge| edge.style.merge(patch))
    }

    pub fn copy_edge_style(&mut self, edge_id: &EdgeId) -> Result<()> {
        let style = self.with_edge(edge_id, |edge| edge.style.clone())?;
        self.style_clipboard = Some(style);
        Ok(())
    }

    /// Applies the copied style; returns `false` when nothing was copied yet.
    pub fn paste_edge_style(&mut self, edge_id: &EdgeId) -> Result<bool> {
        let Some(style) = self.style_clipboard.clone() else {
            // Still report unknown edges.
            self.with_edge(edge_id, |_| ())?;
            return Ok(false);
        };
        self.with_edge(edge_id, |edge| edge.style = style)?;
        Ok(true)
    }

    pub fn add_edge(&mut self, from: &NodeId, to: &NodeId) -> Result<EdgeId> {
        if from == to {
            return Err(EditorError::invalid_endpoints(
                from,
                to,
                "self-loops are not allowed",
            ));
        }

        let diagram = self.current_mut()?;
        if !diagram.contains_node(from.as_str()) {
            return Err(EditorError::invalid_endpoints(
                from,
                to,
                "source is not in the current diagram",
            ));
        }
        if !diagram.contains_node(to.as_str()) {
            return Err(EditorError::invalid_endpoints(
                from,
                to,
                "target is not in the current diagram",
            ));
        }

        let id = EdgeId::generate();
        diagram.insert_edge(Edge::new(id.clone(), from.clone(), to.clone()));
        debug!(edge = %id, %from, %to, "added edge");
        Ok(id)
    }

    /// Begins a connection drag. A drag already in progress is replaced.
    pub fn start_connecting(&mut self, from: &NodeId, cursor: Point) -> Result<()> {
        let diagram = self.current()?;
        if !diagram.contains_node(from.as_str()) {
            return Err(EditorError::not_found(EntityKind::Node, from));
        }
        let diagram_id = diagram.id.clone();

        if let Some(previous) = &self.pending {
            debug!(previous = %previous.source, "replacing pending connection");
        }

        self.pending = Some(PendingConnection {
            source: from.clone(),
            cursor: sanitize_point(cursor),
            diagram: diagram_id,
        });
        Ok(())
    }

    pub fn update_connecting(&mut self, cursor: Point) {
        if let Some(pending) = self.pending.as_mut() {
            pending.cursor = sanitize_point(cursor);
        }
    }

    /// Ends the drag. An edge is created only when `to` names another node of
    /// the current diagram; the pending connection is cleared either way.
    /// Navigation cancels a drag, so the source is always in the current
    /// diagram here.
    pub fn finish_connecting(&mut self, to: Option<&NodeId>) -> Option<EdgeId> {
        let pending = self.pending.take()?;
        let target = to?;

        match self.add_edge(&pending.source, target) {
            Ok(id) => Some(id),
            Err(err) => {
                debug!(error = %err, "dropped connection without an edge");
                None
            }
        }
    }

    pub fn cancel_connecting(&mut self) {
        self.pending = None;
    }

    /// Straight preview from the source border toward the cursor.
    pub fn pending_preview(&self) -> Option<(Point, Point)> {
        let pending = self.pending.as_ref()?;
        let node = self
            .diagrams
            .get(&pending.diagram)?
            .node(pending.source.as_str())?;
        let direction = Point::new(
            pending.cursor.x - node.position.x,
            pending.cursor.y - node.position.y,
        );
        let start = geometry::anchor_point(node.position, node.size, direction);
        Some((start, pending.cursor))
    }

    /// Opens the node's child diagram, creating it on first use.
    pub fn expand_node(&mut self, node_id: &NodeId) -> Result<DiagramId> {
        let parent = self.current_id().clone();
        let (existing, label) = self.with_node(node_id, |node| (node.child.clone(), node.label.clone()))?;

        let child = match existing {
            Some(child) if self.diagrams.contains_key(&child) => child,
            _ => {
                let child = self.create_diagram();
                if let Some(diagram) = self.diagrams.get_mut(&child) {
                    diagram.name = Some(label);
                    diagram.parent = Some(parent);
                    diagram.parent_node = Some(node_id.clone());
                }
                let linked = child.clone();
                self.with_node(node_id, |node| node.child = Some(linked))?;
                child
            }
        };

        self.enter(child.clone());
        Ok(child)
    }

    /// Goes up one level; a no-op at the root.
    pub fn collapse(&mut self) -> &DiagramId {
        if self.navigation.len() > 1 {
            let previous = self.navigation.clone();
            self.navigation.pop();
            self.on_navigated(&previous);
        }
        self.current_id()
    }

    pub fn navigate_to(&mut self, diagram_id: &DiagramId) -> Result<()> {
        if !self.diagrams.contains_key(diagram_id) {
            return Err(EditorError::not_found(EntityKind::Diagram, diagram_id));
        }
        self.enter(diagram_id.clone());
        Ok(())
    }

    fn enter(&mut self, diagram_id: DiagramId) {
        let path = self.ancestry(&diagram_id);
        let previous = std::mem::replace(&mut self.navigation, path);
        self.on_navigated(&previous);
    }

    fn ancestry(&self, diagram_id: &DiagramId) -> Vec<DiagramId> {
        let mut path = vec![diagram_id.clone()];
        if diagram_id == &self.root {
            return path;
        }
        let mut cursor = self.diagrams.get(diagram_id).and_then(|d| d.parent.clone());

        while let Some(parent) = cursor {
            // Guard against a corrupted parent chain looping forever.
            if path.contains(&parent) || path.len() > self.diagrams.len() {
                break;
            }
            cursor = self.diagrams.get(&parent).and_then(|d| d.parent.clone());
            path.push(parent);
        }

        path.reverse();
        if path.first() != Some(&self.root) {
            path.insert(0, self.root.clone());
        }
        path
    }

    fn on_navigated(&mut self, previous: &[DiagramId]) {
        if previous.last() == self.navigation.last() {
            return;
        }
        self.selection = Selection::None;
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| &pending.diagram != self.current_id())
        {
            self.pending = None;
        }
        debug!(diagram = %self.current_id(), depth = self.navigation.len() - 1, "navigated");
    }

    /// Replaces the node selection. Every id must be in the current diagram.
    pub fn set_selected_nodes<I>(&mut self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let ids: BTreeSet<NodeId> = ids.into_iter().collect();
        let diagram = self.current()?;
        if let Some(missing) = ids.iter().find(|id| !diagram.contains_node(id.as_str())) {
            return Err(EditorError::not_found(EntityKind::Node, missing));
        }

        self.selection = if ids.is_empty() {
            Selection::None
        } else {
            Selection::Nodes(ids)
        };
        Ok(())
    }

    pub fn set_selected_edge(&mut self, edge_id: Option<&EdgeId>) -> Result<()> {
        self.selection = match edge_id {
            Some(id) => {
                if !self.current()?.contains_edge(id.as_str()) {
                    return Err(EditorError::not_found(EntityKind::Edge, id));
                }
                Selection::Edge(id.clone())
            }
            None => Selection::None,
        };
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    pub fn select_all(&mut self) -> Result<()> {
        let ids: Vec<NodeId> = self.current()?.node_ids().cloned().collect();
        self.set_selected_nodes(ids)
    }

    /// Selects the nodes whose centres fall inside the marquee spanned by two
    /// world-space corners.
    pub fn select_in_marquee(&mut self, corner_a: Point, corner_b: Point) -> Result<usize> {
        let rect = Rect::from_corners(corner_a, corner_b);
        let ids = self.current()?.nodes_in_rect(&rect);
        let count = ids.len();
        self.set_selected_nodes(ids)?;
        Ok(count)
    }

    /// Deletes whatever is selected and returns the ids of diagrams that went
    /// with it.
    pub fn delete_selection(&mut self) -> Result<Vec<DiagramId>> {
        match std::mem::take(&mut self.selection) {
            Selection::None => Ok(Vec::new()),
            Selection::Edge(id) => {
                self.delete_edge(&id)?;
                Ok(Vec::new())
            }
            Selection::Nodes(ids) => {
                let mut removed = Vec::new();
                for id in ids {
                    // An earlier delete may already have taken this node.
                    match self.delete_node(&id) {
                        Ok(removal) => removed.extend(removal.diagrams),
                        Err(err) if err.is_not_found() => {}
                        Err(err) => return Err(err),
                    }
                }
                Ok(removed)
            }
        }
    }

    /// Swaps the current diagram's contents for an already validated set.
    ///
    /// Child links survive for node ids present before and after; other
    /// child subtrees are dropped and returned.
    pub(crate) fn replace_current(&mut self, mut nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Vec<DiagramId>> {
        let current = self.current()?;
        let mut links: HashMap<NodeId, DiagramId> = current
            .nodes()
            .filter_map(|node| node.child.clone().map(|child| (node.id.clone(), child)))
            .collect();

        for node in &mut nodes {
            node.child = links.remove(&node.id);
        }

        let mut removed = Vec::new();
        for (_, orphan) in links {
            removed.extend(self.remove_subtree(orphan));
        }

        self.current_mut()?.replace_contents(nodes, edges);
        self.selection = Selection::None;
        self.pending = None;
        Ok(removed)
    }
}

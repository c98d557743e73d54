//! The editor facade: one graph store, its viewports and the screen they are
//! drawn on.
//!
//! Every command that creates or removes diagrams goes through here so the
//! viewport records stay in step with the hierarchy.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::diagram::{DiagramId, Edge, EdgeId, EdgeStyle, Node, NodeId, NodeStyle};
use crate::document::ExportDocument;
use crate::error::Result;
use crate::geometry::{self, Bounds, Rect};
use crate::store::{GraphStore, Selection};
use crate::viewport::{Viewport, ViewportController, ZoomDirection};
use crate::*;

#[derive(Debug, Clone)]
pub struct Editor {
    store: GraphStore,
    viewports: ViewportController,
    config: EditorConfig,
    screen: Size,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Crumb {
    pub id: DiagramId,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    #[serde(flatten)]
    pub edge: Edge,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingView {
    pub source: NodeId,
    pub cursor: Point,
    pub start: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Minimap {
    pub scale: f32,
    pub bounds: Bounds,
    pub nodes: Vec<Rect>,
    pub viewport: Rect,
}

/// Read-only view of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub diagram: DiagramId,
    pub name: Option<String>,
    pub parent_node: Option<NodeId>,
    pub breadcrumb: Vec<Crumb>,
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeView>,
    pub selection: Selection,
    pub pending: Option<PendingView>,
    pub viewport: Viewport,
    pub screen: Size,
    pub bounds: Bounds,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let store = GraphStore::new(config.node_size());
        let mut viewports = ViewportController::new(config.zoom_limits());
        viewports.ensure(store.current_id());

        Self {
            store,
            viewports,
            screen: config.screen_size(),
            config,
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn viewports(&self) -> &ViewportController {
        &self.viewports
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    pub fn current_id(&self) -> &DiagramId {
        self.store.current_id()
    }

    pub fn viewport(&self) -> Result<Viewport> {
        self.viewports.get(self.store.current_id()).copied()
    }

    fn forget_viewports(&mut self, removed: &[DiagramId]) {
        for id in removed {
            self.viewports.remove(id);
        }
    }

    // Graph commands

    pub fn create_diagram(&mut self) -> DiagramId {
        let id = self.store.create_diagram();
        self.viewports.ensure(&id);
        id
    }

    pub fn add_node(&mut self, diagram_id: &DiagramId, position: Point, label: impl Into<String>) -> Result<NodeId> {
        self.store.add_node(diagram_id, position, label)
    }

    /// Adds a node to the current diagram at the world point under the
    /// centre of the screen.
    pub fn add_node_at_view_center(&mut self, label: Option<String>) -> Result<NodeId> {
        let center = Point::new(self.screen.width / 2.0, self.screen.height / 2.0);
        let world = self.viewports.screen_to_world(self.store.current_id(), center)?;
        let diagram = self.store.current_id().clone();
        self.store
            .add_node(&diagram, world, label.unwrap_or_else(|| DEFAULT_NODE_LABEL.to_string()))
    }

    pub fn move_node(&mut self, node_id: &NodeId, position: Point) -> Result<()> {
        self.store.move_node(node_id, position)
    }

    pub fn rename_node(&mut self, node_id: &NodeId, label: impl Into<String>) -> Result<()> {
        self.store.rename_node(node_id, label)
    }

    pub fn resize_node(&mut self, node_id: &NodeId, size: Size) -> Result<()> {
        self.store.resize_node(node_id, size)
    }

    pub fn style_node(&mut self, node_id: &NodeId, patch: &NodeStyle) -> Result<()> {
        self.store.style_node(node_id, patch)
    }

    pub fn describe_node(&mut self, node_id: &NodeId, description: Option<String>) -> Result<()> {
        self.store.describe_node(node_id, description)
    }

    pub fn set_node_tags(&mut self, node_id: &NodeId, tags: Vec<String>) -> Result<()> {
        self.store.set_node_tags(node_id, tags)
    }

    pub fn delete_node(&mut self, node_id: &NodeId) -> Result<()> {
        let removal = self.store.delete_node(node_id)?;
        self.forget_viewports(&removal.diagrams);
        Ok(())
    }

    pub fn add_edge(&mut self, from: &NodeId, to: &NodeId) -> Result<EdgeId> {
        self.store.add_edge(from, to)
    }

    pub fn delete_edge(&mut self, edge_id: &EdgeId) -> Result<()> {
        self.store.delete_edge(edge_id).map(|_| ())
    }

    pub fn reverse_edge(&mut self, edge_id: &EdgeId) -> Result<()> {
        self.store.reverse_edge(edge_id)
    }

    pub fn set_edge_label(&mut self, edge_id: &EdgeId, label: impl Into<String>) -> Result<()> {
        self.store.set_edge_label(edge_id, label)
    }

    pub fn set_edge_bidirectional(&mut self, edge_id: &EdgeId, bidirectional: bool) -> Result<()> {
        self.store.set_edge_bidirectional(edge_id, bidirectional)
    }

    pub fn style_edge(&mut self, edge_id: &EdgeId, patch: &EdgeStyle) -> Result<()> {
        self.store.style_edge(edge_id, patch)
    }

    pub fn copy_edge_style(&mut self, edge_id: &EdgeId) -> Result<()> {
        self.store.copy_edge_style(edge_id)
    }

    pub fn paste_edge_style(&mut self, edge_id: &EdgeId) -> Result<bool> {
        self.store.paste_edge_style(edge_id)
    }

    // Connection drag

    pub fn start_connecting(&mut self, from: &NodeId, cursor: Point) -> Result<()> {
        self.store.start_connecting(from, cursor)
    }

    pub fn update_connecting(&mut self, cursor: Point) {
        self.store.update_connecting(cursor);
    }

    pub fn finish_connecting(&mut self, to: Option<&NodeId>) -> Option<EdgeId> {
        self.store.finish_connecting(to)
    }

    pub fn cancel_connecting(&mut self) {
        self.store.cancel_connecting();
    }

    // Navigation

    pub fn expand_node(&mut self, node_id: &NodeId) -> Result<DiagramId> {
        let child = self.store.expand_node(node_id)?;
        self.viewports.ensure(&child);
        Ok(child)
    }

    pub fn collapse(&mut self) -> DiagramId {
        self.store.collapse().clone()
    }

    pub fn navigate_to(&mut self, diagram_id: &DiagramId) -> Result<()> {
        self.store.navigate_to(diagram_id)?;
        self.viewports.ensure(diagram_id);
        Ok(())
    }

    pub fn breadcrumb(&self) -> Vec<Crumb> {
        self.store
            .breadcrumb()
            .iter()
            .map(|id| Crumb {
                id: id.clone(),
                name: self.store.diagram(id).and_then(|d| d.name.clone()),
            })
            .collect()
    }

    // Selection

    pub fn set_selected_nodes(&mut self, ids: Vec<NodeId>) -> Result<()> {
        self.store.set_selected_nodes(ids)
    }

    pub fn set_selected_edge(&mut self, edge_id: Option<&EdgeId>) -> Result<()> {
        self.store.set_selected_edge(edge_id)
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    pub fn select_all(&mut self) -> Result<()> {
        self.store.select_all()
    }

    pub fn select_in_marquee(&mut self, corner_a: Point, corner_b: Point) -> Result<usize> {
        self.store.select_in_marquee(corner_a, corner_b)
    }

    pub fn delete_selection(&mut self) -> Result<()> {
        let removed = self.store.delete_selection()?;
        self.forget_viewports(&removed);
        Ok(())
    }

    /// Cancels a pending connection, else leaves a nested diagram, else
    /// clears the selection.
    pub fn escape(&mut self) {
        if self.store.is_connecting() {
            self.store.cancel_connecting();
        } else if self.store.breadcrumb().len() > 1 {
            self.store.collapse();
        } else {
            self.store.clear_selection();
        }
    }

    // Viewport

    pub fn set_zoom(&mut self, zoom: f32) -> Result<f32> {
        let id = self.store.current_id().clone();
        self.viewports.set_zoom(&id, zoom)
    }

    pub fn zoom_toward_cursor(&mut self, cursor: Point, direction: ZoomDirection) -> Result<Viewport> {
        let id = self.store.current_id().clone();
        self.viewports.zoom_toward_cursor(&id, cursor, direction)
    }

    /// One wheel tick; a zero delta leaves the viewport alone.
    pub fn wheel(&mut self, cursor: Point, delta_y: f32) -> Result<Viewport> {
        match ZoomDirection::from_wheel_delta(delta_y) {
            Some(direction) => self.zoom_toward_cursor(cursor, direction),
            None => self.viewport(),
        }
    }

    fn screen_center(&self) -> Point {
        Point::new(self.screen.width / 2.0, self.screen.height / 2.0)
    }

    pub fn zoom_in(&mut self) -> Result<Viewport> {
        self.zoom_toward_cursor(self.screen_center(), ZoomDirection::In)
    }

    pub fn zoom_out(&mut self) -> Result<Viewport> {
        self.zoom_toward_cursor(self.screen_center(), ZoomDirection::Out)
    }

    pub fn pan_by(&mut self, delta: Point) -> Result<Viewport> {
        let id = self.store.current_id().clone();
        self.viewports.pan_by(&id, delta)
    }

    pub fn reset_zoom(&mut self) -> Result<()> {
        let id = self.store.current_id().clone();
        self.viewports.reset_viewport(&id)
    }

    /// Zooms and pans so the padded bounds of the current diagram fill the
    /// screen, centred.
    pub fn fit_to_view(&mut self) -> Result<Viewport> {
        let bounds = self.store.current()?.bounds();
        let limits = self.viewports.limits();

        let zoom = limits.clamp(
            (self.screen.width / bounds.width()).min(self.screen.height / bounds.height()),
        );
        let center = bounds.center();
        let screen_center = self.screen_center();
        let viewport = Viewport {
            zoom,
            offset: Point::new(
                screen_center.x / zoom - center.x,
                screen_center.y / zoom - center.y,
            ),
        };

        let id = self.store.current_id().clone();
        self.viewports.set_viewport(&id, viewport)?;
        debug!(diagram = %id, zoom, "fit to view");
        Ok(viewport)
    }

    pub fn set_screen_size(&mut self, size: Size) {
        let fallback = self.config.screen_size();
        self.screen = Size::new(
            utils::sanitize_length(size.width, fallback.width),
            utils::sanitize_length(size.height, fallback.height),
        );
    }

    pub fn screen_to_world(&self, screen: Point) -> Result<Point> {
        self.viewports.screen_to_world(self.store.current_id(), screen)
    }

    pub fn world_to_screen(&self, world: Point) -> Result<Point> {
        self.viewports.world_to_screen(self.store.current_id(), world)
    }

    // Documents

    pub fn export_document(&self) -> Result<ExportDocument> {
        Ok(ExportDocument::from_diagram(self.store.current()?))
    }

    /// Replaces the current diagram's contents. On error nothing changes.
    pub fn import_document(&mut self, text: &str) -> Result<()> {
        let document = ExportDocument::parse(text)?;
        let (nodes, edges) = document.into_records(self.store.node_size());
        let (node_count, edge_count) = (nodes.len(), edges.len());

        let removed = self.store.replace_current(nodes, edges)?;
        self.forget_viewports(&removed);

        info!(
            diagram = %self.store.current_id(),
            nodes = node_count,
            edges = edge_count,
            "imported document"
        );
        Ok(())
    }

    // Queries

    pub fn minimap(&self, frame: Size) -> Result<Minimap> {
        let diagram = self.store.current()?;
        let bounds = diagram.bounds();
        let scale = geometry::minimap_scale(&bounds, frame);
        let visible = self.viewport()?.visible_rect(self.screen);

        Ok(Minimap {
            scale,
            bounds,
            nodes: diagram
                .nodes()
                .map(|node| geometry::project_to_minimap(&node.rect(), &bounds, scale))
                .collect(),
            viewport: geometry::project_to_minimap(&visible, &bounds, scale),
        })
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        let diagram = self.store.current()?;

        let edges = diagram
            .edges()
            .iter()
            .filter_map(|edge| {
                let (start, end) = diagram.edge_endpoints(edge.id.as_str())?;
                Some(EdgeView {
                    edge: edge.clone(),
                    start,
                    end,
                })
            })
            .collect();

        let pending = self.store.pending().and_then(|pending| {
            let (start, _) = self.store.pending_preview()?;
            Some(PendingView {
                source: pending.source.clone(),
                cursor: pending.cursor,
                start,
            })
        });

        Ok(Snapshot {
            diagram: diagram.id.clone(),
            name: diagram.name.clone(),
            parent_node: diagram.parent_node.clone(),
            breadcrumb: self.breadcrumb(),
            nodes: diagram.nodes().cloned().collect(),
            edges,
            selection: self.store.selection().clone(),
            pending,
            viewport: self.viewport()?,
            screen: self.screen,
            bounds: diagram.bounds(),
        })
    }
}

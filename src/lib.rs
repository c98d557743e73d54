use serde::{Deserialize, Serialize};

pub mod cli;
pub mod config;
pub mod diagram;
pub mod document;
pub mod editor;
pub mod error;
pub mod geometry;
#[cfg(feature = "server")]
pub mod serve;
pub mod store;
pub mod utils;
pub mod viewport;

pub use config::EditorConfig;
pub use diagram::{Diagram, DiagramId, Edge, EdgeId, EdgeStyle, Node, NodeId, NodeStyle};
pub use document::ExportDocument;
pub use editor::{Crumb, EdgeView, Editor, Minimap, PendingView, Snapshot};
pub use error::{EditorError, EntityKind};
pub use geometry::{Bounds, Handle, Rect};
pub use store::{GraphStore, PendingConnection, Selection};
pub use viewport::{Viewport, ViewportController, ZoomDirection, ZoomLimits};

pub const NODE_WIDTH: f32 = 160.0;
pub const NODE_HEIGHT: f32 = 80.0;
pub const BOUNDS_PADDING: f32 = 100.0;
pub const EMPTY_BOUNDS_EXTENT: f32 = 1000.0;
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;
pub const ZOOM_STEP: f32 = 1.05;
pub const ROOT_DIAGRAM_ID: &str = "root";
pub const DEFAULT_NODE_LABEL: &str = "New Node";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn half(self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
        }
    }
}

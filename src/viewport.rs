//! Per-diagram pan and zoom.
//!
//! Screen and world coordinates are related by
//! `world = screen / zoom - offset`, equivalently
//! `screen = (world + offset) * zoom`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::diagram::DiagramId;
use crate::error::{EditorError, EntityKind, Result};
use crate::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub zoom: f32,
    pub offset: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Point::ORIGIN,
        }
    }
}

impl Viewport {
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            screen.x / self.zoom - self.offset.x,
            screen.y / self.zoom - self.offset.y,
        )
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            (world.x + self.offset.x) * self.zoom,
            (world.y + self.offset.y) * self.zoom,
        )
    }

    /// World-space rectangle covered by a screen of the given size.
    pub fn visible_rect(&self, screen: Size) -> Rect {
        Rect::from_corners(
            self.screen_to_world(Point::ORIGIN),
            self.screen_to_world(Point::new(screen.width, screen.height)),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
            step: ZOOM_STEP,
        }
    }
}

impl ZoomLimits {
    /// Finite, positive, ordered bounds with a step that actually grows the
    /// zoom.
    pub fn is_valid(&self) -> bool {
        let positive = |value: f32| value.is_finite() && value > 0.0;
        positive(self.min)
            && positive(self.max)
            && self.min <= self.max
            && self.step.is_finite()
            && self.step > 1.0
    }

    pub fn clamp(&self, zoom: f32) -> f32 {
        let limits = if self.is_valid() { *self } else { Self::default() };
        if !zoom.is_finite() {
            return 1.0_f32.clamp(limits.min, limits.max);
        }
        zoom.clamp(limits.min, limits.max)
    }

    fn apply(&self, zoom: f32, direction: ZoomDirection) -> f32 {
        let next = match direction {
            ZoomDirection::In => zoom * self.step,
            ZoomDirection::Out => zoom / self.step,
        };
        self.clamp(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Scroll wheel convention: scrolling up (negative delta) zooms in.
    pub fn from_wheel_delta(delta_y: f32) -> Option<ZoomDirection> {
        if delta_y < 0.0 {
            Some(ZoomDirection::In)
        } else if delta_y > 0.0 {
            Some(ZoomDirection::Out)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewportController {
    limits: ZoomLimits,
    viewports: HashMap<DiagramId, Viewport>,
}

impl ViewportController {
    /// Invalid limits are replaced by the defaults.
    pub fn new(limits: ZoomLimits) -> Self {
        let limits = if limits.is_valid() {
            limits
        } else {
            warn!(?limits, "invalid zoom limits, using defaults");
            ZoomLimits::default()
        };
        Self {
            limits,
            viewports: HashMap::new(),
        }
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Creates the default record for a diagram unless it already has one.
    pub fn ensure(&mut self, diagram_id: &DiagramId) -> &Viewport {
        self.viewports.entry(diagram_id.clone()).or_default()
    }

    pub fn remove(&mut self, diagram_id: &DiagramId) -> Option<Viewport> {
        self.viewports.remove(diagram_id)
    }

    pub fn len(&self) -> usize {
        self.viewports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    pub fn get(&self, diagram_id: &DiagramId) -> Result<&Viewport> {
        self.viewports
            .get(diagram_id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Diagram, diagram_id))
    }

    fn get_mut(&mut self, diagram_id: &DiagramId) -> Result<&mut Viewport> {
        self.viewports
            .get_mut(diagram_id)
            .ok_or_else(|| EditorError::not_found(EntityKind::Diagram, diagram_id))
    }

    /// Returns the zoom actually applied after clamping.
    pub fn set_zoom(&mut self, diagram_id: &DiagramId, zoom: f32) -> Result<f32> {
        let limits = self.limits;
        let viewport = self.get_mut(diagram_id)?;
        viewport.zoom = limits.clamp(zoom);
        Ok(viewport.zoom)
    }

    /// Steps the zoom while keeping the world point under `cursor` fixed on
    /// screen.
    pub fn zoom_toward_cursor(
        &mut self,
        diagram_id: &DiagramId,
        cursor: Point,
        direction: ZoomDirection,
    ) -> Result<Viewport> {
        let limits = self.limits;
        let viewport = self.get_mut(diagram_id)?;

        let anchor = viewport.screen_to_world(cursor);
        let zoom = limits.apply(viewport.zoom, direction);
        viewport.offset = Point::new(cursor.x / zoom - anchor.x, cursor.y / zoom - anchor.y);
        viewport.zoom = zoom;

        debug!(diagram = %diagram_id, zoom, ?direction, "zoomed");
        Ok(*viewport)
    }

    pub fn pan_by(&mut self, diagram_id: &DiagramId, delta: Point) -> Result<Viewport> {
        let viewport = self.get_mut(diagram_id)?;
        viewport.offset.x += delta.x / viewport.zoom;
        viewport.offset.y += delta.y / viewport.zoom;
        Ok(*viewport)
    }

    pub fn reset_viewport(&mut self, diagram_id: &DiagramId) -> Result<()> {
        *self.get_mut(diagram_id)? = Viewport::default();
        Ok(())
    }

    /// Overwrites the record, clamping its zoom.
    pub fn set_viewport(&mut self, diagram_id: &DiagramId, viewport: Viewport) -> Result<()> {
        let zoom = self.limits.clamp(viewport.zoom);
        *self.get_mut(diagram_id)? = Viewport { zoom, ..viewport };
        Ok(())
    }

    pub fn screen_to_world(&self, diagram_id: &DiagramId, screen: Point) -> Result<Point> {
        Ok(self.get(diagram_id)?.screen_to_world(screen))
    }

    pub fn world_to_screen(&self, diagram_id: &DiagramId, world: Point) -> Result<Point> {
        Ok(self.get(diagram_id)?.world_to_screen(world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    fn controller() -> (ViewportController, DiagramId) {
        let mut controller = ViewportController::default();
        let id = DiagramId::root();
        controller.ensure(&id);
        (controller, id)
    }

    #[test]
    fn new_viewports_start_at_identity() {
        let (controller, id) = controller();
        let viewport = controller.get(&id).unwrap();
        assert_eq!(viewport.zoom, 1.0);
        assert_eq!(viewport.offset, Point::ORIGIN);
    }

    #[test]
    fn set_zoom_clamps_into_limits() {
        let (mut controller, id) = controller();
        assert_eq!(controller.set_zoom(&id, 100.0).unwrap(), MAX_ZOOM);
        assert_eq!(controller.set_zoom(&id, 0.0).unwrap(), MIN_ZOOM);
        assert_eq!(controller.set_zoom(&id, 2.5).unwrap(), 2.5);
        assert_eq!(controller.set_zoom(&id, f32::NAN).unwrap(), 1.0);
    }

    #[test]
    fn zoom_toward_cursor_keeps_the_point_under_the_cursor() {
        let (mut controller, id) = controller();
        controller.pan_by(&id, Point::new(37.0, -12.0)).unwrap();
        let cursor = Point::new(420.0, 260.0);

        for direction in [ZoomDirection::In, ZoomDirection::In, ZoomDirection::Out] {
            let before = controller.screen_to_world(&id, cursor).unwrap();
            controller.zoom_toward_cursor(&id, cursor, direction).unwrap();
            let after = controller.screen_to_world(&id, cursor).unwrap();
            assert!(close(before, after), "{before:?} != {after:?}");
        }
    }

    #[test]
    fn zoom_steps_are_multiplicative_and_clamped() {
        let (mut controller, id) = controller();
        let viewport = controller
            .zoom_toward_cursor(&id, Point::ORIGIN, ZoomDirection::In)
            .unwrap();
        assert!((viewport.zoom - 1.05).abs() < 1e-6);

        controller.set_zoom(&id, MAX_ZOOM).unwrap();
        let viewport = controller
            .zoom_toward_cursor(&id, Point::new(10.0, 10.0), ZoomDirection::In)
            .unwrap();
        assert_eq!(viewport.zoom, MAX_ZOOM);

        controller.set_zoom(&id, MIN_ZOOM).unwrap();
        let viewport = controller
            .zoom_toward_cursor(&id, Point::new(10.0, 10.0), ZoomDirection::Out)
            .unwrap();
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn pan_is_scaled_by_zoom() {
        let (mut controller, id) = controller();
        controller.set_zoom(&id, 2.0).unwrap();
        let viewport = controller.pan_by(&id, Point::new(10.0, -4.0)).unwrap();
        assert_eq!(viewport.offset, Point::new(5.0, -2.0));
    }

    #[test]
    fn transforms_are_inverse() {
        let (mut controller, id) = controller();
        controller.set_zoom(&id, 1.7).unwrap();
        controller.pan_by(&id, Point::new(-30.0, 55.0)).unwrap();

        let world = Point::new(123.0, -45.0);
        let screen = controller.world_to_screen(&id, world).unwrap();
        let back = controller.screen_to_world(&id, screen).unwrap();
        assert!(close(world, back));
    }

    #[test]
    fn reset_restores_identity() {
        let (mut controller, id) = controller();
        controller.set_zoom(&id, 3.0).unwrap();
        controller.pan_by(&id, Point::new(8.0, 8.0)).unwrap();
        controller.reset_viewport(&id).unwrap();
        assert_eq!(*controller.get(&id).unwrap(), Viewport::default());
    }

    #[test]
    fn unknown_diagram_is_not_found() {
        let (mut controller, _) = controller();
        let missing = DiagramId::from("missing");
        assert!(controller.get(&missing).unwrap_err().is_not_found());
        assert!(controller.set_zoom(&missing, 2.0).unwrap_err().is_not_found());
        assert!(controller
            .pan_by(&missing, Point::new(1.0, 1.0))
            .unwrap_err()
            .is_not_found());
        assert!(controller.reset_viewport(&missing).unwrap_err().is_not_found());
    }

    #[test]
    fn clamp_with_inverted_limits_does_not_panic() {
        let limits = ZoomLimits { min: 4.0, max: 2.0, step: 1.05 };
        assert_eq!(limits.clamp(100.0), MAX_ZOOM);
        assert_eq!(limits.clamp(f32::NAN), 1.0);
    }

    #[test]
    fn invalid_limits_fall_back_to_defaults() {
        for limits in [
            ZoomLimits { min: 10.0, max: 2.0, step: 1.05 },
            ZoomLimits { min: f32::NAN, max: 5.0, step: 1.05 },
            ZoomLimits { min: 0.1, max: 5.0, step: 0.5 },
            ZoomLimits { min: 0.1, max: 5.0, step: 0.0 },
        ] {
            let mut controller = ViewportController::new(limits);
            assert_eq!(controller.limits(), ZoomLimits::default());

            let id = DiagramId::root();
            controller.ensure(&id);
            assert_eq!(controller.set_zoom(&id, 50.0).unwrap(), MAX_ZOOM);
            let viewport = controller
                .zoom_toward_cursor(&id, Point::ORIGIN, ZoomDirection::Out)
                .unwrap();
            assert!(viewport.zoom < MAX_ZOOM);
        }
    }

    #[test]
    fn wheel_delta_maps_to_direction() {
        assert_eq!(ZoomDirection::from_wheel_delta(-3.0), Some(ZoomDirection::In));
        assert_eq!(ZoomDirection::from_wheel_delta(2.0), Some(ZoomDirection::Out));
        assert_eq!(ZoomDirection::from_wheel_delta(0.0), None);
    }

    #[test]
    fn visible_rect_tracks_pan_and_zoom() {
        let viewport = Viewport {
            zoom: 2.0,
            offset: Point::new(-100.0, 0.0),
        };
        let rect = viewport.visible_rect(Size::new(800.0, 600.0));
        assert_eq!(rect.top_left(), Point::new(100.0, 0.0));
        assert_eq!(rect.width(), 400.0);
        assert_eq!(rect.height(), 300.0);
    }
}

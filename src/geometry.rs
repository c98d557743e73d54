//! Rectangle math shared by the store, the viewport and the HTTP snapshot.
//!
//! Node rectangles are described by their centre and size; every function here
//! is pure and works on copies.

use serde::{Deserialize, Serialize};

use crate::{BOUNDS_PADDING, EMPTY_BOUNDS_EXTENT, Point, Size};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn from_center(center: Point, size: Size) -> Rect {
        let (half_w, half_h) = size.half();
        Rect {
            min_x: center.x - half_w,
            max_x: center.x + half_w,
            min_y: center.y - half_h,
            max_y: center.y + half_h,
        }
    }

    pub fn from_top_left(top_left: Point, size: Size) -> Rect {
        Rect {
            min_x: top_left.x,
            max_x: top_left.x + size.width,
            min_y: top_left.y,
            max_y: top_left.y + size.height,
        }
    }

    /// Normalises two arbitrary drag corners, as produced by a marquee drag in
    /// any direction.
    pub fn from_corners(a: Point, b: Point) -> Rect {
        Rect {
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
            min_y: a.y.min(b.y),
            max_y: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn inflate(self, amount: f32) -> Rect {
        Rect {
            min_x: self.min_x - amount,
            max_x: self.max_x + amount,
            min_y: self.min_y - amount,
            max_y: self.max_y + amount,
        }
    }

    /// Inclusive on every side.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Fixed connection handles drawn on the four sides of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Top,
    Right,
    Bottom,
    Left,
}

impl Handle {
    pub const ALL: [Handle; 4] = [Handle::Top, Handle::Right, Handle::Bottom, Handle::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::Top => "top",
            Handle::Right => "right",
            Handle::Bottom => "bottom",
            Handle::Left => "left",
        }
    }
}

/// Returns where a ray leaving `center` along `direction` crosses the border
/// of the `size` rectangle centred there.
///
/// The ray leaves through a vertical side when `|dx| * half_h > |dy| * half_w`
/// and through a horizontal side otherwise; the other coordinate follows from
/// the ray's slope. `direction` does not need to be normalised. A zero
/// direction has no exit point and yields the centre itself.
pub fn anchor_point(center: Point, size: Size, direction: Point) -> Point {
    let (half_w, half_h) = size.half();
    let (dx, dy) = (direction.x, direction.y);

    if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
        return center;
    }

    let (tx, ty) = if dx.abs() * half_h > dy.abs() * half_w {
        let tx = half_w * dx.signum();
        (tx, tx * dy / dx)
    } else {
        let ty = half_h * dy.signum();
        (ty * dx / dy, ty)
    };

    Point {
        x: center.x + tx,
        y: center.y + ty,
    }
}

/// Border points where an edge between two node rectangles starts and ends,
/// each found by aiming at the other rectangle's centre.
pub fn edge_endpoints(from: &Rect, to: &Rect) -> (Point, Point) {
    let from_center = from.center();
    let to_center = to.center();
    let direction = Point {
        x: to_center.x - from_center.x,
        y: to_center.y - from_center.y,
    };
    let reverse = Point {
        x: -direction.x,
        y: -direction.y,
    };

    (
        anchor_point(from_center, from.size(), direction),
        anchor_point(to_center, to.size(), reverse),
    )
}

pub fn handle_point(rect: &Rect, handle: Handle) -> Point {
    let center = rect.center();
    match handle {
        Handle::Top => Point::new(center.x, rect.min_y),
        Handle::Right => Point::new(rect.max_x, center.y),
        Handle::Bottom => Point::new(center.x, rect.max_y),
        Handle::Left => Point::new(rect.min_x, center.y),
    }
}

/// Picks the handle facing `target`, using the same side test as
/// [`anchor_point`].
pub fn facing_handle(rect: &Rect, target: Point) -> Handle {
    let center = rect.center();
    let dx = target.x - center.x;
    let dy = target.y - center.y;
    let (half_w, half_h) = rect.size().half();

    if dx.abs() * half_h > dy.abs() * half_w {
        if dx > 0.0 { Handle::Right } else { Handle::Left }
    } else if dy >= 0.0 {
        Handle::Bottom
    } else {
        Handle::Top
    }
}

/// Inclusive hit test against a rectangle given by its top-left corner.
pub fn point_in_rect(point: Point, top_left: Point, size: Size) -> bool {
    Rect::from_top_left(top_left, size).contains(point)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min.x + self.max.x) / 2.0,
            y: (self.min.y + self.max.y) / 2.0,
        }
    }
}

/// Axis-aligned box around every rectangle, padded by [`BOUNDS_PADDING`].
///
/// An empty collection yields a fixed `EMPTY_BOUNDS_EXTENT` square at the
/// origin instead of an inverted infinite box.
pub fn bounds_of<I>(rects: I) -> Bounds
where
    I: IntoIterator<Item = Rect>,
{
    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for rect in rects {
        min_x = min_x.min(rect.min_x);
        max_x = max_x.max(rect.max_x);
        min_y = min_y.min(rect.min_y);
        max_y = max_y.max(rect.max_y);
    }

    if min_x > max_x || min_y > max_y || !(min_x.is_finite() && max_y.is_finite()) {
        return Bounds {
            min: Point::ORIGIN,
            max: Point::new(EMPTY_BOUNDS_EXTENT, EMPTY_BOUNDS_EXTENT),
        };
    }

    Bounds {
        min: Point::new(min_x - BOUNDS_PADDING, min_y - BOUNDS_PADDING),
        max: Point::new(max_x + BOUNDS_PADDING, max_y + BOUNDS_PADDING),
    }
}

/// Scale that fits `bounds` into a minimap of `frame` size. Never magnifies.
pub fn minimap_scale(bounds: &Bounds, frame: Size) -> f32 {
    let width = bounds.width();
    let height = bounds.height();
    if width <= f32::EPSILON || height <= f32::EPSILON {
        return 1.0;
    }
    (frame.width / width).min(frame.height / height).min(1.0)
}

/// Maps a world-space rectangle into minimap space.
pub fn project_to_minimap(rect: &Rect, bounds: &Bounds, scale: f32) -> Rect {
    Rect {
        min_x: (rect.min_x - bounds.min.x) * scale,
        max_x: (rect.max_x - bounds.min.x) * scale,
        min_y: (rect.min_y - bounds.min.y) * scale,
        max_y: (rect.max_y - bounds.min.y) * scale,
    }
}

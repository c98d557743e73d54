use uuid::Uuid;

use crate::Point;

pub fn new_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// Replaces a non-finite or non-positive length with `fallback`.
pub fn sanitize_length(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Pointer events occasionally carry NaN while a drag is being torn down.
pub fn sanitize_point(point: Point) -> Point {
    Point {
        x: if point.x.is_finite() { point.x } else { 0.0 },
        y: if point.y.is_finite() { point.y } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_unique() {
        assert_ne!(new_identifier(), new_identifier());
    }

    #[test]
    fn sanitize_length_rejects_degenerate_values() {
        assert_eq!(sanitize_length(42.0, 10.0), 42.0);
        assert_eq!(sanitize_length(0.0, 10.0), 10.0);
        assert_eq!(sanitize_length(-3.0, 10.0), 10.0);
        assert_eq!(sanitize_length(f32::NAN, 10.0), 10.0);
        assert_eq!(sanitize_length(f32::INFINITY, 10.0), 10.0);
    }

    #[test]
    fn sanitize_point_zeroes_non_finite_axes() {
        let cleaned = sanitize_point(Point::new(f32::NAN, 12.5));
        assert_eq!(cleaned, Point::new(0.0, 12.5));
    }
}

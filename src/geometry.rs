//! Geometry primitives shared by the layout engines.
//!
//! Coordinates are plain `f64` in whatever unit the caller sized the canvas in,
//! with the origin at the top-left and `y` growing downward. Angles are degrees,
//! `-90` pointing at the top of the circle and increasing clockwise.

use crate::SleepStage;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Canvas or box size.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// True when both sides are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutRect {
    /// Midpoint of the left edge.
    pub fn leading_mid(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }

    /// Midpoint of the right edge.
    pub fn trailing_mid(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height / 2.0)
    }
}

/// Cubic Bézier bridging two differently-staged timeline bars.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectorCurve {
    pub from: Point,
    pub to: Point,
    pub control1: Point,
    pub control2: Point,
}

impl ConnectorCurve {
    /// S-curve from `from` to `to`: control points sit at 30% and 70% of the
    /// horizontal distance, each pinned to its own endpoint's `y`.
    pub fn s_curve(from: Point, to: Point) -> Self {
        let dx = to.x - from.x;
        ConnectorCurve {
            from,
            to,
            control1: Point::new(from.x + dx * 0.3, from.y),
            control2: Point::new(from.x + dx * 0.7, to.y),
        }
    }

    /// Evaluate the curve at `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Point {
            x: b0 * self.from.x + b1 * self.control1.x + b2 * self.control2.x + b3 * self.to.x,
            y: b0 * self.from.y + b1 * self.control1.y + b2 * self.control2.y + b3 * self.to.y,
        }
    }
}

/// One interval's share of the ring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    pub stage: SleepStage,
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
}

impl ArcSegment {
    pub fn sweep_deg(&self) -> f64 {
        self.end_angle_deg - self.start_angle_deg
    }
}

/// Clock-face time not covered by any sample (24-hour mode only).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundArcSegment {
    pub start_angle_deg: f64,
    pub end_angle_deg: f64,
}

impl BackgroundArcSegment {
    pub fn sweep_deg(&self) -> f64 {
        self.end_angle_deg - self.start_angle_deg
    }
}

/// Semicircular terminator at either end of the ring.
///
/// The half-disc is centered on the ring centerline and bulges toward
/// `facing_deg`, spanning `facing_deg - 90 ..= facing_deg + 90`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundCap {
    pub center: Point,
    pub radius: f64,
    pub facing_deg: f64,
}

/// Attachment point for the "fell asleep" / "woke up" markers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IconAnchor {
    pub angle_deg: f64,
    pub point: Point,
}

/// The ring every arc is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub center: Point,
    /// Radius of the stroke's centerline.
    pub radius: f64,
    pub stroke_width: f64,
}

impl Ring {
    /// Largest ring with the given stroke that fits inside `canvas`.
    pub fn fitted(canvas: Size, stroke_width: f64) -> Self {
        let outer = canvas.width.min(canvas.height) / 2.0;
        Ring {
            center: Point::new(canvas.width / 2.0, canvas.height / 2.0),
            radius: (outer - stroke_width / 2.0).max(0.0),
            stroke_width,
        }
    }

    /// Point on the centerline at `angle_deg`.
    pub fn point_at(&self, angle_deg: f64) -> Point {
        let theta = angle_deg.to_radians();
        Point {
            x: self.center.x + self.radius * theta.cos(),
            y: self.center.y + self.radius * theta.sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn s_curve_pins_controls_to_endpoint_rows() {
        let curve = ConnectorCurve::s_curve(Point::new(10.0, 5.0), Point::new(20.0, 45.0));
        assert!(close(curve.control1, Point::new(13.0, 5.0)));
        assert!(close(curve.control2, Point::new(17.0, 45.0)));
    }

    #[test]
    fn curve_evaluation_hits_endpoints() {
        let curve = ConnectorCurve::s_curve(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(close(curve.point_at(0.0), curve.from));
        assert!(close(curve.point_at(1.0), curve.to));
        // Symmetric S-curve passes through the midpoint
        assert!(close(curve.point_at(0.5), Point::new(5.0, 5.0)));
    }

    #[test]
    fn ring_top_is_minus_ninety() {
        let ring = Ring::fitted(Size::new(200.0, 100.0), 10.0);
        assert_eq!(ring.radius, 45.0);
        assert!(close(ring.point_at(-90.0), Point::new(100.0, 5.0)));
        assert!(close(ring.point_at(0.0), Point::new(145.0, 50.0)));
    }
}

use morphline_data::{Point, ShapeKind, VertexLoop};
use tracing::warn;

/// Values that blend linearly between two endpoints.
pub trait Interpolatable: Sized + Clone {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Interpolatable for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolatable for Point {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Point::lerp(*self, *other, t)
    }
}

impl Interpolatable for u32 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        step(self, other, t, 0.5)
    }
}

impl Interpolatable for VertexLoop {
    /// Vertex-wise blend. The result is closed only when both ends are.
    fn lerp(&self, other: &Self, t: f64) -> Self {
        if self.is_empty() || other.is_empty() || self.len() != other.len() {
            warn!(
                start = self.len(),
                end = other.len(),
                "cannot blend vertex loops of unequal or zero length, stepping"
            );
            return step(self, other, t, 0.5);
        }
        let points = self
            .points()
            .iter()
            .zip(other.points())
            .map(|(a, b)| a.lerp(b, t))
            .collect();
        VertexLoop::new(points, self.is_closed() && other.is_closed())
    }
}

/// `start` below `threshold`, `end` from it on.
pub fn step<T: Clone>(start: &T, end: &T, t: f64, threshold: f64) -> T {
    if t < threshold {
        start.clone()
    } else {
        end.clone()
    }
}

/// Blends two angles in degrees along the shorter arc.
pub fn lerp_angle(start: f64, end: f64, t: f64) -> f64 {
    let from = start.rem_euclid(360.0);
    let to = end.rem_euclid(360.0);
    let mut diff = to - from;
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff < -180.0 {
        diff += 360.0;
    }
    start + diff * t
}

/// Blends the parameters of two shapes of the same kind.
///
/// Counts (polygon sides, star points) step at `threshold`. Kinds without
/// blendable parameters, or mismatched kinds, step as a whole.
pub fn lerp_kind(start: &ShapeKind, end: &ShapeKind, t: f64, threshold: f64) -> ShapeKind {
    use ShapeKind::*;
    match (start, end) {
        (Circle { radius: a }, Circle { radius: b }) => Circle { radius: a.lerp(b, t) },
        (Ellipse { rx: ax, ry: ay }, Ellipse { rx: bx, ry: by }) => Ellipse {
            rx: ax.lerp(bx, t),
            ry: ay.lerp(by, t),
        },
        (
            Rectangle {
                width: aw,
                height: ah,
                corner_radius: ac,
            },
            Rectangle {
                width: bw,
                height: bh,
                corner_radius: bc,
            },
        ) => Rectangle {
            width: aw.lerp(bw, t),
            height: ah.lerp(bh, t),
            corner_radius: ac.lerp(bc, t),
        },
        (
            Polygon {
                sides: asides,
                radius: ar,
            },
            Polygon {
                sides: bsides,
                radius: br,
            },
        ) => Polygon {
            sides: step(asides, bsides, t, threshold),
            radius: ar.lerp(br, t),
        },
        (
            Star {
                points: ap,
                outer_radius: ao,
                inner_radius: ai,
            },
            Star {
                points: bp,
                outer_radius: bo,
                inner_radius: bi,
            },
        ) => Star {
            points: step(ap, bp, t, threshold),
            outer_radius: ao.lerp(bo, t),
            inner_radius: ai.lerp(bi, t),
        },
        (Line { length: a }, Line { length: b }) => Line { length: a.lerp(b, t) },
        _ => step(start, end, t, threshold),
    }
}

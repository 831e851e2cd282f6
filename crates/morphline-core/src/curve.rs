use morphline_data::Point;
use std::fmt;
use std::sync::Arc;

/// Trajectory a point field follows between two keystates.
#[derive(Clone, Default)]
pub enum Curve {
    #[default]
    Linear,
    /// Circular arc through both endpoints. `radius` defaults to the distance
    /// between the endpoints and never drops below half of it. With
    /// `clockwise: false` the path bows to the left of the travel direction
    /// (positive y for travel along +x).
    Arc {
        radius: Option<f64>,
        clockwise: bool,
    },
    Custom(Arc<dyn Fn(Point, Point, f64) -> Point + Send + Sync>),
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::Linear => f.write_str("Linear"),
            Curve::Arc { radius, clockwise } => f
                .debug_struct("Arc")
                .field("radius", radius)
                .field("clockwise", clockwise)
                .finish(),
            Curve::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Curve {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Point, Point, f64) -> Point + Send + Sync + 'static,
    {
        Curve::Custom(Arc::new(f))
    }

    pub fn arc(radius: Option<f64>) -> Self {
        Curve::Arc {
            radius,
            clockwise: false,
        }
    }

    pub fn point_at(&self, start: Point, end: Point, t: f64) -> Point {
        match self {
            Curve::Linear => start.lerp(end, t),
            Curve::Arc { radius, clockwise } => arc_point(start, end, t, *radius, *clockwise),
            Curve::Custom(f) => f(start, end, t),
        }
    }
}

fn arc_point(start: Point, end: Point, t: f64, radius: Option<f64>, clockwise: bool) -> Point {
    let chord = end - start;
    let distance = chord.length();
    if distance == 0.0 {
        return start;
    }
    let r = radius.unwrap_or(distance).max(distance / 2.0);
    let left = chord.perp() / distance;
    let bulge = if clockwise { -left } else { left };
    let half = distance / 2.0;
    let h = (r * r - half * half).max(0.0).sqrt();
    // the center sits opposite the bulge so the minor arc bows towards it
    let center = (start + end) / 2.0 - bulge * h;
    let sweep = 2.0 * (half / r).clamp(-1.0, 1.0).asin();
    let from = start - center;
    let start_angle = from.y.atan2(from.x);
    // turning from start towards the bulge side
    let direction = if bulge.perp_dot(from) > 0.0 { -1.0 } else { 1.0 };
    let angle = start_angle + direction * sweep * t;
    center + Point::new(angle.cos(), angle.sin()) * r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_curve() {
        let p = Curve::Linear.point_at(Point::ZERO, Point::new(10.0, 0.0), 0.25);
        assert_eq!(p, Point::new(2.5, 0.0));
    }

    #[test]
    fn test_semicircle_hits_endpoints_and_apex() {
        let (a, b) = (Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        let curve = Curve::arc(Some(1.0));
        assert!((curve.point_at(a, b, 0.0) - a).length() < 1e-9);
        assert!((curve.point_at(a, b, 1.0) - b).length() < 1e-9);
        let apex = curve.point_at(a, b, 0.5);
        assert!((apex - Point::new(1.0, 1.0)).length() < 1e-9, "{apex:?}");

        let below = Curve::Arc {
            radius: Some(1.0),
            clockwise: true,
        }
        .point_at(a, b, 0.5);
        assert!((below - Point::new(1.0, -1.0)).length() < 1e-9, "{below:?}");
    }

    #[test]
    fn test_wide_arc_stays_on_circle() {
        let (a, b) = (Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        let curve = Curve::arc(Some(2.0));
        let mid = curve.point_at(a, b, 0.5);
        assert!((mid.x - 1.0).abs() < 1e-9);
        assert!((mid.y - (2.0 - 3f64.sqrt())).abs() < 1e-9);
        assert!((curve.point_at(a, b, 1.0) - b).length() < 1e-9);
    }
}

//! Shape kinds and their parameter-driven geometry.
//!
//! ## Responsibilities
//! - **Kind identity**: decides whether two records are the same kind of shape
//!   (parameters blend directly) or must morph through contours.
//! - **Geometry**: turns parameters into `ContourSet`s on demand using `kurbo`
//!   outlines resampled by arc length.

use crate::geometry::{ContourSet, Point, VertexLoop};
use crate::state::ShapeState;
use kurbo::{BezPath, PathEl, Shape as _};
use serde::{Deserialize, Serialize};
use std::mem;

const FLATTEN_TOLERANCE: f64 = 0.05;

/// Closed set of shape kinds a record can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    Circle {
        radius: f64,
    },
    Ellipse {
        rx: f64,
        ry: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
        #[serde(default)]
        corner_radius: f64,
    },
    Polygon {
        sides: u32,
        radius: f64,
    },
    Star {
        points: u32,
        outer_radius: f64,
        inner_radius: f64,
    },
    Line {
        length: f64,
    },
    /// Precomputed outline of one character.
    Glyph {
        character: char,
        contours: Vec<ContourSet>,
    },
    /// Externally generated outline (perforated shapes, imported paths).
    Path {
        contours: Vec<ContourSet>,
    },
    /// A collection of sub-records positioned relative to this record.
    Group {
        members: Vec<ShapeState>,
    },
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Ellipse { .. } => "ellipse",
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::Polygon { .. } => "polygon",
            ShapeKind::Star { .. } => "star",
            ShapeKind::Line { .. } => "line",
            ShapeKind::Glyph { .. } => "glyph",
            ShapeKind::Path { .. } => "path",
            ShapeKind::Group { .. } => "group",
        }
    }

    pub fn same_kind(&self, other: &ShapeKind) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// Kinds whose geometry carries no blendable parameters always morph
    /// through contours, even against a record of the same kind.
    pub fn always_morph(&self) -> bool {
        matches!(self, ShapeKind::Glyph { .. } | ShapeKind::Path { .. })
    }

    pub fn is_closed(&self) -> bool {
        match self {
            ShapeKind::Line { .. } => false,
            ShapeKind::Glyph { contours, .. } | ShapeKind::Path { contours } => {
                contours.iter().all(|c| c.outer.is_closed())
            }
            _ => true,
        }
    }

    /// Contour sets in the shape's local frame, each loop holding
    /// `num_vertices` points. Outlines supplied by external generators are
    /// returned as-is.
    pub fn contours(&self, num_vertices: usize) -> Vec<ContourSet> {
        let origin = kurbo::Point::ORIGIN;
        let path = match self {
            ShapeKind::Circle { radius } => {
                kurbo::Circle::new(origin, *radius).to_path(FLATTEN_TOLERANCE)
            }
            ShapeKind::Ellipse { rx, ry } => {
                kurbo::Ellipse::new(origin, (*rx, *ry), 0.0).to_path(FLATTEN_TOLERANCE)
            }
            ShapeKind::Rectangle {
                width,
                height,
                corner_radius,
            } => kurbo::RoundedRect::new(
                -width / 2.0,
                -height / 2.0,
                width / 2.0,
                height / 2.0,
                *corner_radius,
            )
            .to_path(FLATTEN_TOLERANCE),
            ShapeKind::Polygon { sides, radius } => {
                let corners = (*sides).max(3) as usize;
                regular_path((0..corners).map(|_| *radius).collect())
            }
            ShapeKind::Star {
                points,
                outer_radius,
                inner_radius,
            } => {
                let tips = (*points).max(2) as usize;
                regular_path(
                    (0..tips * 2)
                        .map(|i| if i % 2 == 0 { *outer_radius } else { *inner_radius })
                        .collect(),
                )
            }
            ShapeKind::Line { length } => {
                let mut path = BezPath::new();
                path.move_to((-length / 2.0, 0.0));
                path.line_to((length / 2.0, 0.0));
                path
            }
            ShapeKind::Glyph { contours, .. } | ShapeKind::Path { contours } => {
                return contours.clone();
            }
            ShapeKind::Group { members } => {
                return members
                    .iter()
                    .flat_map(|member| {
                        member
                            .kind
                            .contours(member.num_vertices)
                            .into_iter()
                            .map(|set| set.transformed(member.scale, member.rotation, member.pos))
                            .collect::<Vec<_>>()
                    })
                    .collect();
            }
        };
        vec![ContourSet::new(resample(&path, num_vertices, self.is_closed()))]
    }
}

/// Closed polygon whose i-th corner sits at `radii[i]`, evenly spaced in
/// angle, starting straight up.
fn regular_path(radii: Vec<f64>) -> BezPath {
    let count = radii.len();
    let mut path = BezPath::new();
    for (i, radius) in radii.into_iter().enumerate() {
        let angle = -std::f64::consts::FRAC_PI_2 + std::f64::consts::TAU * i as f64 / count as f64;
        let p = (radius * angle.cos(), radius * angle.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Flattens `path` and picks `count` points evenly spaced by arc length.
/// A closed result repeats its first point as the last one.
pub fn resample(path: &BezPath, count: usize, closed: bool) -> VertexLoop {
    let mut polyline: Vec<Point> = Vec::new();
    path.flatten(FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => polyline.push(Point::new(p.x, p.y)),
        PathEl::ClosePath => {
            if let Some(first) = polyline.first().copied() {
                polyline.push(first);
            }
        }
        _ => {}
    });
    if closed {
        if let (Some(first), Some(last)) = (polyline.first().copied(), polyline.last().copied()) {
            if first != last {
                polyline.push(first);
            }
        }
    }
    if count == 0 || polyline.is_empty() {
        return VertexLoop::new(Vec::new(), closed);
    }
    if count == 1 {
        return VertexLoop::new(vec![polyline[0]], closed);
    }

    let mut cumulative = Vec::with_capacity(polyline.len());
    let mut total = 0.0;
    cumulative.push(0.0);
    for pair in polyline.windows(2) {
        total += pair[0].distance(pair[1]);
        cumulative.push(total);
    }

    // Closed loops place count - 1 distinct samples and repeat the first.
    let samples = if closed { count - 1 } else { count };
    let step = if closed {
        total / samples as f64
    } else {
        total / (samples - 1).max(1) as f64
    };
    let mut points = Vec::with_capacity(count);
    let mut segment = 0;
    for i in 0..samples {
        let target = step * i as f64;
        while segment + 2 < cumulative.len() && cumulative[segment + 1] < target {
            segment += 1;
        }
        let (d0, d1) = (cumulative[segment], cumulative[(segment + 1).min(cumulative.len() - 1)]);
        let p0 = polyline[segment];
        let p1 = polyline[(segment + 1).min(polyline.len() - 1)];
        let local = if d1 > d0 { ((target - d0) / (d1 - d0)).clamp(0.0, 1.0) } else { 0.0 };
        points.push(p0.lerp(p1, local));
    }
    if closed {
        points.push(points[0]);
    }
    VertexLoop::new(points, closed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_contour_has_requested_vertices() {
        let sets = ShapeKind::Circle { radius: 50.0 }.contours(64);
        assert_eq!(sets.len(), 1);
        let outer = &sets[0].outer;
        assert_eq!(outer.len(), 64);
        assert!(outer.is_closed());
        assert!(outer.centroid().length() < 1.0);
        for p in outer.points() {
            assert!((p.length() - 50.0).abs() < 0.5, "{p:?}");
        }
    }

    #[test]
    fn test_line_is_open_and_spans_length() {
        let sets = ShapeKind::Line { length: 100.0 }.contours(11);
        let outer = &sets[0].outer;
        assert!(!outer.is_closed());
        assert_eq!(outer.points()[0], Point::new(-50.0, 0.0));
        assert!((outer.points()[10] - Point::new(50.0, 0.0)).length() < 1e-9);
        assert!((outer.points()[5].x).abs() < 1e-9);
    }

    #[test]
    fn test_star_alternates_radii() {
        let star = ShapeKind::Star {
            points: 5,
            outer_radius: 40.0,
            inner_radius: 20.0,
        };
        // 10 corners, 11 points closed: samples land exactly on the corners.
        let outer = &star.contours(11)[0].outer;
        assert!((outer.points()[0].length() - 40.0).abs() < 1e-6);
        assert!((outer.points()[1].length() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_kind_identity_and_morph_flag() {
        let a = ShapeKind::Circle { radius: 1.0 };
        let b = ShapeKind::Circle { radius: 2.0 };
        let glyph = ShapeKind::Glyph {
            character: 'a',
            contours: vec![],
        };
        assert!(a.same_kind(&b));
        assert!(!a.same_kind(&glyph));
        assert!(!a.always_morph());
        assert!(glyph.always_morph());
    }

    #[test]
    fn test_group_contours_follow_member_transform() {
        let member = ShapeState::new(ShapeKind::Circle { radius: 5.0 })
            .with_pos(Point::new(100.0, 0.0))
            .with_num_vertices(16);
        let group = ShapeKind::Group {
            members: vec![member.clone(), member.with_pos(Point::new(-100.0, 0.0))],
        };
        let sets = group.contours(16);
        assert_eq!(sets.len(), 2);
        assert!((sets[0].centroid() - Point::new(100.0, 0.0)).length() < 0.5);
        assert!((sets[1].centroid() - Point::new(-100.0, 0.0)).length() < 0.5);
    }
}

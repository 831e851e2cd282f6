//! Vertex geometry shared by every morph operation.
//!
//! ## Key Types
//! - `Point`: a 2D position (`glam::DVec2`).
//! - `VertexLoop`: an ordered run of points, open or closed.
//! - `ContourSet`: one outer loop plus its holes.
//! - `Norm`: how per-vertex distances fold into a single cost.

use glam::DVec2;
use serde::{Deserialize, Serialize};

pub type Point = DVec2;

/// Distance norm used when comparing two vertex sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Sum of absolute differences.
    L1,
    /// Root-mean-square of the differences.
    #[default]
    L2,
    /// Largest single difference.
    Linf,
}

impl Norm {
    /// Folds per-element distances into one total under this norm.
    pub fn accumulate<I>(self, distances: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        match self {
            Norm::L1 => distances.into_iter().map(f64::abs).sum(),
            Norm::L2 => {
                let (sum, count) = distances
                    .into_iter()
                    .fold((0.0, 0usize), |(sum, count), d| (sum + d * d, count + 1));
                if count == 0 {
                    0.0
                } else {
                    (sum / count as f64).sqrt()
                }
            }
            Norm::Linf => distances.into_iter().map(f64::abs).fold(0.0, f64::max),
        }
    }

    /// Distance between two points under this norm.
    pub fn point_distance(self, a: Point, b: Point) -> f64 {
        let d = (a - b).abs();
        match self {
            Norm::L1 => d.x + d.y,
            Norm::L2 => d.length(),
            Norm::Linf => d.x.max(d.y),
        }
    }
}

/// An ordered sequence of points plus an open/closed flag.
///
/// A closed loop always stores its first point again at the end, so the
/// drawable outline is `points[0] -> ... -> points[n - 1] == points[0]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexLoop {
    points: Vec<Point>,
    closed: bool,
}

impl VertexLoop {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        let mut vertex_loop = Self { points, closed };
        vertex_loop.ensure_closure();
        vertex_loop
    }

    pub fn open(points: Vec<Point>) -> Self {
        Self::new(points, false)
    }

    /// Builds a closed loop, appending the first point when the caller did not.
    pub fn closed(mut points: Vec<Point>) -> Self {
        if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
            if points.len() == 1 || first.distance_squared(last) > f64::EPSILON {
                points.push(first);
            }
        }
        Self::new(points, true)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of distinct vertices in one traversal: the closing duplicate is
    /// not counted for closed loops.
    pub fn cycle_len(&self) -> usize {
        if self.closed && self.points.len() > 1 {
            self.points.len() - 1
        } else {
            self.points.len()
        }
    }

    fn ensure_closure(&mut self) {
        if self.closed && self.points.len() > 1 {
            let first = self.points[0];
            if let Some(last) = self.points.last_mut() {
                *last = first;
            }
        }
    }

    /// Mean of the distinct vertices.
    pub fn centroid(&self) -> Point {
        let count = self.cycle_len();
        if count == 0 {
            return Point::ZERO;
        }
        self.points[..count].iter().copied().sum::<Point>() / count as f64
    }

    /// Shoelace area; positive for counter-clockwise winding in a y-up frame.
    pub fn signed_area(&self) -> f64 {
        let count = self.cycle_len();
        if count < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..count {
            let a = self.points[i];
            let b = self.points[(i + 1) % count];
            area += a.x * b.y - b.x * a.y;
        }
        area * 0.5
    }

    /// Angle of every distinct vertex around the loop's centroid, in radians.
    pub fn angles(&self) -> Vec<f64> {
        let centroid = self.centroid();
        self.points[..self.cycle_len()]
            .iter()
            .map(|p| {
                let d = *p - centroid;
                d.y.atan2(d.x)
            })
            .collect()
    }

    /// Rotates every vertex by `degrees` around `origin`.
    pub fn rotated(&self, degrees: f64, origin: Point) -> Self {
        if degrees == 0.0 {
            return self.clone();
        }
        let rotation = DVec2::from_angle(degrees.to_radians());
        let points = self
            .points
            .iter()
            .map(|p| origin + rotation.rotate(*p - origin))
            .collect();
        Self::new(points, self.closed)
    }

    /// Applies scale, then rotation (degrees), then translation to every vertex.
    pub fn transformed(&self, scale: f64, degrees: f64, offset: Point) -> Self {
        let rotation = DVec2::from_angle(degrees.to_radians());
        let points = self
            .points
            .iter()
            .map(|p| offset + rotation.rotate(*p * scale))
            .collect();
        Self::new(points, self.closed)
    }

    /// Starts the traversal `offset` vertices later.
    ///
    /// For closed loops only the distinct vertices rotate and the closing
    /// point is re-attached, so the outline is unchanged.
    pub fn rotate_start(&self, offset: usize) -> Self {
        let count = self.cycle_len();
        if count == 0 {
            return self.clone();
        }
        let offset = offset % count;
        let mut points: Vec<Point> = self.points[offset..count]
            .iter()
            .chain(self.points[..offset].iter())
            .copied()
            .collect();
        if self.closed && self.points.len() > 1 {
            points.push(points[0]);
        }
        Self::new(points, self.closed)
    }

    /// Reverses the traversal direction, keeping the start vertex of closed loops.
    pub fn reversed(&self) -> Self {
        if !self.closed || self.points.len() < 2 {
            let mut points = self.points.clone();
            points.reverse();
            return Self::new(points, self.closed);
        }
        let count = self.cycle_len();
        let first = self.points[0];
        let mut points = Vec::with_capacity(self.points.len());
        points.push(first);
        points.extend(self.points[1..count].iter().rev().copied());
        points.push(first);
        Self::new(points, true)
    }

    /// Same vertex count, every vertex collapsed onto `point`.
    pub fn collapsed_to(&self, point: Point) -> Self {
        Self {
            points: vec![point; self.points.len()],
            closed: self.closed,
        }
    }

    /// Same vertex count, every vertex collapsed onto this loop's centroid.
    pub fn collapsed(&self) -> Self {
        self.collapsed_to(self.centroid())
    }
}

/// One outer loop plus zero or more hole loops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourSet {
    pub outer: VertexLoop,
    #[serde(default)]
    pub holes: Vec<VertexLoop>,
}

impl ContourSet {
    pub fn new(outer: VertexLoop) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(outer: VertexLoop, holes: Vec<VertexLoop>) -> Self {
        Self { outer, holes }
    }

    pub fn centroid(&self) -> Point {
        self.outer.centroid()
    }

    /// Every loop collapsed onto the outer centroid.
    pub fn collapsed(&self) -> Self {
        let centroid = self.centroid();
        Self {
            outer: self.outer.collapsed_to(centroid),
            holes: self
                .holes
                .iter()
                .map(|hole| hole.collapsed_to(centroid))
                .collect(),
        }
    }

    pub fn transformed(&self, scale: f64, degrees: f64, offset: Point) -> Self {
        Self {
            outer: self.outer.transformed(scale, degrees, offset),
            holes: self
                .holes
                .iter()
                .map(|hole| hole.transformed(scale, degrees, offset))
                .collect(),
        }
    }
}

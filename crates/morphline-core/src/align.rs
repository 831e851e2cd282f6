//! Vertex alignment: choosing which vertex of one loop corresponds to which
//! vertex of another before they are blended.
//!
//! ## Key Types
//! - `VertexAligner`: strategy trait, `align(start, end, context, rotation_target)`.
//! - `AngularAligner`: closed to closed, matches centroid-relative angles.
//! - `EuclideanAligner`: open to closed, matches straight-line distance.
//! - `SequentialAligner`: open to open, forward or reversed traversal.
//! - `AlignerStrategy`: serializable selector plus the closure-based factory.
//!
//! Aligners only reorder; vertex counts are fixed upstream and must match.

use crate::error::MorphError;
use morphline_data::{Norm, Point, VertexLoop};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::sync::Arc;

/// Declared rotation (degrees) and closure of the two shapes being aligned.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlignmentContext {
    pub rotation_start: f64,
    pub rotation_end: f64,
    pub closed_start: bool,
    pub closed_end: bool,
}

impl AlignmentContext {
    pub fn new(rotation_start: f64, rotation_end: f64, closed_start: bool, closed_end: bool) -> Self {
        Self {
            rotation_start,
            rotation_end,
            closed_start,
            closed_end,
        }
    }

    /// Unrotated, closed on both sides; used for holes.
    pub fn closed() -> Self {
        Self::new(0.0, 0.0, true, true)
    }
}

pub trait VertexAligner: Send + Sync + fmt::Debug {
    /// Returns both loops with `end` (or, for some strategies, `start`)
    /// reordered so that equal indices correspond.
    fn align(
        &self,
        start: &VertexLoop,
        end: &VertexLoop,
        context: &AlignmentContext,
        rotation_target: Option<f64>,
    ) -> Result<(VertexLoop, VertexLoop), MorphError>;
}

fn check_lengths(start: &VertexLoop, end: &VertexLoop) -> Result<(), MorphError> {
    if start.len() != end.len() {
        return Err(MorphError::LoopLengthMismatch {
            start: start.len(),
            end: end.len(),
        });
    }
    Ok(())
}

/// Absolute difference of two angles in radians, folded into [0, PI].
pub fn angle_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    if d > PI {
        TAU - d
    } else {
        d
    }
}

/// Closed-to-closed alignment by angular position around each centroid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngularAligner {
    pub norm: Norm,
}

impl AngularAligner {
    pub fn new(norm: Norm) -> Self {
        Self { norm }
    }

    /// Total angular distance between `a` and `b` read from index `offset`.
    pub fn offset_distance(&self, a: &[f64], b: &[f64], offset: usize) -> f64 {
        let n = a.len().min(b.len());
        self.norm
            .accumulate((0..n).map(|i| angle_distance(a[i], b[(i + offset) % n])))
    }

    /// Offset of `b` minimizing the distance to `a`; the first minimum wins.
    pub fn best_offset(&self, a: &[f64], b: &[f64]) -> (usize, f64) {
        let n = a.len().min(b.len());
        let mut best = (0, f64::INFINITY);
        for offset in 0..n {
            let distance = self.offset_distance(a, b, offset);
            if distance < best.1 {
                best = (offset, distance);
            }
        }
        best
    }
}

impl VertexAligner for AngularAligner {
    fn align(
        &self,
        start: &VertexLoop,
        end: &VertexLoop,
        context: &AlignmentContext,
        rotation_target: Option<f64>,
    ) -> Result<(VertexLoop, VertexLoop), MorphError> {
        check_lengths(start, end)?;
        if start.is_empty() {
            return Ok((start.clone(), end.clone()));
        }
        let rotation_end = rotation_target.unwrap_or(context.rotation_end);
        let angles_start = start.rotated(context.rotation_start, Point::ZERO).angles();
        let angles_end = end.rotated(rotation_end, Point::ZERO).angles();
        let (offset, _) = self.best_offset(&angles_start, &angles_end);
        Ok((start.clone(), end.rotate_start(offset)))
    }
}

/// Open-to-closed alignment: the closed loop is rotated to minimize
/// point-to-point distance against the open one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EuclideanAligner {
    pub norm: Norm,
}

impl EuclideanAligner {
    pub fn new(norm: Norm) -> Self {
        Self { norm }
    }

    fn distance(&self, a: &VertexLoop, b: &VertexLoop) -> f64 {
        self.norm.accumulate(
            a.points()
                .iter()
                .zip(b.points())
                .map(|(p, q)| p.distance(*q)),
        )
    }

    fn best_rotation(&self, fixed: &VertexLoop, moving: &VertexLoop) -> VertexLoop {
        let mut best = (moving.clone(), self.distance(fixed, moving));
        for offset in 1..moving.cycle_len() {
            let candidate = moving.rotate_start(offset);
            let distance = self.distance(fixed, &candidate);
            if distance < best.1 {
                best = (candidate, distance);
            }
        }
        best.0
    }
}

impl VertexAligner for EuclideanAligner {
    fn align(
        &self,
        start: &VertexLoop,
        end: &VertexLoop,
        _context: &AlignmentContext,
        _rotation_target: Option<f64>,
    ) -> Result<(VertexLoop, VertexLoop), MorphError> {
        check_lengths(start, end)?;
        if start.is_empty() {
            return Ok((start.clone(), end.clone()));
        }
        if end.is_closed() {
            Ok((start.clone(), self.best_rotation(start, end)))
        } else if start.is_closed() {
            Ok((self.best_rotation(end, start), end.clone()))
        } else {
            Ok((start.clone(), end.clone()))
        }
    }
}

/// Open-to-open alignment: keeps `end` forwards or reversed, whichever is closer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SequentialAligner {
    pub norm: Norm,
}

impl SequentialAligner {
    pub fn new(norm: Norm) -> Self {
        Self { norm }
    }
}

impl VertexAligner for SequentialAligner {
    fn align(
        &self,
        start: &VertexLoop,
        end: &VertexLoop,
        _context: &AlignmentContext,
        _rotation_target: Option<f64>,
    ) -> Result<(VertexLoop, VertexLoop), MorphError> {
        check_lengths(start, end)?;
        let total = |candidate: &VertexLoop| {
            self.norm.accumulate(
                start
                    .points()
                    .iter()
                    .zip(candidate.points())
                    .map(|(p, q)| p.distance(*q)),
            )
        };
        let reversed = end.reversed();
        if total(&reversed) < total(end) {
            Ok((start.clone(), reversed))
        } else {
            Ok((start.clone(), end.clone()))
        }
    }
}

/// Named aligner choice as it appears in configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignerStrategy {
    Angular,
    Euclidean,
    Sequential,
    #[serde(skip)]
    Custom(CustomAligner),
}

/// Wraps a caller-provided aligner so it can sit in an `AlignerStrategy`.
#[derive(Clone, Debug)]
pub struct CustomAligner(pub Arc<dyn VertexAligner>);

impl PartialEq for CustomAligner {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl AlignerStrategy {
    /// Angular for closed/closed, Euclidean when exactly one loop is closed,
    /// Sequential for open/open.
    pub fn for_closure(closed_start: bool, closed_end: bool) -> Self {
        match (closed_start, closed_end) {
            (true, true) => AlignerStrategy::Angular,
            (false, false) => AlignerStrategy::Sequential,
            _ => AlignerStrategy::Euclidean,
        }
    }

    pub fn build(&self, norm: Norm) -> Arc<dyn VertexAligner> {
        match self {
            AlignerStrategy::Angular => Arc::new(AngularAligner::new(norm)),
            AlignerStrategy::Euclidean => Arc::new(EuclideanAligner::new(norm)),
            AlignerStrategy::Sequential => Arc::new(SequentialAligner::new(norm)),
            AlignerStrategy::Custom(custom) => custom.0.clone(),
        }
    }
}

/// Factory: the default aligner for a pair of loops.
pub fn get_aligner(closed_start: bool, closed_end: bool, norm: Norm) -> Arc<dyn VertexAligner> {
    AlignerStrategy::for_closure(closed_start, closed_end).build(norm)
}

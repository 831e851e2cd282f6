//! Contour morphing between two shapes of different kinds.
//!
//! Alignment runs once per segment and produces `AlignedContours`: pairs of
//! contour sets with equal vertex counts whose vertices already correspond by
//! index. Per frame, `interpolate_contours` only blends matched vertices.

use crate::align::{get_aligner, AlignmentContext, AngularAligner, VertexAligner};
use crate::animatable::{step, Interpolatable};
use crate::error::MorphError;
use crate::mapping::{map_items, HoleMapper};
use morphline_data::{ContourSet, Norm, VertexLoop};
use std::sync::Arc;
use tracing::{debug, warn};

/// Two contour sets ready to be blended vertex by vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedContours {
    pub start: ContourSet,
    pub end: ContourSet,
}

/// Pairs and aligns the contour sets of two shapes.
///
/// Several disconnected sets are matched greedily by centroid under `norm`;
/// a set without a partner morphs to or from a copy of itself collapsed onto
/// its centroid. Outer loops are aligned with `aligner`, or the
/// closure-based default when `None`. Holes are paired by the same greedy
/// centroid matching and aligned angularly.
pub fn align_contours(
    start: &[ContourSet],
    end: &[ContourSet],
    context: &AlignmentContext,
    aligner: Option<Arc<dyn VertexAligner>>,
    norm: Norm,
) -> Result<Vec<AlignedContours>, MorphError> {
    let hole_mapper = HoleMapper::new(norm);
    let pairs = pair_sets(start, end, &hole_mapper)?;
    let aligner =
        aligner.unwrap_or_else(|| get_aligner(context.closed_start, context.closed_end, norm));
    let hole_aligner = AngularAligner::new(norm);

    pairs
        .into_iter()
        .map(|(a, b)| {
            if a.outer.len() != b.outer.len() {
                return Err(MorphError::VertexCountMismatch {
                    start: a.outer.len(),
                    end: b.outer.len(),
                });
            }
            let (outer_start, outer_end) = aligner.align(&a.outer, &b.outer, context, None)?;
            let (holes_start, holes_end) = hole_mapper.pair(&a.holes, &b.holes)?;
            let mut aligned_start = Vec::with_capacity(holes_start.len());
            let mut aligned_end = Vec::with_capacity(holes_end.len());
            for (hole_a, hole_b) in holes_start.iter().zip(&holes_end) {
                if hole_a.len() == hole_b.len() {
                    let (x, y) = hole_aligner.align(hole_a, hole_b, &AlignmentContext::closed(), None)?;
                    aligned_start.push(x);
                    aligned_end.push(y);
                } else {
                    warn!(
                        start = hole_a.len(),
                        end = hole_b.len(),
                        "hole vertex counts differ, hole will step"
                    );
                    aligned_start.push(hole_a.clone());
                    aligned_end.push(hole_b.clone());
                }
            }
            Ok(AlignedContours {
                start: ContourSet::with_holes(outer_start, aligned_start),
                end: ContourSet::with_holes(outer_end, aligned_end),
            })
        })
        .collect()
}

fn pair_sets(
    start: &[ContourSet],
    end: &[ContourSet],
    mapper: &HoleMapper,
) -> Result<Vec<(ContourSet, ContourSet)>, MorphError> {
    if start.len() == 1 && end.len() == 1 {
        return Ok(vec![(start[0].clone(), end[0].clone())]);
    }
    let matches = map_items(mapper, start, end, ContourSet::centroid)?;
    debug!(
        start = start.len(),
        end = end.len(),
        matches = matches.len(),
        "matched contour sets"
    );
    matches
        .into_iter()
        .map(|m| match (m.start(), m.end()) {
            (Some(i), Some(j)) => Ok((start[i].clone(), end[j].clone())),
            (Some(i), None) => Ok((start[i].clone(), start[i].collapsed())),
            (None, Some(j)) => Ok((end[j].collapsed(), end[j].clone())),
            (None, None) => Err(MorphError::EmptyMatch),
        })
        .collect()
}

/// Blends aligned contour pairs at fraction `t`.
pub fn interpolate_contours(pairs: &[AlignedContours], t: f64) -> Vec<ContourSet> {
    pairs
        .iter()
        .map(|pair| {
            let outer = pair.start.outer.lerp(&pair.end.outer, t);
            let holes = if pair.start.holes.len() == pair.end.holes.len() {
                pair.start
                    .holes
                    .iter()
                    .zip(&pair.end.holes)
                    .map(|(a, b)| a.lerp(b, t))
                    .collect()
            } else {
                warn!(
                    start = pair.start.holes.len(),
                    end = pair.end.holes.len(),
                    "hole counts differ after pairing, stepping holes"
                );
                step(&pair.start.holes, &pair.end.holes, t, 0.5)
            };
            ContourSet::with_holes(outer, holes.into_iter().map(close_loop).collect())
        })
        .collect()
}

fn close_loop(hole: VertexLoop) -> VertexLoop {
    if hole.is_closed() {
        hole
    } else {
        VertexLoop::closed(hole.into_points())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphline_data::Point;

    fn ring(n: usize, radius: f64, center: Point) -> VertexLoop {
        VertexLoop::closed(
            (0..n)
                .map(|i| {
                    let a = std::f64::consts::TAU * i as f64 / n as f64;
                    center + Point::new(radius * a.cos(), radius * a.sin())
                })
                .collect(),
        )
    }

    #[test]
    fn test_vertex_count_mismatch_fails_fast() {
        let a = [ContourSet::new(ring(8, 1.0, Point::ZERO))];
        let b = [ContourSet::new(ring(6, 1.0, Point::ZERO))];
        let err = align_contours(&a, &b, &AlignmentContext::closed(), None, Norm::L2)
            .unwrap_err();
        assert_eq!(err, MorphError::VertexCountMismatch { start: 9, end: 7 });
    }

    #[test]
    fn test_alignment_undoes_a_start_rotation() {
        let a = ring(8, 1.0, Point::ZERO);
        let b = a.rotate_start(3);
        let pairs = align_contours(
            &[ContourSet::new(a.clone())],
            &[ContourSet::new(b)],
            &AlignmentContext::closed(),
            None,
            Norm::L2,
        )
        .unwrap();
        assert_eq!(pairs.len(), 1);
        for (p, q) in pairs[0].start.outer.points().iter().zip(pairs[0].end.outer.points()) {
            assert!(p.distance(*q) < 1e-9);
        }
    }

    #[test]
    fn test_vanishing_hole_collapses() {
        let outer = ring(8, 10.0, Point::ZERO);
        let hole = ring(8, 2.0, Point::new(3.0, 0.0));
        let a = [ContourSet::with_holes(outer.clone(), vec![hole])];
        let b = [ContourSet::new(outer)];
        let pairs =
            align_contours(&a, &b, &AlignmentContext::closed(), None, Norm::L2).unwrap();
        assert_eq!(pairs[0].start.holes.len(), 1);
        assert_eq!(pairs[0].end.holes.len(), 1);

        let halfway = interpolate_contours(&pairs, 0.5);
        let hole = &halfway[0].holes[0];
        assert!(hole.is_closed());
        let centroid = hole.centroid();
        assert!((centroid - Point::new(3.0, 0.0)).length() < 1e-9);
        for p in &hole.points()[..hole.cycle_len()] {
            assert!((p.distance(centroid) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_extra_contour_set_grows_from_centroid() {
        let a = [ContourSet::new(ring(8, 1.0, Point::ZERO))];
        let b = [
            ContourSet::new(ring(8, 1.0, Point::new(0.5, 0.0))),
            ContourSet::new(ring(8, 1.0, Point::new(20.0, 0.0))),
        ];
        let pairs =
            align_contours(&a, &b, &AlignmentContext::closed(), None, Norm::L2).unwrap();
        assert_eq!(pairs.len(), 2);
        let grown = pairs
            .iter()
            .find(|p| (p.end.centroid() - Point::new(20.0, 0.0)).length() < 1e-9)
            .unwrap();
        assert!(grown
            .start
            .outer
            .points()
            .iter()
            .all(|p| (*p - Point::new(20.0, 0.0)).length() < 1e-9));
    }

    #[test]
    fn test_interpolation_hits_both_ends() {
        let a = ring(8, 1.0, Point::ZERO);
        let b = ring(8, 3.0, Point::ZERO);
        let pairs = vec![AlignedContours {
            start: ContourSet::new(a.clone()),
            end: ContourSet::new(b.clone()),
        }];
        let close = |x: &VertexLoop, y: &VertexLoop| {
            x.points().iter().zip(y.points()).all(|(p, q)| p.distance(*q) < 1e-12)
        };
        assert!(close(&interpolate_contours(&pairs, 0.0)[0].outer, &a));
        assert!(close(&interpolate_contours(&pairs, 1.0)[0].outer, &b));
        let mid = &interpolate_contours(&pairs, 0.5)[0].outer;
        assert!((mid.points()[0].length() - 2.0).abs() < 1e-9);
    }
}

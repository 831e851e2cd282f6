//! Hole pairing between two contour sets.
//!
//! Holes are matched greedily by centroid, with distances measured under the
//! configured `Norm`; the segment's collection mapper is never consulted.
//! A hole without a partner is paired with a degenerate copy of itself, all
//! vertices collapsed onto its centroid, so it grows from or shrinks into a
//! point instead of popping.

use super::greedy::greedy_matches;
use super::{map_items, Mapper, Match};
use crate::error::MorphError;
use morphline_data::{Norm, Point, VertexLoop};

/// Greedy nearest-centroid mapper for holes and disconnected contour sets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HoleMapper {
    norm: Norm,
}

impl HoleMapper {
    pub fn new(norm: Norm) -> Self {
        Self { norm }
    }

    pub fn norm(&self) -> Norm {
        self.norm
    }

    /// Returns two equally long hole lists whose entries correspond by index.
    pub fn pair(
        &self,
        start: &[VertexLoop],
        end: &[VertexLoop],
    ) -> Result<(Vec<VertexLoop>, Vec<VertexLoop>), MorphError> {
        let matches = map_items(self, start, end, VertexLoop::centroid)?;
        let mut paired_start = Vec::with_capacity(matches.len());
        let mut paired_end = Vec::with_capacity(matches.len());
        for m in matches {
            match (m.start(), m.end()) {
                (Some(i), Some(j)) => {
                    paired_start.push(start[i].clone());
                    paired_end.push(end[j].clone());
                }
                (Some(i), None) => {
                    paired_start.push(start[i].clone());
                    paired_end.push(start[i].collapsed());
                }
                (None, Some(j)) => {
                    paired_start.push(end[j].collapsed());
                    paired_end.push(end[j].clone());
                }
                (None, None) => return Err(MorphError::EmptyMatch),
            }
        }
        Ok((paired_start, paired_end))
    }
}

impl Mapper for HoleMapper {
    fn map(&self, start: &[Point], end: &[Point]) -> Result<Vec<Match>, MorphError> {
        Ok(greedy_matches(start, end, self.norm))
    }
}

use super::{trivial_matches, Mapper, Match};
use crate::error::MorphError;
use morphline_data::Point;

/// Globally optimal assignment minimizing total Euclidean distance.
///
/// Unequal counts are squared up by repeating the smaller side cyclically,
/// which yields merge/split matches like `ClusteringMapper` but with the
/// lowest possible total distance. Requires the `hungarian` feature.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HungarianMapper;

impl Mapper for HungarianMapper {
    fn map(&self, start: &[Point], end: &[Point]) -> Result<Vec<Match>, MorphError> {
        if let Some(matches) = trivial_matches(start, end) {
            return Ok(matches);
        }
        solve::map(start, end)
    }
}

#[cfg(feature = "hungarian")]
mod solve {
    use super::*;
    use ndarray::Array2;

    pub(super) fn map(start: &[Point], end: &[Point]) -> Result<Vec<Match>, MorphError> {
        let size = start.len().max(end.len());
        // Row r stands for start[r % n_start], column c for end[c % n_end].
        let costs = Array2::from_shape_fn((size, size), |(r, c)| {
            start[r % start.len()].distance(end[c % end.len()])
        });
        let assignment = assign(&costs);
        Ok(assignment
            .into_iter()
            .enumerate()
            .map(|(r, c)| Match::morph(r % start.len(), c % end.len()))
            .collect())
    }

    /// Kuhn-Munkres with row/column potentials, O(n^3). Returns the column
    /// assigned to each row of a square cost matrix.
    pub fn assign(costs: &Array2<f64>) -> Vec<usize> {
        let n = costs.nrows();
        let mut u = vec![0.0; n + 1];
        let mut v = vec![0.0; n + 1];
        // row_of[j]: 1-based row matched to column j; column 0 is a sentinel
        let mut row_of = vec![0usize; n + 1];
        let mut way = vec![0usize; n + 1];

        for row in 1..=n {
            row_of[0] = row;
            let mut col = 0;
            let mut min_slack = vec![f64::INFINITY; n + 1];
            let mut visited = vec![false; n + 1];
            loop {
                visited[col] = true;
                let i = row_of[col];
                let mut delta = f64::INFINITY;
                let mut next = 0;
                for j in 1..=n {
                    if visited[j] {
                        continue;
                    }
                    let slack = costs[[i - 1, j - 1]] - u[i] - v[j];
                    if slack < min_slack[j] {
                        min_slack[j] = slack;
                        way[j] = col;
                    }
                    if min_slack[j] < delta {
                        delta = min_slack[j];
                        next = j;
                    }
                }
                for j in 0..=n {
                    if visited[j] {
                        u[row_of[j]] += delta;
                        v[j] -= delta;
                    } else {
                        min_slack[j] -= delta;
                    }
                }
                col = next;
                if row_of[col] == 0 {
                    break;
                }
            }
            loop {
                let prev = way[col];
                row_of[col] = row_of[prev];
                col = prev;
                if col == 0 {
                    break;
                }
            }
        }

        let mut assignment = vec![0; n];
        for j in 1..=n {
            if row_of[j] != 0 {
                assignment[row_of[j] - 1] = j - 1;
            }
        }
        assignment
    }
}

#[cfg(not(feature = "hungarian"))]
mod solve {
    use super::*;

    pub(super) fn map(_start: &[Point], _end: &[Point]) -> Result<Vec<Match>, MorphError> {
        Err(MorphError::MapperUnavailable {
            mapper: "hungarian",
            remedy: "rebuild with the `hungarian` feature, or use the clustering or greedy mapper",
        })
    }
}

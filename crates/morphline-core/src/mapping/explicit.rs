use super::{Mapper, Match};
use crate::error::MorphError;
use morphline_data::Point;

/// Caller-specified correspondence; positions are ignored.
///
/// With `pairs`, each `(start, end)` index pair becomes a morph and every item
/// left unpaired becomes a destruction or creation. Without pairs, items are
/// matched in order and the longer side's tail fades.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplicitMapper {
    pub pairs: Option<Vec<(usize, usize)>>,
}

impl ExplicitMapper {
    pub fn new(pairs: Option<Vec<(usize, usize)>>) -> Self {
        Self { pairs }
    }

    pub fn in_order() -> Self {
        Self { pairs: None }
    }
}

impl Mapper for ExplicitMapper {
    fn map(&self, start: &[Point], end: &[Point]) -> Result<Vec<Match>, MorphError> {
        let Some(pairs) = &self.pairs else {
            let shared = start.len().min(end.len());
            return Ok((0..shared)
                .map(|i| Match::morph(i, i))
                .chain((shared..start.len()).map(Match::destruction))
                .chain((shared..end.len()).map(Match::creation))
                .collect());
        };

        let mut start_used = vec![false; start.len()];
        let mut end_used = vec![false; end.len()];
        let mut matches = Vec::with_capacity(pairs.len());
        for &(i, j) in pairs {
            if i >= start.len() || j >= end.len() {
                return Err(MorphError::IndexOutOfRange {
                    start: i,
                    end: j,
                    start_len: start.len(),
                    end_len: end.len(),
                });
            }
            start_used[i] = true;
            end_used[j] = true;
            matches.push(Match::morph(i, j));
        }
        matches.extend((0..start.len()).filter(|&i| !start_used[i]).map(Match::destruction));
        matches.extend((0..end.len()).filter(|&j| !end_used[j]).map(Match::creation));
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn test_pairs_ignore_position() {
        let mapper = ExplicitMapper::new(Some(vec![(0, 2), (2, 0)]));
        let matches = mapper.map(&items(3), &items(4)).unwrap();
        assert_eq!(
            matches,
            vec![
                Match::morph(0, 2),
                Match::morph(2, 0),
                Match::destruction(1),
                Match::creation(1),
                Match::creation(3),
            ]
        );
    }

    #[test]
    fn test_out_of_range_pair_names_the_index() {
        let mapper = ExplicitMapper::new(Some(vec![(0, 0), (5, 1)]));
        let err = mapper.map(&items(2), &items(2)).unwrap_err();
        assert_eq!(
            err,
            MorphError::IndexOutOfRange {
                start: 5,
                end: 1,
                start_len: 2,
                end_len: 2
            }
        );
        assert!(err.to_string().contains("(5, 1)"));
    }

    #[test]
    fn test_in_order_without_pairs() {
        let matches = ExplicitMapper::in_order().map(&items(3), &items(1)).unwrap();
        assert_eq!(
            matches,
            vec![Match::morph(0, 0), Match::destruction(1), Match::destruction(2)]
        );
    }
}

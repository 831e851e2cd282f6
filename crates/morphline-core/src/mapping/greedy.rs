use super::{nearest_unused, trivial_matches, Mapper, Match};
use crate::error::MorphError;
use morphline_data::{Norm, Point};

/// Nearest-neighbour matching without reuse.
///
/// The smaller side is walked in order and each item takes its nearest
/// still-free partner; leftovers of the larger side become creations or
/// destructions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GreedyMapper;

impl Mapper for GreedyMapper {
    fn map(&self, start: &[Point], end: &[Point]) -> Result<Vec<Match>, MorphError> {
        Ok(greedy_matches(start, end, Norm::L2))
    }
}

/// Greedy nearest-first matching with distances measured under `norm`.
pub(crate) fn greedy_matches(start: &[Point], end: &[Point], norm: Norm) -> Vec<Match> {
    if let Some(matches) = trivial_matches(start, end) {
        return matches;
    }
    let mut matches = Vec::with_capacity(start.len().max(end.len()));

    if start.len() <= end.len() {
        let mut used = vec![false; end.len()];
        for (i, p) in start.iter().enumerate() {
            if let Some(j) = nearest_unused(*p, end, &used, norm) {
                used[j] = true;
                matches.push(Match::morph(i, j));
            }
        }
        matches.extend(
            used.iter()
                .enumerate()
                .filter(|(_, taken)| !**taken)
                .map(|(j, _)| Match::creation(j)),
        );
    } else {
        let mut used = vec![false; start.len()];
        for (j, p) in end.iter().enumerate() {
            if let Some(i) = nearest_unused(*p, start, &used, norm) {
                used[i] = true;
                matches.push(Match::morph(i, j));
            }
        }
        matches.extend(
            used.iter()
                .enumerate()
                .filter(|(_, taken)| !**taken)
                .map(|(i, _)| Match::destruction(i)),
        );
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_counts_form_a_bijection() {
        let start = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)];
        let end = [Point::new(21.0, 0.0), Point::new(1.0, 0.0), Point::new(11.0, 0.0)];
        let matches = GreedyMapper.map(&start, &end).unwrap();
        assert_eq!(
            matches,
            vec![Match::morph(0, 1), Match::morph(1, 2), Match::morph(2, 0)]
        );
    }

    #[test]
    fn test_extra_end_items_are_created() {
        let start = [Point::new(0.0, 0.0)];
        let end = [Point::new(50.0, 0.0), Point::new(1.0, 0.0)];
        let matches = GreedyMapper.map(&start, &end).unwrap();
        assert_eq!(matches, vec![Match::morph(0, 1), Match::creation(0)]);
    }

    #[test]
    fn test_extra_start_items_are_destroyed() {
        let start = [Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(9.0, 0.0)];
        let end = [Point::new(10.0, 0.0)];
        let matches = GreedyMapper.map(&start, &end).unwrap();
        assert_eq!(
            matches,
            vec![Match::morph(2, 0), Match::destruction(0), Match::destruction(1)]
        );
    }

    #[test]
    fn test_one_side_empty() {
        let items = [Point::ZERO, Point::ONE];
        assert_eq!(
            GreedyMapper.map(&items, &[]).unwrap(),
            vec![Match::destruction(0), Match::destruction(1)]
        );
        assert_eq!(
            GreedyMapper.map(&[], &items).unwrap(),
            vec![Match::creation(0), Match::creation(1)]
        );
    }
}

use super::{nearest_unused, trivial_matches, GreedyMapper, Mapper, Match};
use crate::error::MorphError;
use morphline_data::{Norm, Point};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Merge/split mapping through k-means.
///
/// The larger side is partitioned into as many clusters as the smaller side
/// has items. Each cluster centroid claims its nearest free partner and every
/// member of the cluster morphs to or from that partner. Equal counts fall
/// back to `GreedyMapper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringMapper {
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for ClusteringMapper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ITERATIONS, Self::DEFAULT_SEED)
    }
}

impl ClusteringMapper {
    pub const DEFAULT_MAX_ITERATIONS: usize = 50;
    pub const DEFAULT_SEED: u64 = 42;

    pub fn new(max_iterations: usize, seed: u64) -> Self {
        Self {
            max_iterations,
            seed,
        }
    }

    /// Groups `larger` into `smaller.len()` clusters and pairs each cluster
    /// with an item of `smaller`. Returns (index in larger, index in smaller).
    fn pair_clusters(&self, larger: &[Point], smaller: &[Point]) -> (Vec<(usize, usize)>, Vec<bool>) {
        let k = smaller.len();
        let labels = kmeans(larger, k, self.max_iterations, self.seed);
        let mut used = vec![false; k];
        let mut pairs = Vec::with_capacity(larger.len());
        for cluster in 0..k {
            let members: Vec<usize> = (0..larger.len()).filter(|&i| labels[i] == cluster).collect();
            if members.is_empty() {
                continue;
            }
            let centroid =
                members.iter().map(|&i| larger[i]).sum::<Point>() / members.len() as f64;
            if let Some(partner) = nearest_unused(centroid, smaller, &used, Norm::L2) {
                used[partner] = true;
                pairs.extend(members.into_iter().map(|i| (i, partner)));
            }
        }
        (pairs, used)
    }
}

impl Mapper for ClusteringMapper {
    fn map(&self, start: &[Point], end: &[Point]) -> Result<Vec<Match>, MorphError> {
        if let Some(matches) = trivial_matches(start, end) {
            return Ok(matches);
        }
        if start.len() == end.len() {
            return GreedyMapper.map(start, end);
        }

        let mut matches = Vec::new();
        if start.len() > end.len() {
            // merge: several start items collapse into one end item
            let (pairs, used) = self.pair_clusters(start, end);
            debug!(clusters = end.len(), items = start.len(), "clustering merge");
            matches.extend(pairs.into_iter().map(|(i, j)| Match::morph(i, j)));
            matches.extend(
                used.iter()
                    .enumerate()
                    .filter(|(_, taken)| !**taken)
                    .map(|(j, _)| Match::creation(j)),
            );
        } else {
            // split: one start item fans out into several end items
            let (pairs, used) = self.pair_clusters(end, start);
            debug!(clusters = start.len(), items = end.len(), "clustering split");
            matches.extend(pairs.into_iter().map(|(j, i)| Match::morph(i, j)));
            matches.extend(
                used.iter()
                    .enumerate()
                    .filter(|(_, taken)| !**taken)
                    .map(|(i, _)| Match::destruction(i)),
            );
        }
        Ok(matches)
    }
}

/// Lloyd's k-means seeded from `k` distinct random points.
///
/// Stops when assignments settle or after `max_iterations` rounds. With
/// `k >= points.len()` every point is its own cluster.
pub fn kmeans(points: &[Point], k: usize, max_iterations: usize, seed: u64) -> Vec<usize> {
    let n = points.len();
    if k == 0 || n == 0 {
        return vec![0; n];
    }
    if k >= n {
        return (0..n).collect();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids: Vec<Point> = rand::seq::index::sample(&mut rng, n, k)
        .into_iter()
        .map(|i| points[i])
        .collect();
    let mut labels = vec![usize::MAX; n];

    for _ in 0..max_iterations.max(1) {
        let mut changed = false;
        for (i, p) in points.iter().enumerate() {
            let mut best = (0, f64::INFINITY);
            for (c, centroid) in centroids.iter().enumerate() {
                let d = p.distance_squared(*centroid);
                if d < best.1 {
                    best = (c, d);
                }
            }
            if labels[i] != best.0 {
                labels[i] = best.0;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        for (c, centroid) in centroids.iter_mut().enumerate() {
            let (sum, count) = points
                .iter()
                .zip(&labels)
                .filter(|(_, label)| **label == c)
                .fold((Point::ZERO, 0usize), |(sum, count), (p, _)| (sum + *p, count + 1));
            // an empty cluster keeps its previous centroid
            if count > 0 {
                *centroid = sum / count as f64;
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(center: Point, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| center + Point::new(i as f64 * 0.5, (i % 2) as f64 * 0.5))
            .collect()
    }

    #[test]
    fn test_merge_maps_each_cluster_to_one_target() {
        let mut start = blob(Point::new(0.0, 0.0), 3);
        start.extend(blob(Point::new(100.0, 0.0), 3));
        let end = [Point::new(101.0, 0.0), Point::new(1.0, 0.0)];
        let matches = ClusteringMapper::default().map(&start, &end).unwrap();

        assert_eq!(matches.len(), 6);
        for m in &matches {
            let (i, j) = (m.start().unwrap(), m.end().unwrap());
            let expected = if i < 3 { 1 } else { 0 };
            assert_eq!(j, expected, "start {i} went to {j}");
        }
    }

    #[test]
    fn test_split_fans_out_from_each_source() {
        let start = [Point::new(0.0, 0.0), Point::new(100.0, 100.0)];
        let mut end = blob(Point::new(100.0, 100.0), 2);
        end.extend(blob(Point::new(0.0, 0.0), 4));
        let matches = ClusteringMapper::default().map(&start, &end).unwrap();

        assert_eq!(matches.len(), 6);
        assert!(matches.iter().all(Match::is_morph));
        for m in &matches {
            let expected = if m.end().unwrap() < 2 { 1 } else { 0 };
            assert_eq!(m.start(), Some(expected));
        }
    }

    #[test]
    fn test_equal_counts_use_greedy() {
        let start = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let end = [Point::new(10.0, 1.0), Point::new(0.0, 1.0)];
        assert_eq!(
            ClusteringMapper::default().map(&start, &end).unwrap(),
            GreedyMapper.map(&start, &end).unwrap()
        );
    }

    #[test]
    fn test_kmeans_is_deterministic_for_a_seed() {
        let points: Vec<Point> = (0..20).map(|i| Point::new((i * 7 % 13) as f64, (i * 3 % 5) as f64)).collect();
        assert_eq!(kmeans(&points, 4, 50, 7), kmeans(&points, 4, 50, 7));
        assert_eq!(kmeans(&points, 25, 50, 7), (0..20).collect::<Vec<_>>());
    }
}

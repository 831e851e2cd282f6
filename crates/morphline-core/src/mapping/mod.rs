//! Collection mapping: pairing the members of two differently sized
//! collections of positioned items.
//!
//! ## Responsibilities
//! - **Matching**: produce `Match`es that are morphs, creations or destructions.
//! - **Strategies**: simple crossfade, greedy nearest neighbour, k-means
//!   clustering, optimal assignment, caller-specified pairs.
//! - **Holes**: greedy centroid pairing of holes and contour sets under a
//!   configurable `Norm` (`holes`), independent of the segment's mapper.
//!
//! Mappers only see positions; `map_items` adapts any item type through a
//! position accessor.

use crate::error::MorphError;
use morphline_data::{Norm, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

mod clustering;
mod explicit;
mod greedy;
pub mod holes;
mod hungarian;

pub use clustering::ClusteringMapper;
pub use explicit::ExplicitMapper;
pub use greedy::GreedyMapper;
pub use holes::HoleMapper;
pub use hungarian::HungarianMapper;

/// One correspondence between the start and end collections, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    start: Option<usize>,
    end: Option<usize>,
}

impl Match {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Result<Self, MorphError> {
        if start.is_none() && end.is_none() {
            return Err(MorphError::EmptyMatch);
        }
        Ok(Self { start, end })
    }

    pub fn morph(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// An end item that has no start counterpart.
    pub fn creation(end: usize) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// A start item that has no end counterpart.
    pub fn destruction(start: usize) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn start(&self) -> Option<usize> {
        self.start
    }

    pub fn end(&self) -> Option<usize> {
        self.end
    }

    pub fn is_morph(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn is_creation(&self) -> bool {
        self.start.is_none()
    }

    pub fn is_destruction(&self) -> bool {
        self.end.is_none()
    }
}

pub trait Mapper: Send + Sync + fmt::Debug {
    fn map(&self, start: &[Point], end: &[Point]) -> Result<Vec<Match>, MorphError>;
}

/// Maps two item collections, reading each item's position with `position_of`.
pub fn map_items<T, F>(
    mapper: &dyn Mapper,
    start: &[T],
    end: &[T],
    position_of: F,
) -> Result<Vec<Match>, MorphError>
where
    F: Fn(&T) -> Point,
{
    let start: Vec<Point> = start.iter().map(&position_of).collect();
    let end: Vec<Point> = end.iter().map(&position_of).collect();
    mapper.map(&start, &end)
}

/// Matches for the trivial cases every strategy shares: either side empty.
pub(crate) fn trivial_matches(start: &[Point], end: &[Point]) -> Option<Vec<Match>> {
    if start.is_empty() {
        return Some((0..end.len()).map(Match::creation).collect());
    }
    if end.is_empty() {
        return Some((0..start.len()).map(Match::destruction).collect());
    }
    None
}

/// Index of the unused candidate nearest to `target` under `norm`; the first
/// minimum wins.
pub(crate) fn nearest_unused(
    target: Point,
    candidates: &[Point],
    used: &[bool],
    norm: Norm,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        if used[i] {
            continue;
        }
        let distance = norm.point_distance(target, *candidate);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

/// No correspondence at all: everything fades out, then everything fades in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimpleMapper;

impl Mapper for SimpleMapper {
    fn map(&self, start: &[Point], end: &[Point]) -> Result<Vec<Match>, MorphError> {
        Ok((0..start.len())
            .map(Match::destruction)
            .chain((0..end.len()).map(Match::creation))
            .collect())
    }
}

/// Named mapper choice as it appears in configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum MapperStrategy {
    Simple,
    #[default]
    Greedy,
    Clustering {
        #[serde(default = "default_max_iterations")]
        max_iterations: usize,
        #[serde(default = "default_seed")]
        seed: u64,
    },
    Hungarian,
    Explicit {
        #[serde(default)]
        pairs: Option<Vec<(usize, usize)>>,
    },
    #[serde(skip)]
    Custom(CustomMapper),
}

fn default_max_iterations() -> usize {
    ClusteringMapper::DEFAULT_MAX_ITERATIONS
}

fn default_seed() -> u64 {
    ClusteringMapper::DEFAULT_SEED
}

/// Wraps a caller-provided mapper so it can sit in a `MapperStrategy`.
#[derive(Clone, Debug)]
pub struct CustomMapper(pub Arc<dyn Mapper>);

impl PartialEq for CustomMapper {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl MapperStrategy {
    pub fn clustering() -> Self {
        MapperStrategy::Clustering {
            max_iterations: default_max_iterations(),
            seed: default_seed(),
        }
    }
}

impl Mapper for MapperStrategy {
    fn map(&self, start: &[Point], end: &[Point]) -> Result<Vec<Match>, MorphError> {
        match self {
            MapperStrategy::Simple => SimpleMapper.map(start, end),
            MapperStrategy::Greedy => GreedyMapper.map(start, end),
            MapperStrategy::Clustering {
                max_iterations,
                seed,
            } => ClusteringMapper::new(*max_iterations, *seed).map(start, end),
            MapperStrategy::Hungarian => HungarianMapper.map(start, end),
            MapperStrategy::Explicit { pairs } => ExplicitMapper::new(pairs.clone()).map(start, end),
            MapperStrategy::Custom(custom) => custom.0.map(start, end),
        }
    }
}

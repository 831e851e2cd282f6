//! Per-segment memoization of alignment and matching results.
//!
//! Neither the vertex offset an aligner picks nor the match list a mapper
//! returns depends on the blend fraction, so both are computed once per
//! segment and shared by every frame. Each entry is initialised at most once,
//! no matter how many threads ask for it concurrently.

use crate::error::MorphError;
use crate::mapping::Match;
use crate::morph::AlignedContours;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::debug;

/// Segment index plus the field path inside the record tree, e.g.
/// `/geometry` or `/clips/0>1/geometry`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
    pub segment: usize,
    pub path: String,
}

impl PlanKey {
    pub fn new(segment: usize, path: impl Into<String>) -> Self {
        Self {
            segment,
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Aligned contour pairs for a geometry morph.
    Contours(Vec<AlignedContours>),
    /// Correspondence between two record lists.
    Matches(Vec<Match>),
}

type Slot = Arc<OnceLock<Result<Arc<Plan>, MorphError>>>;

#[derive(Debug, Default)]
pub struct PlanCache {
    slots: Mutex<HashMap<PlanKey, Slot>>,
    computations: AtomicUsize,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached plan for `key`, running `compute` if this is the
    /// first request. Failures are cached too.
    pub fn get_or_compute<F>(&self, key: PlanKey, compute: F) -> Result<Arc<Plan>, MorphError>
    where
        F: FnOnce() -> Result<Plan, MorphError>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.entry(key.clone()).or_default().clone()
        };
        slot.get_or_init(|| {
            self.computations.fetch_add(1, Ordering::Relaxed);
            debug!(segment = key.segment, path = %key.path, "computing segment plan");
            compute().map(Arc::new)
        })
        .clone()
    }

    pub fn get(&self, key: &PlanKey) -> Option<Result<Arc<Plan>, MorphError>> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Drops every plan; the next request recomputes.
    pub fn invalidate(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if !slots.is_empty() {
            debug!(entries = slots.len(), "invalidating segment plans");
        }
        slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many plans have been computed over the cache's lifetime.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_computes_once_per_key() {
        let cache = PlanCache::new();
        let key = PlanKey::new(0, "/clips");
        for _ in 0..3 {
            let plan = cache
                .get_or_compute(key.clone(), || Ok(Plan::Matches(vec![Match::creation(0)])))
                .unwrap();
            assert_eq!(*plan, Plan::Matches(vec![Match::creation(0)]));
        }
        assert_eq!(cache.computations(), 1);

        cache
            .get_or_compute(PlanKey::new(1, "/clips"), || Ok(Plan::Matches(Vec::new())))
            .unwrap();
        assert_eq!(cache.computations(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failures_are_memoized() {
        let cache = PlanCache::new();
        let key = PlanKey::new(3, "/geometry");
        let first = cache.get_or_compute(key.clone(), || {
            Err(MorphError::VertexCountMismatch { start: 4, end: 5 })
        });
        let second = cache.get_or_compute(key.clone(), || Ok(Plan::Matches(Vec::new())));
        assert_eq!(first.unwrap_err(), MorphError::VertexCountMismatch { start: 4, end: 5 });
        assert!(second.is_err());
        assert_eq!(cache.computations(), 1);
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let cache = PlanCache::new();
        let key = PlanKey::new(0, "/geometry");
        cache
            .get_or_compute(key.clone(), || Ok(Plan::Matches(Vec::new())))
            .unwrap();
        cache.invalidate();
        assert!(cache.is_empty());
        cache
            .get_or_compute(key, || Ok(Plan::Matches(Vec::new())))
            .unwrap();
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn test_concurrent_requests_share_one_computation() {
        let cache = Arc::new(PlanCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache
                        .get_or_compute(PlanKey::new(0, "/geometry"), || {
                            thread::sleep(std::time::Duration::from_millis(10));
                            Ok(Plan::Matches(vec![Match::morph(0, 0)]))
                        })
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(*handle.join().unwrap(), Plan::Matches(vec![Match::morph(0, 0)]));
        }
        assert_eq!(cache.computations(), 1);
    }
}

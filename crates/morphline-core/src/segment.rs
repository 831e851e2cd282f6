//! Per-segment override bundle attached to a keystate.

use crate::align::AlignerStrategy;
use crate::curve::Curve;
use crate::easing::Easing;
use crate::mapping::MapperStrategy;
use morphline_data::{Field, ShapeState};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Custom blend of one scalar field: `(start, end, eased_t) -> value`.
#[derive(Clone)]
pub struct ScalarFn(pub Arc<dyn Fn(f64, f64, f64) -> f64 + Send + Sync>);

impl fmt::Debug for ScalarFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScalarFn(..)")
    }
}

/// Replaces field-by-field blending for a whole segment:
/// `(start, end, raw_t) -> record`.
#[derive(Clone)]
pub struct StateFn(pub Arc<dyn Fn(&ShapeState, &ShapeState, f64) -> ShapeState + Send + Sync>);

impl fmt::Debug for StateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateFn(..)")
    }
}

/// Mapper and aligner chosen for one segment; unset parts fall back to the
/// engine defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphingConfig {
    pub mapper: Option<MapperStrategy>,
    pub aligner: Option<AlignerStrategy>,
}

impl MorphingConfig {
    pub fn mapper(mapper: MapperStrategy) -> Self {
        Self {
            mapper: Some(mapper),
            aligner: None,
        }
    }

    pub fn aligner(aligner: AlignerStrategy) -> Self {
        Self {
            mapper: None,
            aligner: Some(aligner),
        }
    }
}

/// Everything a segment may override.
#[derive(Debug, Clone, Default)]
pub struct SegmentOverrides {
    pub easing: HashMap<Field, Easing>,
    pub curves: HashMap<Field, Curve>,
    pub scalar: HashMap<Field, ScalarFn>,
    pub morphing: Option<MorphingConfig>,
    /// Blend rotation numerically instead of along the shorter arc, so
    /// multi-turn spins survive.
    pub linear_angles: bool,
    pub state_fn: Option<StateFn>,
}

impl SegmentOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ease(mut self, field: Field, easing: Easing) -> Self {
        self.easing.insert(field, easing);
        self
    }

    /// Same easing for every field.
    pub fn ease_all(mut self, easing: Easing) -> Self {
        for field in Field::ALL {
            self.easing.insert(field, easing.clone());
        }
        self
    }

    pub fn curve(mut self, field: Field, curve: Curve) -> Self {
        self.curves.insert(field, curve);
        self
    }

    pub fn scalar<F>(mut self, field: Field, f: F) -> Self
    where
        F: Fn(f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.scalar.insert(field, ScalarFn(Arc::new(f)));
        self
    }

    pub fn morphing(mut self, morphing: MorphingConfig) -> Self {
        self.morphing = Some(morphing);
        self
    }

    pub fn linear_angles(mut self, linear: bool) -> Self {
        self.linear_angles = linear;
        self
    }

    pub fn state_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&ShapeState, &ShapeState, f64) -> ShapeState + Send + Sync + 'static,
    {
        self.state_fn = Some(StateFn(Arc::new(f)));
        self
    }

    /// Fills every entry this bundle leaves unset from `fallback`.
    pub fn merged_with(&self, fallback: &SegmentOverrides) -> SegmentOverrides {
        let mut merged = self.clone();
        for (field, easing) in &fallback.easing {
            merged.easing.entry(*field).or_insert_with(|| easing.clone());
        }
        for (field, curve) in &fallback.curves {
            merged.curves.entry(*field).or_insert_with(|| curve.clone());
        }
        for (field, f) in &fallback.scalar {
            merged.scalar.entry(*field).or_insert_with(|| f.clone());
        }
        merged.morphing = match (&self.morphing, &fallback.morphing) {
            (Some(own), Some(other)) => Some(MorphingConfig {
                mapper: own.mapper.clone().or_else(|| other.mapper.clone()),
                aligner: own.aligner.clone().or_else(|| other.aligner.clone()),
            }),
            (own, other) => own.clone().or_else(|| other.clone()),
        };
        merged.linear_angles = self.linear_angles || fallback.linear_angles;
        if merged.state_fn.is_none() {
            merged.state_fn = fallback.state_fn.clone();
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_own_entries() {
        let own = SegmentOverrides::new()
            .ease(Field::Pos, Easing::EaseIn)
            .morphing(MorphingConfig::aligner(AlignerStrategy::Sequential));
        let fallback = SegmentOverrides::new()
            .ease(Field::Pos, Easing::EaseOut)
            .ease(Field::Opacity, Easing::EaseInOut)
            .morphing(MorphingConfig::mapper(MapperStrategy::Simple))
            .linear_angles(true);
        let merged = own.merged_with(&fallback);
        assert_eq!(merged.easing[&Field::Pos], Easing::EaseIn);
        assert_eq!(merged.easing[&Field::Opacity], Easing::EaseInOut);
        assert_eq!(
            merged.morphing,
            Some(MorphingConfig {
                mapper: Some(MapperStrategy::Simple),
                aligner: Some(AlignerStrategy::Sequential),
            })
        );
        assert!(merged.linear_angles);
    }
}

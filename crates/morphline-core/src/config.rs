use crate::align::AlignerStrategy;
use crate::easing::Easing;
use crate::mapping::MapperStrategy;
use morphline_data::{ColorSpace, Field, Norm};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Engine-wide defaults consulted whenever a segment does not say otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphDefaults {
    pub mapper: MapperStrategy,
    /// `None` selects an aligner from the closure of the two shapes.
    pub aligner: Option<AlignerStrategy>,
    pub norm: Norm,
    pub color_space: ColorSpace,
    pub field_easing: HashMap<Field, Easing>,
    pub fallback_easing: Easing,
    /// Fraction at which discrete fields and whole-record steps switch sides.
    pub step_threshold: f64,
}

impl Default for MorphDefaults {
    fn default() -> Self {
        Self {
            mapper: MapperStrategy::Greedy,
            aligner: None,
            norm: Norm::L2,
            color_space: ColorSpace::Lab,
            field_easing: HashMap::new(),
            fallback_easing: Easing::Linear,
            step_threshold: 0.5,
        }
    }
}

impl MorphDefaults {
    pub fn with_mapper(mut self, mapper: MapperStrategy) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_aligner(mut self, aligner: AlignerStrategy) -> Self {
        self.aligner = Some(aligner);
        self
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    pub fn with_field_easing(mut self, field: Field, easing: Easing) -> Self {
        self.field_easing.insert(field, easing);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let defaults: MorphDefaults = serde_json::from_str(
            r#"{
                "mapper": {"strategy": "clustering", "seed": 7},
                "color_space": "lch",
                "field_easing": {"pos": "ease_in_out"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            defaults.mapper,
            MapperStrategy::Clustering {
                max_iterations: 50,
                seed: 7
            }
        );
        assert_eq!(defaults.color_space, ColorSpace::Lch);
        assert_eq!(defaults.field_easing.get(&Field::Pos), Some(&Easing::EaseInOut));
        assert_eq!(defaults.norm, Norm::L2);
        assert_eq!(defaults.step_threshold, 0.5);
        assert!(defaults.aligner.is_none());
    }
}

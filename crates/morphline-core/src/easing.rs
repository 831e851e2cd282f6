use keyframe::EasingFunction;
use morphline_data::{Field, ShapeKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// User-supplied easing curve.
#[derive(Clone)]
pub struct CustomEasing(pub Arc<dyn Fn(f64) -> f64 + Send + Sync>);

impl fmt::Debug for CustomEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomEasing(..)")
    }
}

impl PartialEq for CustomEasing {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// Store easing types uniformly so they can live in config files and maps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    /// Holds the start value until the very end of the segment.
    Hold,
    #[serde(skip)]
    Custom(CustomEasing),
}

impl EasingFunction for Easing {
    fn y(&self, x: f64) -> f64 {
        match self {
            Easing::Linear => keyframe::functions::Linear.y(x),
            Easing::EaseIn => keyframe::functions::EaseIn.y(x),
            Easing::EaseOut => keyframe::functions::EaseOut.y(x),
            Easing::EaseInOut => keyframe::functions::EaseInOut.y(x),
            Easing::EaseInQuad => keyframe::functions::EaseInQuad.y(x),
            Easing::EaseOutQuad => keyframe::functions::EaseOutQuad.y(x),
            Easing::EaseInOutQuad => keyframe::functions::EaseInOutQuad.y(x),
            Easing::EaseInCubic => keyframe::functions::EaseInCubic.y(x),
            Easing::EaseOutCubic => keyframe::functions::EaseOutCubic.y(x),
            Easing::EaseInOutCubic => keyframe::functions::EaseInOutCubic.y(x),
            Easing::Hold => {
                if x >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Easing::Custom(custom) => (custom.0)(x),
        }
    }
}

impl Easing {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Easing::Custom(CustomEasing(Arc::new(f)))
    }

    /// Eases a segment fraction. Endpoints pass through untouched.
    pub fn ease(&self, t: f64) -> f64 {
        if t <= 0.0 {
            0.0
        } else if t >= 1.0 {
            1.0
        } else {
            self.y(t)
        }
    }
}

/// Easing a shape kind applies to one of its fields when nothing more
/// specific is configured.
pub fn kind_default_easing(kind: &ShapeKind, field: Field) -> Option<Easing> {
    match (kind, field) {
        (ShapeKind::Glyph { .. }, Field::Geometry) => Some(Easing::EaseInOut),
        (ShapeKind::Group { .. }, Field::Geometry) => Some(Easing::EaseInOutQuad),
        _ => None,
    }
}

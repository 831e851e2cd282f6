//! Morph and interpolation core.
//!
//! Blends shape records between keystates: vertex alignment, collection
//! mapping, the field-by-field interpolation engine and the keystate
//! timeline that picks which two records to blend.

pub mod align;
pub mod animatable;
pub mod config;
pub mod curve;
pub mod easing;
pub mod error;
pub mod interpolate;
pub mod mapping;
pub mod morph;
pub mod plan;
pub mod segment;
pub mod segments;
pub mod timeline;

pub use align::{get_aligner, AlignerStrategy, AlignmentContext, VertexAligner};
pub use config::MorphDefaults;
pub use curve::Curve;
pub use easing::Easing;
pub use error::MorphError;
pub use interpolate::{interpolate, Interpolator};
pub use mapping::{Mapper, MapperStrategy, Match};
pub use plan::PlanCache;
pub use segment::{MorphingConfig, SegmentOverrides};
pub use timeline::{resolve, CutSide, Element, ElementBuilder, Keystate};

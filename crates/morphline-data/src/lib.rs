//! Plain data for the morph engine: vertex geometry, colors and shape states.
//!
//! Nothing in this crate interpolates over time; it only describes the values
//! that `morphline-core` blends.

pub mod color;
pub mod geometry;
pub mod shape;
pub mod state;

pub use color::{Color, ColorError, ColorSpace};
pub use geometry::{ContourSet, Norm, Point, VertexLoop};
pub use shape::ShapeKind;
pub use state::{Blend, Field, MorphGeometry, ShapeState, DEFAULT_NUM_VERTICES};

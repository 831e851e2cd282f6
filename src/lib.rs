//! # Morphline
//!
//! Morphing and interpolation for 2D motion graphics.
//!
//! Shapes are described by [`ShapeState`] records placed at keystates on an
//! [`Element`] timeline. Resolving an element at some time blends the two
//! surrounding records field by field, morphing outlines of different kinds
//! through vertex alignment and matching collections of clips, masks and
//! group members.
//!
//! Scenes of elements can be chained into a [`SceneSequence`] with
//! transitions between them; [`remap_sequence_time`] tells which scene or
//! transition is active at a global time.
//!
//! The heavy lifting lives in `morphline-core` (engine) and
//! `morphline-data` (records and geometry); this crate adds configuration,
//! sequencing and parallel frame sampling.

pub mod config;
pub mod frames;
pub mod sequence;
pub mod transitions;

pub use morphline_core;
pub use morphline_data;

pub use config::EngineConfig;
pub use frames::{
    resolve_all, resolve_frames, sequence_frame, sequence_frames, Frame, FrameError, Scene,
};
pub use morphline_core::{
    interpolate, resolve, AlignerStrategy, CutSide, Easing, Element, ElementBuilder, Keystate,
    MapperStrategy, MorphDefaults, MorphError, MorphingConfig, SegmentOverrides,
};
pub use morphline_data::{Color, ColorSpace, Field, Point, ShapeKind, ShapeState};
pub use sequence::{
    remap_sequence_time, ActiveUnit, SceneSequence, SceneTransition, SequenceError, Slot, Window,
};
pub use transitions::{Direction, TransitionKind};

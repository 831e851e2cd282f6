//! Shape states: the immutable attribute records the engine blends.

use crate::color::Color;
use crate::geometry::{ContourSet, Point};
use crate::shape::ShapeKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_NUM_VERTICES: usize = 128;

/// Addressable attribute of a `ShapeState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Pos,
    Rotation,
    Scale,
    Opacity,
    FillColor,
    FillOpacity,
    StrokeColor,
    StrokeOpacity,
    StrokeWidth,
    ZIndex,
    NumVertices,
    /// Shape parameters, or the morphed outline when kinds differ.
    Geometry,
    Clip,
    Mask,
    Clips,
    Masks,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Pos,
        Field::Rotation,
        Field::Scale,
        Field::Opacity,
        Field::FillColor,
        Field::FillOpacity,
        Field::StrokeColor,
        Field::StrokeOpacity,
        Field::StrokeWidth,
        Field::ZIndex,
        Field::NumVertices,
        Field::Geometry,
        Field::Clip,
        Field::Mask,
        Field::Clips,
        Field::Masks,
    ];
}

/// How a field moves between two records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blend {
    /// Linear blend of the eased fraction.
    Continuous,
    /// Degrees, blended along the shorter arc.
    Angle,
    /// Snaps from start to end once the fraction reaches `threshold`.
    Step { threshold: f64 },
    /// Structural; copied from whichever endpoint the record snaps to.
    Fixed,
}

impl ShapeKind {
    /// Blend policy of `field` for records of this kind.
    pub fn field_blend(&self, field: Field) -> Blend {
        match (self, field) {
            (_, Field::NumVertices) => Blend::Fixed,
            (_, Field::Rotation) => Blend::Angle,
            (_, Field::ZIndex) => Blend::Step { threshold: 0.5 },
            (ShapeKind::Line { .. }, Field::FillColor | Field::FillOpacity) => Blend::Fixed,
            _ => Blend::Continuous,
        }
    }
}

/// Interpolated outline attached to a record while it is mid-morph.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphGeometry {
    pub contours: Vec<ContourSet>,
}

/// Attribute record of one shape at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeState {
    #[serde(flatten)]
    pub kind: ShapeKind,
    #[serde(default)]
    pub pos: Point,
    #[serde(default)]
    pub rotation: f64, // degrees
    #[serde(default = "default_one")]
    pub scale: f64,
    #[serde(default = "default_one")]
    pub opacity: f64,
    #[serde(default)]
    pub fill_color: Color,
    #[serde(default = "default_one")]
    pub fill_opacity: f64,
    #[serde(default = "default_stroke")]
    pub stroke_color: Color,
    #[serde(default = "default_one")]
    pub stroke_opacity: f64,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default)]
    pub z_index: f64,
    #[serde(default = "default_num_vertices")]
    pub num_vertices: usize,
    #[serde(default)]
    pub clip: Option<Box<ShapeState>>,
    #[serde(default)]
    pub mask: Option<Box<ShapeState>>,
    #[serde(default)]
    pub clips: Vec<ShapeState>,
    #[serde(default)]
    pub masks: Vec<ShapeState>,
    /// Scratch geometry written by the interpolation engine; never serialized.
    #[serde(skip)]
    pub morph: Option<Arc<MorphGeometry>>,
}

fn default_one() -> f64 {
    1.0
}

fn default_stroke() -> Color {
    Color::NONE
}

fn default_num_vertices() -> usize {
    DEFAULT_NUM_VERTICES
}

impl ShapeState {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            pos: Point::ZERO,
            rotation: 0.0,
            scale: 1.0,
            opacity: 1.0,
            fill_color: Color::BLACK,
            fill_opacity: 1.0,
            stroke_color: Color::NONE,
            stroke_opacity: 1.0,
            stroke_width: 0.0,
            z_index: 0.0,
            num_vertices: DEFAULT_NUM_VERTICES,
            clip: None,
            mask: None,
            clips: Vec::new(),
            masks: Vec::new(),
            morph: None,
        }
    }

    pub fn with_kind(mut self, kind: ShapeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_pos(mut self, pos: Point) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill_color = color;
        self
    }

    pub fn with_fill_opacity(mut self, opacity: f64) -> Self {
        self.fill_opacity = opacity;
        self
    }

    pub fn with_stroke(mut self, color: Color, width: f64) -> Self {
        self.stroke_color = color;
        self.stroke_width = width;
        self
    }

    pub fn with_stroke_opacity(mut self, opacity: f64) -> Self {
        self.stroke_opacity = opacity;
        self
    }

    pub fn with_z_index(mut self, z_index: f64) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_num_vertices(mut self, num_vertices: usize) -> Self {
        self.num_vertices = num_vertices;
        self
    }

    pub fn with_clip(mut self, clip: Option<ShapeState>) -> Self {
        self.clip = clip.map(Box::new);
        self
    }

    pub fn with_mask(mut self, mask: Option<ShapeState>) -> Self {
        self.mask = mask.map(Box::new);
        self
    }

    pub fn with_clips(mut self, clips: Vec<ShapeState>) -> Self {
        self.clips = clips;
        self
    }

    pub fn with_masks(mut self, masks: Vec<ShapeState>) -> Self {
        self.masks = masks;
        self
    }

    /// Whether blending towards `other` requires a contour morph.
    pub fn needs_morph(&self, other: &ShapeState) -> bool {
        !self.kind.same_kind(&other.kind) || self.kind.always_morph() || other.kind.always_morph()
    }

    /// Local-frame contour sets: the morph scratch when present, otherwise
    /// regenerated from the shape parameters.
    pub fn contours(&self) -> Vec<ContourSet> {
        match &self.morph {
            Some(morph) => morph.contours.clone(),
            None => self.kind.contours(self.num_vertices),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.kind.is_closed()
    }

    /// Copy with all morph scratch removed, recursively.
    pub fn cleaned(&self) -> Self {
        let mut state = self.clone();
        state.clean_in_place();
        state
    }

    fn clean_in_place(&mut self) {
        self.morph = None;
        if let Some(clip) = self.clip.as_mut() {
            clip.clean_in_place();
        }
        if let Some(mask) = self.mask.as_mut() {
            mask.clean_in_place();
        }
        self.clips.iter_mut().for_each(ShapeState::clean_in_place);
        self.masks.iter_mut().for_each(ShapeState::clean_in_place);
        if let ShapeKind::Group { members } = &mut self.kind {
            members.iter_mut().for_each(ShapeState::clean_in_place);
        }
    }

    /// Copy with every opacity-family field scaled by `factor`.
    pub fn faded(&self, factor: f64) -> Self {
        let mut state = self.cleaned();
        state.opacity *= factor;
        state.fill_opacity *= factor;
        state.stroke_opacity *= factor;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let state: ShapeState =
            serde_json::from_str(r##"{"kind": "circle", "radius": 10.0, "fill_color": "#ff0000"}"##).unwrap();
        assert_eq!(state.kind, ShapeKind::Circle { radius: 10.0 });
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.opacity, 1.0);
        assert_eq!(state.fill_color, Color::rgb(255, 0, 0));
        assert_eq!(state.num_vertices, DEFAULT_NUM_VERTICES);
        assert!(state.stroke_color.is_none());
    }

    #[test]
    fn test_cleaned_drops_nested_scratch() {
        let scratch = Arc::new(MorphGeometry { contours: vec![] });
        let mut clip = ShapeState::new(ShapeKind::Circle { radius: 1.0 });
        clip.morph = Some(scratch.clone());
        let mut state = ShapeState::new(ShapeKind::Circle { radius: 2.0 }).with_clip(Some(clip));
        state.morph = Some(scratch);
        let clean = state.cleaned();
        assert!(clean.morph.is_none());
        assert!(clean.clip.as_ref().is_some_and(|c| c.morph.is_none()));
    }

    #[test]
    fn test_needs_morph() {
        let circle = ShapeState::new(ShapeKind::Circle { radius: 1.0 });
        let bigger = ShapeState::new(ShapeKind::Circle { radius: 3.0 });
        let square = ShapeState::new(ShapeKind::Rectangle {
            width: 2.0,
            height: 2.0,
            corner_radius: 0.0,
        });
        assert!(!circle.needs_morph(&bigger));
        assert!(circle.needs_morph(&square));
    }

    #[test]
    fn test_faded_scales_opacity_family() {
        let state = ShapeState::new(ShapeKind::Circle { radius: 1.0 })
            .with_opacity(0.8)
            .with_fill_opacity(0.5);
        let faded = state.faded(0.5);
        assert_eq!(faded.opacity, 0.4);
        assert_eq!(faded.fill_opacity, 0.25);
        assert_eq!(faded.stroke_opacity, 0.5);
        assert_eq!(faded.pos, state.pos);
    }
}

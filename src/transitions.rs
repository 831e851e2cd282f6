//! # Scene Transitions
//!
//! Describes how two scenes are composited while a transition is active.
//!
//! ## Responsibilities
//! - **Transition Kinds**: Fade, Slide, Wipe, Iris and Zoom.
//! - **Layer Parameters**: Opacity, offset, clip rectangle, clip radius and
//!   scale of the outgoing and incoming layers at a given progress.
//!
//! Drawing is left to the caller; everything here is plain geometry in the
//! frame's coordinate space with the origin at the top-left corner.

use morphline_data::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrisMode {
    /// Circle grows and reveals the incoming scene.
    #[default]
    Open,
    /// Circle shrinks around the outgoing scene.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomMode {
    #[default]
    In,
    Out,
}

/// The visual effect used between two scenes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionKind {
    /// Cross-dissolve.
    #[default]
    Fade,
    /// The outgoing scene moves out in `direction` while the incoming one
    /// follows from the opposite side.
    Slide { direction: Direction },
    /// The incoming scene is revealed from one side.
    Wipe { direction: Direction },
    /// Circular reveal from the frame centre.
    Iris { mode: IrisMode },
    /// Scale and dissolve around the frame centre.
    Zoom { mode: ZoomMode, max_scale: f64 },
}

/// Rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl ClipRect {
    fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clip {
    Rect(ClipRect),
    Circle { center: Point, radius: f64 },
}

/// How one of the two scenes is drawn for a transition frame. `None`
/// fields leave the layer untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerParams {
    pub opacity: f64,
    pub offset: Point,
    pub scale: f64,
    pub clip: Option<Clip>,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            offset: Point::ZERO,
            scale: 1.0,
            clip: None,
        }
    }
}

/// Parameters for both layers. The incoming layer is drawn on top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composite {
    pub outgoing: LayerParams,
    pub incoming: LayerParams,
}

impl TransitionKind {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionKind::Fade => "fade",
            TransitionKind::Slide { .. } => "slide",
            TransitionKind::Wipe { .. } => "wipe",
            TransitionKind::Iris { .. } => "iris",
            TransitionKind::Zoom { .. } => "zoom",
        }
    }

    /// Layer parameters at eased `progress` for a `width` x `height` frame.
    pub fn composite(&self, progress: f64, width: f64, height: f64) -> Composite {
        let p = progress.clamp(0.0, 1.0);
        let mut outgoing = LayerParams::default();
        let mut incoming = LayerParams::default();
        match *self {
            TransitionKind::Fade => {
                outgoing.opacity = 1.0 - p;
                incoming.opacity = p;
            }
            TransitionKind::Slide { direction } => {
                let (out_offset, in_offset) = match direction {
                    Direction::Left => ((-width * p, 0.0), (width * (1.0 - p), 0.0)),
                    Direction::Right => ((width * p, 0.0), (-width * (1.0 - p), 0.0)),
                    Direction::Up => ((0.0, -height * p), (0.0, height * (1.0 - p))),
                    Direction::Down => ((0.0, height * p), (0.0, -height * (1.0 - p))),
                };
                outgoing.offset = Point::from(out_offset);
                incoming.offset = Point::from(in_offset);
            }
            TransitionKind::Wipe { direction } => {
                let (out_rect, in_rect) = wipe_rects(direction, p, width, height);
                outgoing.clip = Some(Clip::Rect(out_rect));
                incoming.clip = Some(Clip::Rect(in_rect));
            }
            TransitionKind::Iris { mode } => {
                let center = Point::new(width / 2.0, height / 2.0);
                let max_radius = center.length();
                // Only the scene inside the circle gets clipped.
                match mode {
                    IrisMode::Open => {
                        incoming.clip = Some(Clip::Circle {
                            center,
                            radius: max_radius * p,
                        })
                    }
                    IrisMode::Close => {
                        outgoing.clip = Some(Clip::Circle {
                            center,
                            radius: max_radius * (1.0 - p),
                        })
                    }
                }
            }
            TransitionKind::Zoom { mode, max_scale } => {
                let max_scale = max_scale.max(1.0);
                let (out_scale, in_scale) = match mode {
                    ZoomMode::In => (
                        1.0 + (max_scale - 1.0) * p,
                        1.0 / max_scale + (1.0 - 1.0 / max_scale) * p,
                    ),
                    ZoomMode::Out => (
                        1.0 - (1.0 - 1.0 / max_scale) * p,
                        max_scale - (max_scale - 1.0) * p,
                    ),
                };
                outgoing.scale = out_scale;
                incoming.scale = in_scale;
                outgoing.opacity = 1.0 - p;
                incoming.opacity = p;
            }
        }
        Composite { outgoing, incoming }
    }
}

fn wipe_rects(direction: Direction, p: f64, width: f64, height: f64) -> (ClipRect, ClipRect) {
    match direction {
        // The incoming scene enters from the right edge.
        Direction::Left => {
            let out_w = width * (1.0 - p);
            (
                ClipRect::new(0.0, 0.0, out_w, height),
                ClipRect::new(out_w, 0.0, width * p, height),
            )
        }
        Direction::Right => {
            let in_w = width * p;
            (
                ClipRect::new(in_w, 0.0, width * (1.0 - p), height),
                ClipRect::new(0.0, 0.0, in_w, height),
            )
        }
        Direction::Up => {
            let out_h = height * (1.0 - p);
            (
                ClipRect::new(0.0, 0.0, width, out_h),
                ClipRect::new(0.0, out_h, width, height * p),
            )
        }
        Direction::Down => {
            let in_h = height * p;
            (
                ClipRect::new(0.0, in_h, width, height * (1.0 - p)),
                ClipRect::new(0.0, 0.0, width, in_h),
            )
        }
    }
}

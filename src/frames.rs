//! Frame sampling over elements, scenes and scene sequences.
//!
//! Resolution of independent elements and frames runs on the rayon pool.
//! Elements share their plan caches across threads, so each segment's
//! alignment is still computed at most once.

use morphline_core::segments::linspace;
use morphline_core::{Element, MorphError};
use morphline_data::ShapeState;
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::sequence::{remap_sequence_time, ActiveUnit, SceneSequence, SequenceError};
use crate::transitions::TransitionKind;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Morph(#[from] MorphError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Elements drawn together, in paint order.
#[derive(Debug, Default)]
pub struct Scene {
    pub elements: Vec<Element>,
}

impl Scene {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    /// Resolved records at local time `t`, sorted by z-index. Ties keep
    /// insertion order.
    pub fn resolve(&self, t: f64) -> Result<Vec<ShapeState>, MorphError> {
        let mut states = resolve_all(&self.elements, t)?;
        states.sort_by(|a, b| a.z_index.total_cmp(&b.z_index));
        Ok(states)
    }

    pub fn prepare(&self) -> Result<(), MorphError> {
        self.elements.par_iter().try_for_each(Element::prepare)
    }
}

/// One sampled frame of a sequence.
#[derive(Debug, Clone)]
pub enum Frame {
    Scene {
        index: usize,
        states: Vec<ShapeState>,
    },
    Transition {
        kind: TransitionKind,
        progress: f64,
        outgoing: Vec<ShapeState>,
        incoming: Vec<ShapeState>,
    },
}

/// Every element at the same local time.
pub fn resolve_all(elements: &[Element], t: f64) -> Result<Vec<ShapeState>, MorphError> {
    elements.par_iter().map(|element| element.resolve(t)).collect()
}

/// `frame_count` evenly spaced samples of one element covering [0, 1].
pub fn resolve_frames(element: &Element, frame_count: usize) -> Result<Vec<ShapeState>, MorphError> {
    let times = sample_times(frame_count);
    debug!(frames = times.len(), "Resolving element frames");
    times.par_iter().map(|&t| element.resolve(t)).collect()
}

/// Evenly spaced times over [0, 1]; a single frame samples t = 0.
pub fn sample_times(frame_count: usize) -> Vec<f64> {
    match frame_count {
        1 => vec![0.0],
        n => linspace(n, 0.0, 1.0),
    }
}

/// The frame at global sequence time `t`.
pub fn sequence_frame(sequence: &SceneSequence<Scene>, t: f64) -> Result<Frame, FrameError> {
    match remap_sequence_time(sequence, t)? {
        ActiveUnit::Scene {
            index,
            scene,
            local_time,
        } => Ok(Frame::Scene {
            index,
            states: scene.resolve(local_time)?,
        }),
        ActiveUnit::Transition {
            transition,
            scene_out,
            scene_in,
            time_out,
            time_in,
            progress,
            ..
        } => {
            let (outgoing, incoming) = rayon::join(
                || scene_out.resolve(time_out),
                || scene_in.resolve(time_in),
            );
            Ok(Frame::Transition {
                kind: transition.kind.clone(),
                progress,
                outgoing: outgoing?,
                incoming: incoming?,
            })
        }
    }
}

/// `frame_count` evenly spaced frames of a whole sequence.
pub fn sequence_frames(
    sequence: &SceneSequence<Scene>,
    frame_count: usize,
) -> Result<Vec<Frame>, FrameError> {
    sample_times(frame_count)
        .par_iter()
        .map(|&t| sequence_frame(sequence, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphline_data::{Point, ShapeKind};

    fn moving(z: f64) -> Element {
        let dot = ShapeState::new(ShapeKind::Circle { radius: 1.0 }).with_z_index(z);
        Element::builder()
            .keystate(0.0, dot.clone())
            .keystate(1.0, dot.with_pos(Point::new(10.0, 0.0)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_sample_times() {
        assert_eq!(sample_times(0), Vec::<f64>::new());
        assert_eq!(sample_times(1), vec![0.0]);
        assert_eq!(sample_times(3), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_resolve_frames_in_order() {
        let frames = resolve_frames(&moving(0.0), 5).unwrap();
        let xs: Vec<f64> = frames.iter().map(|s| s.pos.x).collect();
        for (x, expected) in xs.iter().zip([0.0, 2.5, 5.0, 7.5, 10.0]) {
            assert!((x - expected).abs() < 1e-9, "{xs:?}");
        }
    }

    #[test]
    fn test_scene_sorts_by_z_index() {
        let scene = Scene::new(vec![moving(2.0), moving(-1.0), moving(0.5)]);
        let zs: Vec<f64> = scene.resolve(0.5).unwrap().iter().map(|s| s.z_index).collect();
        assert_eq!(zs, vec![-1.0, 0.5, 2.0]);
    }
}

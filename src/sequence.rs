//! # Scene Sequences
//!
//! Strings scenes together with transitions and maps a global time in
//! [0, 1] to whichever scene or transition is active.
//!
//! Scenes and transitions alternate strictly: scene, transition, scene, ...
//! A trailing transition has nothing to lead into and is ignored.
//!
//! Durations are relative. Every scene contributes its duration to the
//! total; a transition only adds time when it is not overlapping. An
//! overlapping transition is centred on the boundary between its two
//! scenes and eats into both.

use morphline_core::timeline::local_fraction;
use morphline_core::Easing;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::transitions::TransitionKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SequenceError {
    #[error("scene duration must be positive, got {0}")]
    SceneDuration(f64),

    #[error("transition duration must be positive, got {0}")]
    TransitionDuration(f64),

    #[error("cannot add consecutive scenes without a transition between them")]
    ConsecutiveScenes,

    #[error("cannot add consecutive transitions, add a scene between them")]
    ConsecutiveTransitions,

    #[error("cannot add a transition before the first scene")]
    LeadingTransition,

    #[error("sequence has no scenes")]
    Empty,

    #[error("sequence time {0} is outside [0, 1]")]
    Time(f64),
}

/// A transition placed between two scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTransition {
    pub kind: TransitionKind,
    pub duration: f64,
    #[serde(default)]
    pub easing: Easing,
    /// Overlapping transitions share time with the neighbouring scenes
    /// instead of adding their own.
    #[serde(default)]
    pub overlapping: bool,
}

impl SceneTransition {
    pub fn new(kind: TransitionKind, duration: f64) -> Self {
        Self {
            kind,
            duration,
            easing: Easing::Linear,
            overlapping: false,
        }
    }

    pub fn fade(duration: f64) -> Self {
        Self::new(TransitionKind::Fade, duration)
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn overlapping(mut self, overlapping: bool) -> Self {
        self.overlapping = overlapping;
        self
    }
}

#[derive(Debug, Clone)]
enum Entry<S> {
    Scene { scene: S, duration: f64 },
    Transition(SceneTransition),
}

/// Span of global time owned by a scene or transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// What a sequence window belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    Scene {
        index: usize,
    },
    /// Indices are scene indices; `transition` counts transitions.
    Transition {
        transition: usize,
        out_index: usize,
        in_index: usize,
    },
}

/// The unit active at some global time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveUnit<'a, S> {
    Scene {
        index: usize,
        scene: &'a S,
        local_time: f64,
    },
    Transition {
        transition: &'a SceneTransition,
        out_index: usize,
        in_index: usize,
        scene_out: &'a S,
        scene_in: &'a S,
        /// Local time inside the outgoing scene.
        time_out: f64,
        /// Local time inside the incoming scene.
        time_in: f64,
        /// Transition progress after its easing.
        progress: f64,
    },
}

/// Ordered scenes joined by transitions.
#[derive(Debug, Clone)]
pub struct SceneSequence<S> {
    entries: Vec<Entry<S>>,
}

impl<S> Default for SceneSequence<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> SceneSequence<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scene. The previous entry, if any, must be a transition.
    pub fn scene(mut self, scene: S, duration: f64) -> Result<Self, SequenceError> {
        if duration.is_nan() || duration <= 0.0 {
            return Err(SequenceError::SceneDuration(duration));
        }
        if let Some(Entry::Scene { .. }) = self.entries.last() {
            return Err(SequenceError::ConsecutiveScenes);
        }
        self.entries.push(Entry::Scene { scene, duration });
        Ok(self)
    }

    /// Appends a transition after the last scene.
    pub fn transition(mut self, transition: SceneTransition) -> Result<Self, SequenceError> {
        if transition.duration.is_nan() || transition.duration <= 0.0 {
            return Err(SequenceError::TransitionDuration(transition.duration));
        }
        match self.entries.last() {
            None => return Err(SequenceError::LeadingTransition),
            Some(Entry::Transition(_)) => return Err(SequenceError::ConsecutiveTransitions),
            Some(Entry::Scene { .. }) => {}
        }
        self.entries.push(Entry::Transition(transition));
        Ok(self)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes().count()
    }

    pub fn scenes(&self) -> impl Iterator<Item = &S> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Scene { scene, .. } => Some(scene),
            Entry::Transition(_) => None,
        })
    }

    /// Transitions that sit between two scenes, in order.
    pub fn transitions(&self) -> impl Iterator<Item = &SceneTransition> {
        self.placed().map(|(_, transition)| transition)
    }

    /// Sum of scene durations plus non-overlapping transition durations.
    pub fn total_duration(&self) -> f64 {
        let scenes: f64 = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Scene { duration, .. } => Some(*duration),
                Entry::Transition(_) => None,
            })
            .sum();
        let transitions: f64 = self
            .transitions()
            .filter(|transition| !transition.overlapping)
            .map(|transition| transition.duration)
            .sum();
        scenes + transitions
    }

    /// Transitions with the index of the scene they follow. Trailing
    /// transitions are skipped.
    fn placed(&self) -> impl Iterator<Item = (usize, &SceneTransition)> {
        let mut scene = 0usize;
        let len = self.entries.len();
        self.entries
            .iter()
            .enumerate()
            .filter_map(move |(i, entry)| match entry {
                Entry::Scene { .. } => {
                    scene += 1;
                    None
                }
                Entry::Transition(transition) if i + 1 < len => Some((scene - 1, transition)),
                Entry::Transition(_) => None,
            })
    }

    /// Global time windows of every scene and placed transition, in
    /// sequence order.
    pub fn windows(&self) -> Vec<(Slot, Window)> {
        let total = self.total_duration();
        if total <= 0.0 {
            return Vec::new();
        }

        let mut scenes: Vec<Window> = Vec::new();
        let mut gaps: Vec<Option<f64>> = Vec::new();
        let mut cursor = 0.0;
        let len = self.entries.len();
        for (i, entry) in self.entries.iter().enumerate() {
            match entry {
                Entry::Scene { duration, .. } => {
                    let start = cursor;
                    cursor += duration / total;
                    scenes.push(Window { start, end: cursor });
                }
                Entry::Transition(_) if i + 1 == len => {}
                Entry::Transition(transition) => {
                    if transition.overlapping {
                        gaps.push(None);
                    } else {
                        let start = cursor;
                        cursor += transition.duration / total;
                        gaps.push(Some(start));
                    }
                }
            }
        }
        // Rounding must not leave the last scene short of 1.
        if let Some(last) = scenes.last_mut() {
            last.end = 1.0;
        }

        let mut windows = Vec::with_capacity(scenes.len() * 2);
        for (index, scene) in scenes.iter().enumerate() {
            windows.push((Slot::Scene { index }, *scene));
            let Some((transition, (out_index, placed))) = self
                .placed()
                .enumerate()
                .find(|(_, (out_index, _))| *out_index == index)
            else {
                continue;
            };
            let in_index = out_index + 1;
            let window = match gaps[transition] {
                Some(start) => Window {
                    start,
                    end: scenes[in_index].start,
                },
                None => {
                    let half = placed.duration / total / 2.0;
                    Window {
                        start: (scene.end - half).max(scene.start),
                        end: (scene.end + half).min(scenes[in_index].end),
                    }
                }
            };
            windows.push((
                Slot::Transition {
                    transition,
                    out_index,
                    in_index,
                },
                window,
            ));
        }
        windows
    }

    fn scene_at(&self, index: usize) -> Option<&S> {
        self.scenes().nth(index)
    }
}

/// Maps global time `t` to the active scene or transition.
///
/// Transitions win over scenes where windows touch or overlap, so the exact
/// boundary between a scene and a non-overlapping transition reports the
/// transition with the outgoing scene at local time 1 and the incoming one
/// at local time 0.
pub fn remap_sequence_time<S>(
    sequence: &SceneSequence<S>,
    t: f64,
) -> Result<ActiveUnit<'_, S>, SequenceError> {
    if !(0.0..=1.0).contains(&t) {
        return Err(SequenceError::Time(t));
    }
    let windows = sequence.windows();
    if windows.is_empty() {
        return Err(SequenceError::Empty);
    }
    let scene_window = |index: usize| {
        windows.iter().find_map(|(slot, window)| match slot {
            Slot::Scene { index: i } if *i == index => Some(*window),
            _ => None,
        })
    };

    let transitions = windows.iter().filter_map(|(slot, window)| match *slot {
        Slot::Transition {
            transition,
            out_index,
            in_index,
        } => Some((transition, out_index, in_index, *window)),
        Slot::Scene { .. } => None,
    });
    for (transition_index, out_index, in_index, window) in transitions {
        if !window.contains(t) {
            continue;
        }
        let (Some(transition), Some(scene_out), Some(scene_in)) = (
            sequence.transitions().nth(transition_index),
            sequence.scene_at(out_index),
            sequence.scene_at(in_index),
        ) else {
            continue;
        };
        let raw = local_fraction(t, window.start, window.end);
        let (time_out, time_in) = if transition.overlapping {
            let out_window = scene_window(out_index).unwrap_or(window);
            let in_window = scene_window(in_index).unwrap_or(window);
            (
                scene_local(t, out_window, 1.0),
                scene_local(t, in_window, 0.0),
            )
        } else {
            (1.0, 0.0)
        };
        debug!(t, out_index, in_index, raw, "sequence time in transition");
        return Ok(ActiveUnit::Transition {
            transition,
            out_index,
            in_index,
            scene_out,
            scene_in,
            time_out,
            time_in,
            progress: transition.easing.ease(raw),
        });
    }

    let scenes: Vec<(usize, Window)> = windows
        .iter()
        .filter_map(|(slot, window)| match *slot {
            Slot::Scene { index } => Some((index, *window)),
            Slot::Transition { .. } => None,
        })
        .collect();
    let (index, window) = scenes
        .iter()
        .copied()
        .find(|(_, window)| window.contains(t))
        .or_else(|| scenes.last().copied())
        .ok_or(SequenceError::Empty)?;
    let scene = sequence.scene_at(index).ok_or(SequenceError::Empty)?;
    Ok(ActiveUnit::Scene {
        index,
        scene,
        local_time: scene_local(t, window, 0.0),
    })
}

fn scene_local(t: f64, window: Window, empty: f64) -> f64 {
    if window.is_empty() {
        empty
    } else {
        local_fraction(t, window.start, window.end)
    }
}

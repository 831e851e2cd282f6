//! Keystate timelines.
//!
//! An `Element` owns an ordered list of keystates on local time [0, 1] and
//! the plan cache of its segments. `resolve(t)` brackets `t`, normalises it
//! into the segment and hands both records to the interpolation engine.
//! Before the first keystate the first record holds; after the last one the
//! last record holds.
//!
//! A keystate may carry two records (a cut): the segment arriving at it ends
//! on `state`, the segment leaving it starts from `outgoing`, and `render`
//! picks which of the two is shown at exactly its time.

use crate::config::MorphDefaults;
use crate::easing::Easing;
use crate::error::MorphError;
use crate::interpolate::Interpolator;
use crate::plan::PlanCache;
use crate::segment::SegmentOverrides;
use morphline_data::{Field, ShapeState};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Times closer than this count as the same instant.
pub const TIME_EPSILON: f64 = 1e-9;

/// Position of `t` inside `[start, end]`, clamped to [0, 1]. An empty range
/// yields 0.
pub fn local_fraction(t: f64, start: f64, end: f64) -> f64 {
    let span = end - start;
    if span <= TIME_EPSILON {
        return 0.0;
    }
    ((t - start) / span).clamp(0.0, 1.0)
}

pub fn times_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIME_EPSILON
}

/// Which record of a cut is shown at exactly the cut's time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CutSide {
    /// The record the previous segment arrives at.
    #[default]
    Incoming,
    /// The record the next segment departs from.
    Outgoing,
}

#[derive(Debug, Clone)]
pub struct Keystate {
    pub time: f64,
    pub state: ShapeState,
    pub outgoing: Option<ShapeState>,
    pub render: CutSide,
    /// Overrides for the segment that starts at this keystate.
    pub transition: Option<SegmentOverrides>,
}

impl Keystate {
    pub fn new(time: f64, state: ShapeState) -> Self {
        Self {
            time,
            state,
            outgoing: None,
            render: CutSide::Incoming,
            transition: None,
        }
    }

    /// A hard cut: arrive at `incoming`, leave from `outgoing`.
    pub fn cut(time: f64, incoming: ShapeState, outgoing: ShapeState) -> Self {
        Self {
            outgoing: Some(outgoing),
            ..Self::new(time, incoming)
        }
    }

    pub fn with_transition(mut self, transition: SegmentOverrides) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn rendering(mut self, side: CutSide) -> Self {
        self.render = side;
        self
    }

    /// The record the following segment starts from.
    pub fn departing(&self) -> &ShapeState {
        self.outgoing.as_ref().unwrap_or(&self.state)
    }

    /// The record shown at exactly this keystate's time.
    pub fn rendered(&self) -> &ShapeState {
        match self.render {
            CutSide::Incoming => &self.state,
            CutSide::Outgoing => self.departing(),
        }
    }
}

/// An animated shape: keystates, easing configuration and segment plans.
#[derive(Debug)]
pub struct Element {
    keystates: Vec<Keystate>,
    segments: Vec<SegmentOverrides>,
    attribute_easing: HashMap<Field, Easing>,
    default_transition: Option<SegmentOverrides>,
    defaults: Arc<MorphDefaults>,
    plans: PlanCache,
}

impl Element {
    pub fn builder() -> ElementBuilder {
        ElementBuilder::default()
    }

    pub fn keystates(&self) -> &[Keystate] {
        &self.keystates
    }

    pub fn defaults(&self) -> &MorphDefaults {
        &self.defaults
    }

    pub fn plans(&self) -> &PlanCache {
        &self.plans
    }

    /// Number of segments, one per pair of consecutive keystates.
    pub fn segment_count(&self) -> usize {
        self.keystates.len().saturating_sub(1)
    }

    /// Effective overrides of segment `index`.
    pub fn segment_overrides(&self, index: usize) -> Option<&SegmentOverrides> {
        self.segments.get(index)
    }

    /// Segment index and local fraction for `t`, or `None` when `t` sits on a
    /// keystate or outside the keystate range.
    pub fn locate(&self, t: f64) -> Option<(usize, f64)> {
        let first = self.keystates.first()?;
        let last = self.keystates.last()?;
        if t <= first.time + TIME_EPSILON || t >= last.time - TIME_EPSILON {
            return None;
        }
        // first keystate strictly after t
        let next = self.keystates.partition_point(|k| k.time <= t);
        let index = next.checked_sub(1)?;
        if times_equal(self.keystates[index].time, t) || next >= self.keystates.len() {
            return None;
        }
        let fraction = local_fraction(t, self.keystates[index].time, self.keystates[next].time);
        Some((index, fraction))
    }

    /// The blended record at local time `t`.
    pub fn resolve(&self, t: f64) -> Result<ShapeState, MorphError> {
        let (first, last) = match (self.keystates.first(), self.keystates.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(MorphError::EmptyTimeline),
        };
        if let Some(keystate) = self.keystates.iter().find(|k| times_equal(k.time, t)) {
            trace!(t, "resolving on a keystate");
            return Ok(keystate.rendered().cleaned());
        }
        if t < first.time {
            return Ok(first.state.cleaned());
        }
        if t > last.time {
            return Ok(last.departing().cleaned());
        }
        match self.locate(t) {
            Some((index, fraction)) => {
                trace!(t, segment = index, fraction, "resolving inside a segment");
                self.segment_state(index, fraction)
            }
            None => Ok(last.departing().cleaned()),
        }
    }

    /// Blends segment `index` at local fraction `fraction`.
    pub fn segment_state(&self, index: usize, fraction: f64) -> Result<ShapeState, MorphError> {
        let (Some(from), Some(to)) = (self.keystates.get(index), self.keystates.get(index + 1)) else {
            return Err(MorphError::EmptyTimeline);
        };
        let mut engine = Interpolator::new(&self.defaults)
            .with_attribute_easing(&self.attribute_easing)
            .with_plans(&self.plans, index);
        if let Some(overrides) = self.segments.get(index) {
            engine = engine.with_overrides(overrides);
        }
        engine.interpolate(from.departing(), &to.state, fraction)
    }

    /// Computes the alignment and matching plans of every segment up front,
    /// so frame-parallel resolution only reads the cache.
    pub fn prepare(&self) -> Result<(), MorphError> {
        for index in 0..self.segment_count() {
            self.segment_state(index, 0.5)?;
        }
        debug!(
            segments = self.segment_count(),
            plans = self.plans.len(),
            "prepared element"
        );
        Ok(())
    }

    pub fn push_keystate(&mut self, keystate: Keystate) -> Result<(), MorphError> {
        let mut keystates = self.keystates.clone();
        keystates.push(keystate);
        self.set_keystates(keystates)
    }

    /// Replaces every keystate. Keystates are sorted by time and two
    /// keystates at the same time merge into a cut.
    pub fn set_keystates(&mut self, keystates: Vec<Keystate>) -> Result<(), MorphError> {
        self.keystates = normalize(keystates)?;
        self.segments = effective_segments(&self.keystates, self.default_transition.as_ref());
        self.plans.invalidate();
        Ok(())
    }
}

/// Resolves `element` at local time `t`.
pub fn resolve(element: &Element, t: f64) -> Result<ShapeState, MorphError> {
    element.resolve(t)
}

fn normalize(mut keystates: Vec<Keystate>) -> Result<Vec<Keystate>, MorphError> {
    if keystates.is_empty() {
        return Err(MorphError::EmptyTimeline);
    }
    if let Some(bad) = keystates.iter().find(|k| !(0.0..=1.0).contains(&k.time)) {
        return Err(MorphError::KeystateTime(bad.time));
    }
    keystates.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut merged: Vec<Keystate> = Vec::with_capacity(keystates.len());
    for keystate in keystates {
        match merged.last_mut() {
            Some(previous) if times_equal(previous.time, keystate.time) => {
                previous.outgoing = Some(keystate.departing().clone());
                if keystate.transition.is_some() {
                    previous.transition = keystate.transition;
                }
            }
            _ => merged.push(keystate),
        }
    }
    Ok(merged)
}

fn effective_segments(
    keystates: &[Keystate],
    default_transition: Option<&SegmentOverrides>,
) -> Vec<SegmentOverrides> {
    keystates
        .iter()
        .take(keystates.len().saturating_sub(1))
        .map(|k| match (&k.transition, default_transition) {
            (Some(own), Some(fallback)) => own.merged_with(fallback),
            (Some(own), None) => own.clone(),
            (None, Some(fallback)) => fallback.clone(),
            (None, None) => SegmentOverrides::default(),
        })
        .collect()
}

/// Chained construction of an `Element`. The first error is kept and
/// reported by `build`.
#[derive(Debug, Default)]
pub struct ElementBuilder {
    keystates: Vec<Keystate>,
    pending_transition: Option<SegmentOverrides>,
    default_transition: Option<SegmentOverrides>,
    attribute_easing: HashMap<Field, Easing>,
    defaults: Option<Arc<MorphDefaults>>,
    error: Option<MorphError>,
}

impl ElementBuilder {
    pub fn keystate(self, at: f64, state: ShapeState) -> Self {
        self.push(Keystate::new(at, state))
    }

    /// Hard cut at `at`; the incoming record is shown at exactly `at`.
    pub fn cut(self, at: f64, incoming: ShapeState, outgoing: ShapeState) -> Self {
        self.push(Keystate::cut(at, incoming, outgoing))
    }

    /// Hard cut showing `render` at exactly `at`.
    pub fn cut_showing(
        self,
        at: f64,
        incoming: ShapeState,
        outgoing: ShapeState,
        render: CutSide,
    ) -> Self {
        self.push(Keystate::cut(at, incoming, outgoing).rendering(render))
    }

    /// Spreads `states` evenly over [0, 1].
    pub fn keystates(self, states: Vec<ShapeState>) -> Self {
        self.keystates_between(0.0, 1.0, states)
    }

    /// Spreads `states` evenly over [start, end]; a single state lands on
    /// `start`.
    pub fn keystates_between(mut self, start: f64, end: f64, states: Vec<ShapeState>) -> Self {
        let count = states.len();
        for (i, state) in states.into_iter().enumerate() {
            let at = if count > 1 {
                start + (end - start) * i as f64 / (count - 1) as f64
            } else {
                start
            };
            self = self.keystate(at, state);
        }
        self
    }

    /// Appends prepared keystates, e.g. from the helpers in `segments`.
    pub fn segment(mut self, keystates: Vec<Keystate>) -> Self {
        for keystate in keystates {
            self = self.push(keystate);
        }
        self
    }

    /// Overrides for the segment leaving the most recent keystate. Before any
    /// keystate exists it applies to the first segment.
    pub fn transition(mut self, overrides: SegmentOverrides) -> Self {
        match self.keystates.last_mut() {
            Some(last) => last.transition = Some(overrides),
            None => self.pending_transition = Some(overrides),
        }
        self
    }

    /// Fallback overrides merged into every segment.
    pub fn default_transition(mut self, overrides: SegmentOverrides) -> Self {
        self.default_transition = Some(overrides);
        self
    }

    /// Easing for `field` across all segments, below segment overrides.
    pub fn attribute_easing(mut self, field: Field, easing: Easing) -> Self {
        self.attribute_easing.insert(field, easing);
        self
    }

    pub fn defaults(mut self, defaults: Arc<MorphDefaults>) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn build(self) -> Result<Element, MorphError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut element = Element {
            keystates: Vec::new(),
            segments: Vec::new(),
            attribute_easing: self.attribute_easing,
            default_transition: self.default_transition,
            defaults: self.defaults.unwrap_or_default(),
            plans: PlanCache::new(),
        };
        element.set_keystates(self.keystates)?;
        Ok(element)
    }

    fn push(mut self, mut keystate: Keystate) -> Self {
        if self.error.is_some() {
            return self;
        }
        if !(0.0..=1.0).contains(&keystate.time) {
            self.error = Some(MorphError::KeystateTime(keystate.time));
            return self;
        }
        if self.keystates.is_empty() && keystate.transition.is_none() {
            keystate.transition = self.pending_transition.take();
        }
        self.keystates.push(keystate);
        self
    }
}

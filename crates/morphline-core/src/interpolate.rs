//! The interpolation engine.
//!
//! `Interpolator::interpolate(start, end, t)` walks the two records field by
//! field. Each field eases the segment fraction through its own easing chain
//! (segment override, element attribute easing, shape-kind default,
//! configured field default, configured fallback); with nothing configured
//! the chain is linear, so an already eased fraction passes through as is.
//! Nested records (clip, mask, list members) reuse their parent field's
//! eased fraction and are not eased again.
//!
//! Geometry either blends shape parameters directly (same kind, no forced
//! morph) or morphs aligned contours. Alignment and list matching are looked
//! up in the segment's `PlanCache` when one is attached.

use crate::align::{AlignmentContext, VertexAligner};
use crate::animatable::{lerp_angle, lerp_kind, step, Interpolatable};
use crate::config::MorphDefaults;
use crate::easing::{kind_default_easing, Easing};
use crate::error::MorphError;
use crate::mapping::{map_items, Mapper, Match};
use crate::morph::{align_contours, interpolate_contours};
use crate::plan::{Plan, PlanCache, PlanKey};
use crate::segment::SegmentOverrides;
use morphline_data::{Blend, Color, Field, MorphGeometry, Point, ShapeKind, ShapeState};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone, Copy)]
enum Fraction {
    /// Local segment fraction; every field eases it.
    Segment(f64),
    /// Already eased by the parent field.
    Eased(f64),
}

impl Fraction {
    fn raw(self) -> f64 {
        match self {
            Fraction::Segment(t) | Fraction::Eased(t) => t,
        }
    }
}

/// Blends two shape records. Cheap to build; borrow everything.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    defaults: &'a MorphDefaults,
    overrides: Option<&'a SegmentOverrides>,
    attribute_easing: Option<&'a HashMap<Field, Easing>>,
    plans: Option<(&'a PlanCache, usize)>,
}

impl<'a> Interpolator<'a> {
    pub fn new(defaults: &'a MorphDefaults) -> Self {
        Self {
            defaults,
            overrides: None,
            attribute_easing: None,
            plans: None,
        }
    }

    pub fn with_overrides(mut self, overrides: &'a SegmentOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_attribute_easing(mut self, easing: &'a HashMap<Field, Easing>) -> Self {
        self.attribute_easing = Some(easing);
        self
    }

    /// Memoizes alignment and matching under `segment` in `cache`.
    pub fn with_plans(mut self, cache: &'a PlanCache, segment: usize) -> Self {
        self.plans = Some((cache, segment));
        self
    }

    /// Blended record at segment fraction `t`. `t <= 0` reproduces `start`
    /// and `t >= 1` reproduces `end`, both without morph scratch.
    pub fn interpolate(
        &self,
        start: &ShapeState,
        end: &ShapeState,
        t: f64,
    ) -> Result<ShapeState, MorphError> {
        if t <= 0.0 {
            return Ok(start.cleaned());
        }
        if t >= 1.0 {
            return Ok(end.cleaned());
        }
        if let Some(state_fn) = self.overrides.and_then(|o| o.state_fn.as_ref()) {
            return Ok((state_fn.0)(start, end, t));
        }
        trace!(t, start = start.kind.name(), end = end.kind.name(), "interpolating");
        self.blend(start, end, Fraction::Segment(t), "")
    }

    /// The easing `field` uses in this segment.
    pub fn easing_for(&self, start: &ShapeState, end: &ShapeState, field: Field) -> Easing {
        if let Some(easing) = self.overrides.and_then(|o| o.easing.get(&field)) {
            return easing.clone();
        }
        if let Some(easing) = self.attribute_easing.and_then(|e| e.get(&field)) {
            return easing.clone();
        }
        if let Some(easing) =
            kind_default_easing(&start.kind, field).or_else(|| kind_default_easing(&end.kind, field))
        {
            return easing;
        }
        self.defaults
            .field_easing
            .get(&field)
            .cloned()
            .unwrap_or_else(|| self.defaults.fallback_easing.clone())
    }

    fn blend(
        &self,
        start: &ShapeState,
        end: &ShapeState,
        fraction: Fraction,
        path: &str,
    ) -> Result<ShapeState, MorphError> {
        let raw = fraction.raw();
        if raw <= 0.0 {
            return Ok(start.cleaned());
        }
        if raw >= 1.0 {
            return Ok(end.cleaned());
        }
        let eased = |field: Field| match fraction {
            Fraction::Segment(t) => self.easing_for(start, end, field).ease(t),
            Fraction::Eased(t) => t,
        };

        // structural fields come from whichever side the record snaps to
        let mut out = step(start, end, raw, self.defaults.step_threshold).cleaned();

        out.pos = self.point(Field::Pos, start.pos, end.pos, eased(Field::Pos));
        for field in [
            Field::Rotation,
            Field::Scale,
            Field::Opacity,
            Field::FillOpacity,
            Field::StrokeOpacity,
            Field::StrokeWidth,
            Field::ZIndex,
        ] {
            let (a, b) = (scalar_field(start, field), scalar_field(end, field));
            let value = self.scalar(policy(start, end, field), field, a, b, eased(field), raw);
            set_scalar_field(&mut out, field, value);
        }
        out.fill_color = self.color(
            policy(start, end, Field::FillColor),
            start.fill_color,
            end.fill_color,
            eased(Field::FillColor),
            raw,
        );
        out.stroke_color = self.color(
            policy(start, end, Field::StrokeColor),
            start.stroke_color,
            end.stroke_color,
            eased(Field::StrokeColor),
            raw,
        );

        self.geometry(start, end, eased(Field::Geometry), path, &mut out)?;

        out.clip = self
            .optional(start.clip.as_deref(), end.clip.as_deref(), eased(Field::Clip), &join(path, "clip"))?
            .map(Box::new);
        out.mask = self
            .optional(start.mask.as_deref(), end.mask.as_deref(), eased(Field::Mask), &join(path, "mask"))?
            .map(Box::new);
        out.clips = self.list(&start.clips, &end.clips, eased(Field::Clips), &join(path, "clips"))?;
        out.masks = self.list(&start.masks, &end.masks, eased(Field::Masks), &join(path, "masks"))?;
        Ok(out)
    }

    fn point(&self, field: Field, a: Point, b: Point, t: f64) -> Point {
        match self.overrides.and_then(|o| o.curves.get(&field)) {
            Some(curve) => curve.point_at(a, b, t),
            None => a.lerp(b, t),
        }
    }

    fn scalar(&self, policy: Blend, field: Field, a: f64, b: f64, t: f64, raw: f64) -> f64 {
        if policy == Blend::Fixed {
            return step(&a, &b, raw, self.defaults.step_threshold);
        }
        if let Some(custom) = self.overrides.and_then(|o| o.scalar.get(&field)) {
            return (custom.0)(a, b, t);
        }
        match policy {
            Blend::Angle if !self.overrides.map_or(false, |o| o.linear_angles) => lerp_angle(a, b, t),
            Blend::Step { threshold } => step(&a, &b, t, threshold),
            _ => Interpolatable::lerp(&a, &b, t),
        }
    }

    fn color(&self, policy: Blend, a: Color, b: Color, t: f64, raw: f64) -> Color {
        match policy {
            Blend::Fixed => step(&a, &b, raw, self.defaults.step_threshold),
            Blend::Step { threshold } => step(&a, &b, t, threshold),
            _ => a.interpolate(&b, t, self.defaults.color_space),
        }
    }

    fn geometry(
        &self,
        start: &ShapeState,
        end: &ShapeState,
        t: f64,
        path: &str,
        out: &mut ShapeState,
    ) -> Result<(), MorphError> {
        if let (ShapeKind::Group { members: a }, ShapeKind::Group { members: b }) =
            (&start.kind, &end.kind)
        {
            let members = self.list(a, b, t, &join(path, "members"))?;
            out.kind = ShapeKind::Group { members };
            return Ok(());
        }
        if !start.needs_morph(end) {
            out.kind = lerp_kind(&start.kind, &end.kind, t, self.defaults.step_threshold);
            return Ok(());
        }

        let key = join(path, "geometry");
        let plan = self.plan(&key, || {
            let context = AlignmentContext::new(
                start.rotation,
                end.rotation,
                start.is_closed(),
                end.is_closed(),
            );
            align_contours(
                &start.contours(),
                &end.contours(),
                &context,
                self.aligner(),
                self.defaults.norm,
            )
            .map(Plan::Contours)
        })?;
        let Plan::Contours(pairs) = plan.as_ref() else {
            return Err(MorphError::PlanMismatch(key));
        };
        out.morph = Some(Arc::new(MorphGeometry {
            contours: interpolate_contours(pairs, t),
        }));
        Ok(())
    }

    /// A nested record present on one side only fades out or in.
    fn optional(
        &self,
        start: Option<&ShapeState>,
        end: Option<&ShapeState>,
        t: f64,
        path: &str,
    ) -> Result<Option<ShapeState>, MorphError> {
        match (start, end) {
            (Some(a), Some(b)) => self.blend(a, b, Fraction::Eased(t), path).map(Some),
            (Some(a), None) => Ok((t < 1.0).then(|| a.faded(1.0 - t))),
            (None, Some(b)) => Ok((t > 0.0).then(|| b.faded(t))),
            (None, None) => Ok(None),
        }
    }

    /// Maps two record lists by position; morphs recurse, creations fade in
    /// and destructions fade out at their own geometry.
    fn list(
        &self,
        start: &[ShapeState],
        end: &[ShapeState],
        t: f64,
        path: &str,
    ) -> Result<Vec<ShapeState>, MorphError> {
        if start.is_empty() && end.is_empty() {
            return Ok(Vec::new());
        }
        let plan = self.plan(path, || {
            let matches = map_items(self.mapper().as_ref(), start, end, |s| s.pos)?;
            check_indices(&matches, start.len(), end.len())?;
            Ok(Plan::Matches(matches))
        })?;
        let Plan::Matches(matches) = plan.as_ref() else {
            return Err(MorphError::PlanMismatch(path.to_string()));
        };

        let mut out = Vec::with_capacity(matches.len());
        for m in matches {
            match (m.start(), m.end()) {
                (Some(i), Some(j)) => {
                    let child = format!("{path}/{i}>{j}");
                    out.push(self.blend(&start[i], &end[j], Fraction::Eased(t), &child)?);
                }
                (Some(i), None) if t < 1.0 => out.push(start[i].faded(1.0 - t)),
                (None, Some(j)) if t > 0.0 => out.push(end[j].faded(t)),
                (None, None) => return Err(MorphError::EmptyMatch),
                _ => {}
            }
        }
        Ok(out)
    }

    fn plan<F>(&self, path: &str, compute: F) -> Result<Arc<Plan>, MorphError>
    where
        F: FnOnce() -> Result<Plan, MorphError>,
    {
        match self.plans {
            Some((cache, segment)) => cache.get_or_compute(PlanKey::new(segment, path), compute),
            None => compute().map(Arc::new),
        }
    }

    fn mapper(&self) -> Arc<dyn Mapper> {
        let strategy = self
            .overrides
            .and_then(|o| o.morphing.as_ref())
            .and_then(|m| m.mapper.clone())
            .unwrap_or_else(|| self.defaults.mapper.clone());
        Arc::new(strategy)
    }

    fn aligner(&self) -> Option<Arc<dyn VertexAligner>> {
        self.overrides
            .and_then(|o| o.morphing.as_ref())
            .and_then(|m| m.aligner.clone())
            .or_else(|| self.defaults.aligner.clone())
            .map(|strategy| strategy.build(self.defaults.norm))
    }
}

/// Blends two records with the given defaults and no segment overrides.
pub fn interpolate(
    start: &ShapeState,
    end: &ShapeState,
    t: f64,
    defaults: &MorphDefaults,
) -> Result<ShapeState, MorphError> {
    Interpolator::new(defaults).interpolate(start, end, t)
}

fn join(path: &str, name: &str) -> String {
    format!("{path}/{name}")
}

/// `Fixed` wins when either side declares it.
fn policy(start: &ShapeState, end: &ShapeState, field: Field) -> Blend {
    let (a, b) = (start.kind.field_blend(field), end.kind.field_blend(field));
    if a == Blend::Fixed || b == Blend::Fixed {
        Blend::Fixed
    } else {
        a
    }
}

fn scalar_field(state: &ShapeState, field: Field) -> f64 {
    match field {
        Field::Rotation => state.rotation,
        Field::Scale => state.scale,
        Field::Opacity => state.opacity,
        Field::FillOpacity => state.fill_opacity,
        Field::StrokeOpacity => state.stroke_opacity,
        Field::StrokeWidth => state.stroke_width,
        Field::ZIndex => state.z_index,
        _ => 0.0,
    }
}

fn set_scalar_field(state: &mut ShapeState, field: Field, value: f64) {
    match field {
        Field::Rotation => state.rotation = value,
        Field::Scale => state.scale = value,
        Field::Opacity => state.opacity = value,
        Field::FillOpacity => state.fill_opacity = value,
        Field::StrokeOpacity => state.stroke_opacity = value,
        Field::StrokeWidth => state.stroke_width = value,
        Field::ZIndex => state.z_index = value,
        _ => {}
    }
}

fn check_indices(matches: &[Match], start_len: usize, end_len: usize) -> Result<(), MorphError> {
    for m in matches {
        let bad_start = m.start().is_some_and(|i| i >= start_len);
        let bad_end = m.end().is_some_and(|j| j >= end_len);
        if bad_start || bad_end {
            return Err(MorphError::IndexOutOfRange {
                start: m.start().unwrap_or_default(),
                end: m.end().unwrap_or_default(),
                start_len,
                end_len,
            });
        }
    }
    Ok(())
}

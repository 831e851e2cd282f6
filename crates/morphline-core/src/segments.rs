//! Ready-made keystate patterns for `ElementBuilder::segment`.

use crate::error::MorphError;
use crate::segment::SegmentOverrides;
use crate::timeline::Keystate;
use morphline_data::ShapeState;

/// `count` evenly spaced times from `start` to `end`; a single time sits in
/// the middle.
pub fn linspace(count: usize, start: f64, end: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![(start + end) / 2.0],
        _ => (0..count)
            .map(|i| start + (end - start) * i as f64 / (count - 1) as f64)
            .collect(),
    }
}

fn leaving(time: f64, state: ShapeState, transition: &Option<SegmentOverrides>) -> Keystate {
    let keystate = Keystate::new(time, state);
    match transition {
        Some(overrides) => keystate.with_transition(overrides.clone()),
        None => keystate,
    }
}

/// Two identical keystates bracketing `at`, `duration` apart.
pub fn hold(state: &ShapeState, at: f64, duration: f64) -> Vec<Keystate> {
    let half = duration / 2.0;
    vec![
        Keystate::new((at - half).max(0.0), state.clone()),
        Keystate::new((at + half).min(1.0), state.clone()),
    ]
}

/// Holds each state in turn, centred on evenly spaced times. `transition`
/// shapes the moves between holds.
pub fn hold_each(
    states: &[ShapeState],
    duration: Option<f64>,
    transition: Option<SegmentOverrides>,
) -> Vec<Keystate> {
    let duration = duration.unwrap_or(1.0 / (3 * states.len().max(1)) as f64);
    let half = duration / 2.0;
    states
        .iter()
        .zip(linspace(states.len(), 0.0, 1.0))
        .flat_map(|(state, at)| {
            [
                Keystate::new((at - half).max(0.0), state.clone()),
                leaving((at + half).min(1.0), state.clone(), &transition),
            ]
        })
        .collect()
}

/// Fades in from zero opacity, holds around `center`, fades out again. Fades
/// that would start before 0 or end after 1 are dropped.
pub fn fade_in_out(
    state: &ShapeState,
    center: f64,
    hold: f64,
    fade: f64,
    transition: Option<SegmentOverrides>,
) -> Vec<Keystate> {
    let half = hold / 2.0;
    let hidden = state.clone().with_opacity(0.0);
    let mut keystates = Vec::with_capacity(4);
    if center - half > 0.0 {
        keystates.push(leaving((center - half - fade).max(0.0), hidden.clone(), &transition));
    }
    keystates.push(Keystate::new((center - half).max(0.0), state.clone()));
    if center + half < 1.0 {
        keystates.push(leaving((center + half).min(1.0), state.clone(), &transition));
        keystates.push(Keystate::new((center + half + fade).min(1.0), hidden));
    } else {
        keystates.push(Keystate::new((center + half).min(1.0), state.clone()));
    }
    keystates
}

/// Goes back and forth between `a` and `b` `moves` times within
/// [`start`, `end`], pausing `pause` at every turn.
pub fn bounce(
    a: &ShapeState,
    b: &ShapeState,
    start: f64,
    end: f64,
    pause: f64,
    moves: usize,
    transition: Option<SegmentOverrides>,
) -> Result<Vec<Keystate>, MorphError> {
    if moves == 0 {
        return Err(MorphError::SegmentTiming("bounce needs at least one move"));
    }
    let pauses = (moves - 1) as f64 * pause;
    let step = (end - start - pauses) / moves as f64;
    if step <= 0.0 {
        return Err(MorphError::SegmentTiming(
            "bounce pauses leave no time for the moves",
        ));
    }
    let mut keystates = Vec::with_capacity(2 * moves);
    for i in 0..=moves {
        let state = if i % 2 == 0 { a } else { b };
        if i == 0 {
            keystates.push(leaving(start, state.clone(), &transition));
        } else if i == moves {
            keystates.push(Keystate::new(end, state.clone()));
        } else {
            let arrive = start + i as f64 * step + (i - 1) as f64 * pause;
            if pause > 0.0 {
                keystates.push(Keystate::new(arrive, state.clone()));
            }
            keystates.push(leaving(arrive + pause, state.clone(), &transition));
        }
    }
    Ok(keystates)
}

/// Keystates for two elements: `outgoing` fades out while `incoming` fades
/// in, the fade in starting `delay` later and the fade out ending `delay`
/// earlier. Returns `(fading_out, fading_in)`.
pub fn crossfade(
    outgoing: &ShapeState,
    incoming: &ShapeState,
    start: f64,
    end: f64,
    delay: f64,
    transition: Option<SegmentOverrides>,
) -> (Vec<Keystate>, Vec<Keystate>) {
    let fading_out = vec![
        leaving(start.max(0.0), outgoing.clone(), &transition),
        Keystate::new((end - delay).min(1.0), outgoing.clone().with_opacity(0.0)),
    ];
    let fading_in = vec![
        leaving((start + delay).max(0.0), incoming.clone().with_opacity(0.0), &transition),
        Keystate::new(end.min(1.0), incoming.clone()),
    ];
    (fading_out, fading_in)
}

/// Keystates for two elements trading places between `start` and `end`.
pub fn swap_positions(
    a: &ShapeState,
    b: &ShapeState,
    start: f64,
    end: f64,
    transition: Option<SegmentOverrides>,
) -> (Vec<Keystate>, Vec<Keystate>) {
    let first = vec![
        leaving(start, a.clone(), &transition),
        Keystate::new(end, a.clone().with_pos(b.pos)),
    ];
    let second = vec![
        leaving(start, b.clone(), &transition),
        Keystate::new(end, b.clone().with_pos(a.pos)),
    ];
    (first, second)
}

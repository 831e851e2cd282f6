use morphline::{
    resolve_frames, sequence_frame, sequence_frames, Element, Frame, Point, Scene, SceneSequence,
    SceneTransition, ShapeKind, ShapeState, TransitionKind,
};
use rayon::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn circle_to_star() -> Element {
    let circle = ShapeState::new(ShapeKind::Circle { radius: 20.0 }).with_num_vertices(64);
    let star = ShapeState::new(ShapeKind::Star {
        points: 5,
        outer_radius: 25.0,
        inner_radius: 10.0,
    })
    .with_num_vertices(64)
    .with_pos(Point::new(100.0, 0.0));
    Element::builder()
        .keystate(0.0, circle)
        .keystate(1.0, star)
        .build()
        .unwrap()
}

#[test]
fn test_parallel_frames_share_one_plan() {
    init_tracing();
    let element = circle_to_star();
    let frames = resolve_frames(&element, 41).unwrap();
    assert_eq!(frames.len(), 41);

    // Endpoints come back as the keystate records.
    assert!(frames[0].morph.is_none());
    assert_eq!(frames[0].kind, ShapeKind::Circle { radius: 20.0 });
    assert!(matches!(frames[40].kind, ShapeKind::Star { .. }));

    let resolution = ShapeKind::Circle { radius: 20.0 }.contours(64)[0].outer.len();
    for frame in &frames[1..40] {
        let morph = frame.morph.as_ref().expect("inner frames carry morph geometry");
        assert_eq!(morph.contours.len(), 1);
        assert_eq!(morph.contours[0].outer.len(), resolution);
    }
    assert_eq!(element.plans().computations(), 1);
}

#[test]
fn test_concurrent_resolves_agree() {
    let element = circle_to_star();
    let times: Vec<f64> = (0..200).map(|i| (i % 20) as f64 / 20.0).collect();
    let xs: Vec<f64> = times
        .par_iter()
        .map(|&t| element.resolve(t).unwrap().pos.x)
        .collect();
    for (t, x) in times.iter().zip(&xs) {
        assert!((x - 100.0 * t).abs() < 1e-9, "t={t} x={x}");
    }
    assert_eq!(element.plans().computations(), 1);
}

#[test]
fn test_sequence_frames_switch_scenes() {
    init_tracing();
    let dot = ShapeState::new(ShapeKind::Circle { radius: 1.0 });
    let fade_in = Element::builder()
        .keystate(0.0, dot.clone().with_opacity(0.0))
        .keystate(1.0, dot.clone())
        .build()
        .unwrap();
    let still = Element::builder().keystate(0.0, dot).build().unwrap();

    let sequence = SceneSequence::new()
        .scene(Scene::new(vec![fade_in]), 1.0)
        .unwrap()
        .transition(SceneTransition::fade(2.0))
        .unwrap()
        .scene(Scene::new(vec![still]), 1.0)
        .unwrap();

    match sequence_frame(&sequence, 0.125).unwrap() {
        Frame::Scene { index, states } => {
            assert_eq!(index, 0);
            assert!((states[0].opacity - 0.5).abs() < 1e-9);
        }
        other => panic!("expected the first scene, got {other:?}"),
    }
    match sequence_frame(&sequence, 0.5).unwrap() {
        Frame::Transition {
            kind,
            progress,
            outgoing,
            incoming,
        } => {
            assert_eq!(kind, TransitionKind::Fade);
            assert!((progress - 0.5).abs() < 1e-9);
            assert_eq!(outgoing[0].opacity, 1.0);
            assert_eq!(incoming[0].opacity, 1.0);
        }
        other => panic!("expected the transition, got {other:?}"),
    }

    let frames = sequence_frames(&sequence, 5).unwrap();
    let kinds: Vec<&str> = frames
        .iter()
        .map(|frame| match frame {
            Frame::Scene { .. } => "scene",
            Frame::Transition { .. } => "transition",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["scene", "transition", "transition", "transition", "scene"]
    );
}

use morphline::{
    remap_sequence_time, ActiveUnit, Easing, SceneSequence, SceneTransition, SequenceError, Slot,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Scenes of 1, 2 and 1 units; a 0.5 gap transition after the first and a
/// 0.4 overlapping one after the second. Total 4.5 units.
fn mixed() -> Result<SceneSequence<&'static str>, SequenceError> {
    SceneSequence::new()
        .scene("intro", 1.0)?
        .transition(SceneTransition::fade(0.5))?
        .scene("middle", 2.0)?
        .transition(SceneTransition::fade(0.4).overlapping(true))?
        .scene("outro", 1.0)
}

#[test]
fn test_windows_cover_the_sequence_once() -> Result<(), SequenceError> {
    init_tracing();
    let sequence = mixed()?;
    assert!(approx(sequence.total_duration(), 4.5));

    let windows = sequence.windows();
    assert_eq!(windows.len(), 5);

    // Only scenes and gap transitions own time; overlapping ones borrow it.
    let owned: f64 = windows
        .iter()
        .filter(|(slot, _)| match slot {
            Slot::Scene { .. } => true,
            Slot::Transition { transition, .. } => *transition == 0,
        })
        .map(|(_, window)| window.len())
        .sum();
    assert!(approx(owned, 1.0), "{owned}");

    let (slot, gap) = windows[1];
    assert_eq!(
        slot,
        Slot::Transition {
            transition: 0,
            out_index: 0,
            in_index: 1
        }
    );
    assert!(approx(gap.len(), 0.5 / 4.5));

    let (_, overlap) = windows[3];
    assert!(approx(overlap.start, 3.3 / 4.5));
    assert!(approx(overlap.end, 3.7 / 4.5));
    Ok(())
}

#[test]
fn test_only_gap_transitions_add_time() -> Result<(), SequenceError> {
    let plain = SceneSequence::new()
        .scene("a", 1.0)?
        .transition(SceneTransition::fade(1.0).overlapping(true))?
        .scene("b", 1.0)?;
    assert!(approx(plain.total_duration(), 2.0));

    let gapped = SceneSequence::new()
        .scene("a", 1.0)?
        .transition(SceneTransition::fade(1.0))?
        .scene("b", 1.0)?;
    assert!(approx(gapped.total_duration(), 3.0));
    Ok(())
}

#[test]
fn test_gap_boundary_hands_over_cleanly() -> Result<(), SequenceError> {
    init_tracing();
    let sequence = mixed()?;
    let (_, intro) = sequence.windows()[0];

    match remap_sequence_time(&sequence, intro.end)? {
        ActiveUnit::Transition {
            scene_out,
            scene_in,
            time_out,
            time_in,
            progress,
            ..
        } => {
            assert_eq!((*scene_out, *scene_in), ("intro", "middle"));
            assert_eq!(time_out, 1.0);
            assert_eq!(time_in, 0.0);
            assert_eq!(progress, 0.0);
        }
        other => panic!("expected the transition, got {other:?}"),
    }

    match remap_sequence_time(&sequence, intro.end / 2.0)? {
        ActiveUnit::Scene {
            scene, local_time, ..
        } => {
            assert_eq!(*scene, "intro");
            assert!(approx(local_time, 0.5));
        }
        other => panic!("expected the intro, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_overlapping_transition_runs_both_scenes() -> Result<(), SequenceError> {
    let sequence = mixed()?;
    let windows = sequence.windows();
    let (_, middle) = windows[2];
    let (_, outro) = windows[4];

    match remap_sequence_time(&sequence, 3.6 / 4.5)? {
        ActiveUnit::Transition {
            out_index,
            in_index,
            time_out,
            time_in,
            progress,
            ..
        } => {
            assert_eq!((out_index, in_index), (1, 2));
            assert!(approx(time_out, 1.0));
            let expected_in = (3.6 / 4.5 - outro.start) / outro.len();
            assert!(approx(time_in, expected_in), "{time_in}");
            assert!(approx(progress, 0.75), "{progress}");
        }
        other => panic!("expected the overlap, got {other:?}"),
    }

    // Before the boundary the outgoing scene is still running.
    match remap_sequence_time(&sequence, 3.4 / 4.5)? {
        ActiveUnit::Transition {
            time_out, time_in, ..
        } => {
            let expected_out = (3.4 / 4.5 - middle.start) / middle.len();
            assert!(approx(time_out, expected_out));
            assert_eq!(time_in, 0.0);
        }
        other => panic!("expected the overlap, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_transition_progress_is_eased() -> Result<(), SequenceError> {
    let sequence = SceneSequence::new()
        .scene(1, 1.0)?
        .transition(SceneTransition::fade(2.0).with_easing(Easing::Hold))?
        .scene(2, 1.0)?;
    match remap_sequence_time(&sequence, 0.5)? {
        ActiveUnit::Transition { progress, .. } => assert_eq!(progress, 0.0),
        other => panic!("expected the transition, got {other:?}"),
    }
    match remap_sequence_time(&sequence, 1.0)? {
        ActiveUnit::Scene {
            scene, local_time, ..
        } => {
            assert_eq!(*scene, 2);
            assert_eq!(local_time, 1.0);
        }
        other => panic!("expected the last scene, got {other:?}"),
    }
    Ok(())
}

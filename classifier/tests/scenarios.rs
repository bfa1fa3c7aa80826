use stability_classifier::{
    Event, Malformed, Phase, Prediction, StabilityClassifier, StabilityConfig, StabilityError,
    TargetPicker,
};

type Error = Box<dyn std::error::Error>;

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn dwell_classifier(min_dwell_ms: u64) -> Result<StabilityClassifier, Error> {
    let config = StabilityConfig::new(labels(&["A", "B", "C"])).with_min_dwell_ms(min_dwell_ms);
    Ok(StabilityClassifier::new(config)?)
}

fn pose_classifier(seed: u64) -> Result<StabilityClassifier, Error> {
    let config = StabilityConfig::new(labels(&["upward-salute", "extended-side", "warrior"]))
        .with_min_dwell_ms(1000)
        .with_grace_ms(500)
        .with_hold_to_complete_ms(5000);
    Ok(StabilityClassifier::with_picker(
        config,
        TargetPicker::seeded(seed),
    )?)
}

/// Feed `(label, time)` ticks and collect every event with its tick time.
fn feed(
    classifier: &mut StabilityClassifier,
    ticks: &[(&str, u64)],
) -> Result<Vec<(u64, Event)>, Error> {
    let mut fired = Vec::new();
    for (label, now_ms) in ticks {
        let events = classifier.on_tick(&Prediction::new(*label, 0.8), *now_ms)?;
        fired.extend(events.into_iter().map(|event| (*now_ms, event)));
    }
    Ok(fired)
}

fn selections(fired: &[(u64, Event)]) -> usize {
    fired
        .iter()
        .filter(|(_, event)| matches!(event, Event::SelectionChanged(_)))
        .count()
}

#[test]
fn test_stable_label_fires_once_at_dwell() -> Result<(), Error> {
    let mut classifier = dwell_classifier(1000)?;

    let fired = feed(&mut classifier, &[("A", 0), ("A", 300), ("A", 1100)])?;

    assert_eq!(fired, vec![(1100, Event::SelectionChanged("A".into()))]);
    Ok(())
}

#[test]
fn test_no_duplicate_selection_while_locked() -> Result<(), Error> {
    let mut classifier = dwell_classifier(1000)?;

    let ticks: Vec<(&str, u64)> = (0..100).map(|i| ("A", i * 33)).collect();
    let fired = feed(&mut classifier, &ticks)?;

    assert_eq!(selections(&fired), 1);
    assert_eq!(classifier.state().locked_label(), Some("A"));
    Ok(())
}

#[test]
fn test_interrupted_before_dwell_never_fires() -> Result<(), Error> {
    let mut classifier = dwell_classifier(1000)?;

    let fired = feed(&mut classifier, &[("A", 0), ("A", 500), ("A", 999), ("B", 1000)])?;

    assert!(fired.is_empty());
    assert_eq!(classifier.state().phase(), Phase::Candidate);
    assert_eq!(classifier.state().candidate_label(), Some("B"));
    Ok(())
}

#[test]
fn test_held_past_dwell_fires_exactly_once() -> Result<(), Error> {
    let mut classifier = dwell_classifier(1000)?;

    let fired = feed(
        &mut classifier,
        &[("A", 0), ("A", 999), ("A", 1001), ("A", 1500), ("A", 3000)],
    )?;

    assert_eq!(fired, vec![(1001, Event::SelectionChanged("A".into()))]);
    Ok(())
}

#[test]
fn test_edge_trigger_fires_every_transition() -> Result<(), Error> {
    let mut classifier = dwell_classifier(0)?;

    let fired = feed(&mut classifier, &[("A", 0), ("B", 100)])?;

    assert_eq!(
        fired,
        vec![
            (0, Event::SelectionChanged("A".into())),
            (100, Event::SelectionChanged("B".into())),
        ]
    );
    Ok(())
}

#[test]
fn test_edge_trigger_ignores_repeats() -> Result<(), Error> {
    let mut classifier = dwell_classifier(0)?;

    let fired = feed(
        &mut classifier,
        &[("A", 0), ("A", 10), ("A", 20), ("B", 30), ("B", 40), ("A", 50)],
    )?;

    let labels: Vec<_> = fired.iter().map(|(_, event)| event.label()).collect();
    assert_eq!(labels, ["A", "B", "A"]);
    Ok(())
}

#[test]
fn test_flicker_within_grace_keeps_lock() -> Result<(), Error> {
    let mut classifier = pose_classifier(1)?;
    feed(&mut classifier, &[("warrior", 0), ("warrior", 1000)])?;

    // Locked on warrior; away at +0, back at +400 with 500ms grace.
    let fired = feed(&mut classifier, &[("extended-side", 2000), ("warrior", 2400)])?;

    assert!(fired.is_empty());
    assert_eq!(classifier.state().locked_label(), Some("warrior"));
    assert!(!classifier.state().grace().is_armed());

    // Well past the original grace deadline, still nothing.
    let fired = feed(&mut classifier, &[("warrior", 3000)])?;
    assert!(fired.is_empty());
    Ok(())
}

#[test]
fn test_staying_away_past_grace_loses_once() -> Result<(), Error> {
    let mut classifier = pose_classifier(1)?;
    feed(&mut classifier, &[("warrior", 0), ("warrior", 1000)])?;

    let fired = feed(
        &mut classifier,
        &[
            ("extended-side", 2000),
            ("extended-side", 2300),
            ("extended-side", 2600),
            ("extended-side", 2900),
        ],
    )?;

    assert_eq!(fired, vec![(2600, Event::PoseLost("warrior".into()))]);
    assert_eq!(classifier.state().locked_label(), None);
    Ok(())
}

#[test]
fn test_hold_to_complete_picks_a_different_target() -> Result<(), Error> {
    for seed in 0..20 {
        let mut classifier = pose_classifier(seed)?;
        classifier.advance_target(0)?;
        let target = classifier.target().map(str::to_owned).ok_or("no target")?;

        let ticks: Vec<(&str, u64)> = (0..=250).map(|i| (target.as_str(), i * 40)).collect();
        let fired = feed(&mut classifier, &ticks)?;

        let completed: Vec<_> = fired
            .iter()
            .filter(|(_, event)| matches!(event, Event::PoseCompleted(_)))
            .collect();
        assert_eq!(
            completed,
            vec![&(6000, Event::PoseCompleted(target.clone()))]
        );

        let next = classifier.target().ok_or("no next target")?;
        assert_ne!(next, target);
        assert!(fired.contains(&(6000, Event::TargetChanged(next.to_owned()))));
    }
    Ok(())
}

#[test]
fn test_hold_survives_flicker_but_not_loss() -> Result<(), Error> {
    let mut classifier = pose_classifier(5)?;
    classifier.set_target("warrior", 0)?;

    feed(&mut classifier, &[("warrior", 0), ("warrior", 1000)])?;
    assert_eq!(classifier.state().completion().deadline_ms(), Some(6000));

    feed(&mut classifier, &[("warrior", 3000), ("extended-side", 3100), ("warrior", 3300)])?;
    assert_eq!(classifier.state().completion().deadline_ms(), Some(6000));

    let fired = feed(&mut classifier, &[("extended-side", 4000), ("extended-side", 4500)])?;
    assert_eq!(fired, vec![(4500, Event::PoseLost("warrior".into()))]);
    assert!(!classifier.state().completion().is_armed());

    // The cancelled hold must not fire later.
    let fired = feed(&mut classifier, &[("extended-side", 6000), ("extended-side", 7000)])?;
    assert!(!fired
        .iter()
        .any(|(_, event)| matches!(event, Event::PoseCompleted(_))));
    assert_eq!(classifier.target(), Some("warrior"));
    Ok(())
}

#[test]
fn test_malformed_scores_leave_state_unchanged() -> Result<(), Error> {
    let mut classifier = pose_classifier(2)?;
    classifier.set_target("warrior", 0)?;
    classifier.on_scores(&[0.1, 0.1, 0.8], 0)?;
    classifier.on_scores(&[0.1, 0.1, 0.8], 1000)?;
    classifier.on_scores(&[0.1, 0.8, 0.1], 1100)?;
    let before = classifier.state().clone();

    let err = classifier.on_scores(&[0.5, 0.5], 1200).unwrap_err();

    assert_eq!(
        err,
        StabilityError::MalformedPrediction(Malformed::CountMismatch {
            labels: 3,
            scores: 2
        })
    );
    assert_eq!(classifier.state(), &before);
    assert!(classifier.on_scores(&[0.5, f32::NAN, 0.1], 1300).is_err());
    assert_eq!(classifier.state(), &before);
    Ok(())
}

#[test]
fn test_on_scores_uses_first_of_equal_scores() -> Result<(), Error> {
    let mut classifier = dwell_classifier(0)?;

    let events = classifier.on_scores(&[0.4, 0.4, 0.2], 0)?;

    assert_eq!(events.into_vec(), vec![Event::SelectionChanged("A".into())]);
    Ok(())
}

/// Lock on the target at 1000ms, arming the hold until 6000ms.
fn locked_on_target(seed: u64) -> Result<StabilityClassifier, Error> {
    let mut classifier = pose_classifier(seed)?;
    classifier.set_target("warrior", 0)?;
    feed(&mut classifier, &[("warrior", 0), ("warrior", 1000)])?;
    assert_eq!(classifier.state().completion().deadline_ms(), Some(6000));
    Ok(classifier)
}

#[test]
fn test_earlier_grace_expiry_cancels_hold() -> Result<(), Error> {
    let mut classifier = locked_on_target(1)?;
    feed(&mut classifier, &[("upward-salute", 1200)])?;
    assert_eq!(classifier.state().grace().deadline_ms(), Some(1700));

    // Both deadlines have passed by the next tick.
    let fired = feed(&mut classifier, &[("upward-salute", 6500)])?;
    assert_eq!(fired, vec![(6500, Event::PoseLost("warrior".into()))]);
    assert!(!classifier.state().completion().is_armed());

    assert!(classifier.poll_timers(12000)?.is_empty());
    assert_eq!(classifier.target(), Some("warrior"));
    Ok(())
}

#[test]
fn test_completion_while_grace_pending() -> Result<(), Error> {
    let mut classifier = locked_on_target(2)?;
    feed(&mut classifier, &[("extended-side", 5800)])?;
    assert_eq!(classifier.state().grace().deadline_ms(), Some(6300));

    let fired = feed(&mut classifier, &[("extended-side", 6100)])?;
    let next = classifier.target().ok_or("no next target")?.to_owned();
    assert_ne!(next, "warrior");
    assert_eq!(
        fired,
        vec![
            (6100, Event::PoseCompleted("warrior".into())),
            (6100, Event::TargetChanged(next)),
        ]
    );
    assert!(!classifier.state().grace().is_armed());

    assert!(classifier.poll_timers(7000)?.is_empty());
    assert_eq!(classifier.state().phase(), Phase::Candidate);
    Ok(())
}

#[test]
fn test_completion_wins_a_deadline_tie() -> Result<(), Error> {
    let mut classifier = locked_on_target(3)?;
    feed(&mut classifier, &[("upward-salute", 5500)])?;
    assert_eq!(classifier.state().grace().deadline_ms(), Some(6000));

    let events = classifier.poll_timers(6000)?.into_vec();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], Event::PoseCompleted("warrior".into()));
    assert!(matches!(events[1], Event::TargetChanged(_)));
    assert!(!classifier.state().grace().is_armed());
    assert!(classifier.poll_timers(8000)?.is_empty());
    Ok(())
}

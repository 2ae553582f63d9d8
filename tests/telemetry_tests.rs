use ritual::kernel::telemetry::event::TelemetryEvent;
use ritual::{Candidate, Phase, RitualConfig, WorkflowMachine};
use ritual::Clock;

#[test]
fn test_transitions_and_seals_are_counted() {
    let mut machine = WorkflowMachine::new();
    machine.advance_to(Phase::Home).unwrap();
    machine
        .enter_ritual(vec![Candidate::new("a"), Candidate::new("b")], 0)
        .unwrap();
    machine.seal("a").unwrap();

    let snap = machine.telemetry.snapshot();
    assert_eq!(snap.transitions, 3);
    assert_eq!(snap.seals, 1);
    assert_eq!(snap.entries(Phase::Ritual), 1);
    assert_eq!(snap.entries(Phase::Seal), 1);
    assert_eq!(snap.entries(Phase::Camera), 0);
}

#[test]
fn test_rejections_and_ignored_commands() {
    let mut machine = WorkflowMachine::new();
    let _ = machine.seal("a");
    let _ = machine.enter_ritual(vec![], 0);
    machine.update_candidates(vec![Candidate::new("late")]);

    let snap = machine.telemetry.snapshot();
    assert_eq!(snap.rejections, 2);
    assert_eq!(snap.ignored, 1);
    assert_eq!(snap.transitions, 0);

    let events: Vec<_> = machine.telemetry.events().cloned().collect();
    assert_eq!(
        events[0],
        TelemetryEvent::Rejected {
            command: "seal",
            phase: Phase::Void
        }
    );
}

#[test]
fn test_safety_triggers_recorded_with_source() {
    let mut machine = WorkflowMachine::new();
    machine.advance_to(Phase::Camera).unwrap();
    machine.trigger_safety();
    machine.trigger_safety();

    assert_eq!(machine.telemetry.snapshot().safety_triggers, 2);
    assert!(machine
        .telemetry
        .events()
        .any(|e| *e == TelemetryEvent::SafetyTriggered { from: Phase::Camera }));
}

#[test]
fn test_telemetry_carries_ids_not_payloads() {
    let mut machine = WorkflowMachine::new();
    let secret = Candidate::with_meta("c1", serde_json::json!({ "photo": "private-bytes" }));
    machine.enter_ritual(vec![secret], 0).unwrap();
    machine.seal("c1").unwrap();

    for event in machine.telemetry.events() {
        let rendered = serde_json::to_string(event).unwrap();
        assert!(!rendered.contains("private-bytes"));
    }
}

#[test]
fn test_capacity_from_config() {
    let config = RitualConfig {
        telemetry_capacity: 3,
        ..RitualConfig::default()
    };
    let mut machine = WorkflowMachine::from_config(&config, Clock::system());
    for _ in 0..10 {
        machine.trigger_safety();
    }
    // each trigger records a transition and a safety event
    assert_eq!(machine.telemetry.len(), 3);
}

#[test]
fn test_telemetry_does_not_influence_state() {
    let mut a = WorkflowMachine::new();
    let mut b = WorkflowMachine::new();
    for machine in [&mut a, &mut b] {
        machine.advance_to(Phase::Onboarding).unwrap();
        machine.enter_ritual(vec![Candidate::new("x")], 0).unwrap();
    }
    a.telemetry.clear();
    a.set_active_index(0);
    b.set_active_index(0);

    assert_eq!(a.phase(), b.phase());
    assert_eq!(a.snapshot().revision, b.snapshot().revision);
    assert!(a.telemetry.len() < b.telemetry.len());
}

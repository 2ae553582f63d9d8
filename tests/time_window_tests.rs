use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use ritual::{BoundaryTracker, Clock, TimeWindowGate};

fn today_at(hour: u32, minute: u32) -> NaiveDateTime {
    Local::now()
        .date_naive()
        .and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
}

fn tomorrow_at(hour: u32, minute: u32) -> NaiveDateTime {
    today_at(hour, minute) + TimeDelta::days(1)
}

#[test]
fn test_window_by_hour() {
    let clock = Clock::system();
    let gate = TimeWindowGate::new(clock.clone());

    clock.simulate_local_time(today_at(5, 0));
    assert!(gate.is_within_window());
    assert!(!gate.is_locked());

    clock.simulate_local_time(today_at(11, 0));
    assert!(!gate.is_within_window());
    assert!(gate.is_locked());

    clock.simulate_local_time(today_at(3, 0));
    assert!(!gate.is_within_window());
}

#[test]
fn test_minutes_remaining() {
    let clock = Clock::system();
    let gate = TimeWindowGate::new(clock.clone());

    clock.simulate_local_time(today_at(9, 45));
    assert_eq!(gate.minutes_remaining(), 15);

    clock.simulate_local_time(today_at(11, 0));
    assert_eq!(gate.minutes_remaining(), 0);
}

#[test]
fn test_check_matches_individual_queries() {
    let clock = Clock::system();
    let gate = TimeWindowGate::new(clock.clone());
    clock.simulate_local_time(today_at(6, 30));

    let check = gate.check();
    assert!(check.is_open);
    assert_eq!(check.minutes_remaining, 210);
}

#[test]
fn test_hour_of_day_follows_offset() {
    let clock = Clock::system();
    clock.simulate_local_time(today_at(22, 10));
    assert_eq!(clock.hour_of_day(), 22);

    clock.reset_offset();
    assert_eq!(clock.offset(), TimeDelta::zero());
}

#[test]
fn test_boundary_crossed_once_after_late_night() {
    let clock = Clock::system();
    clock.simulate_local_time(today_at(23, 0));
    let mut tracker = BoundaryTracker::new(clock.clone());

    clock.simulate_local_time(tomorrow_at(4, 1));
    assert!(tracker.has_crossed_boundary());
    assert!(!tracker.has_crossed_boundary(), "same boundary reported twice");
}

#[test]
fn test_boundary_not_crossed_before_boundary_hour() {
    let clock = Clock::system();
    clock.simulate_local_time(today_at(11, 0));
    let mut tracker = BoundaryTracker::new(clock.clone());

    clock.simulate_local_time(tomorrow_at(2, 0));
    assert!(!tracker.has_crossed_boundary());

    // the real crossing still fires later
    clock.simulate_local_time(tomorrow_at(4, 30));
    assert!(tracker.has_crossed_boundary());
}

#[test]
fn test_boundary_updates_last_observed() {
    let clock = Clock::system();
    clock.simulate_local_time(today_at(12, 0));
    let mut tracker = BoundaryTracker::new(clock.clone());

    clock.simulate_local_time(today_at(18, 0));
    tracker.has_crossed_boundary();
    assert!(tracker.last_observed() >= today_at(18, 0));
}

#[test]
fn test_trackers_are_independent() {
    let clock = Clock::system();
    clock.simulate_local_time(today_at(23, 0));
    let mut first = BoundaryTracker::new(clock.clone());
    let mut second = BoundaryTracker::new(clock.clone());

    clock.simulate_local_time(tomorrow_at(5, 0));
    assert!(first.has_crossed_boundary());
    assert!(second.has_crossed_boundary());
}

#[test]
fn test_observe_from_restores_tracker() {
    let clock = Clock::system();
    clock.simulate_local_time(today_at(9, 0));
    let mut tracker = BoundaryTracker::new(clock.clone());

    // host restored a tracker that last looked at 03:00
    tracker.observe_from(today_at(3, 0));
    assert!(tracker.has_crossed_boundary());
}

#[test]
fn test_end_to_end_lock_and_boundary() {
    let clock = Clock::system();
    let gate = TimeWindowGate::new(clock.clone());

    clock.simulate_local_time(today_at(11, 0));
    let mut tracker = BoundaryTracker::new(clock.clone());
    assert!(gate.is_locked());

    clock.simulate_local_time(today_at(5, 0));
    assert!(!gate.is_locked());
    assert!(gate.is_within_window());

    clock.simulate_local_time(today_at(23, 0));
    assert!(!tracker.has_crossed_boundary(), "priming call on the same day");

    clock.simulate_local_time(tomorrow_at(4, 1));
    assert!(tracker.has_crossed_boundary());
}

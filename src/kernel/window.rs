use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::time::Clock;
use crate::config::{WindowConfig, DEFAULT_END_HOUR, DEFAULT_START_HOUR};

/// Result of a single window evaluation. Derived only from the current hour
/// and minute relative to the fixed start/end hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowCheckResult {
    pub is_open: bool,
    pub minutes_remaining: u32,
}

/// Decides whether the ritual may be entered right now.
/// The window is `[start_hour:00, end_hour:00)` in local time.
#[derive(Debug, Clone)]
pub struct TimeWindowGate {
    clock: Clock,
    start_hour: u32,
    end_hour: u32,
}

impl TimeWindowGate {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }

    /// Assumes `window` already passed `WindowConfig::validate`.
    pub fn with_window(clock: Clock, window: &WindowConfig) -> Self {
        Self {
            clock,
            start_hour: window.start_hour,
            end_hour: window.end_hour,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn is_within_window(&self) -> bool {
        self.evaluate(self.clock.now()).is_open
    }

    pub fn is_locked(&self) -> bool {
        !self.is_within_window()
    }

    pub fn minutes_remaining(&self) -> u32 {
        self.evaluate(self.clock.now()).minutes_remaining
    }

    /// Both answers from one clock read.
    pub fn check(&self) -> WindowCheckResult {
        self.evaluate(self.clock.now())
    }

    /// Pure evaluation at an arbitrary instant.
    pub fn evaluate(&self, at: NaiveDateTime) -> WindowCheckResult {
        let hour = at.hour();
        let is_open = self.start_hour <= hour && hour < self.end_hour;
        let minutes_remaining = if is_open {
            // whole minutes until end_hour:00 today
            self.end_hour * 60 - (hour * 60 + at.minute())
        } else {
            0
        };
        WindowCheckResult {
            is_open,
            minutes_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn window_edges() {
        let gate = TimeWindowGate::new(Clock::system());
        assert!(!gate.evaluate(at(3, 59)).is_open);
        assert!(gate.evaluate(at(4, 0)).is_open);
        assert!(gate.evaluate(at(5, 0)).is_open);
        assert!(gate.evaluate(at(9, 59)).is_open);
        assert!(!gate.evaluate(at(10, 0)).is_open);
        assert!(!gate.evaluate(at(11, 0)).is_open);
    }

    #[test]
    fn minutes_remaining_counts_to_end_hour() {
        let gate = TimeWindowGate::new(Clock::system());
        assert_eq!(gate.evaluate(at(9, 45)).minutes_remaining, 15);
        assert_eq!(gate.evaluate(at(4, 0)).minutes_remaining, 360);
        assert_eq!(gate.evaluate(at(11, 0)).minutes_remaining, 0);
        assert_eq!(gate.evaluate(at(2, 30)).minutes_remaining, 0);
    }

    #[test]
    fn custom_window() {
        let window = WindowConfig { start_hour: 20, end_hour: 24 };
        let gate = TimeWindowGate::with_window(Clock::system(), &window);
        assert!(gate.evaluate(at(23, 59)).is_open);
        assert_eq!(gate.evaluate(at(23, 59)).minutes_remaining, 1);
        assert!(!gate.evaluate(at(0, 0)).is_open);
    }
}

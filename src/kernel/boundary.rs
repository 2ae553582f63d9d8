use chrono::{NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use super::time::Clock;
use crate::config::{ConfigError, DEFAULT_START_HOUR};

/// Detects the start of a new ritual day.
///
/// Stateful and forward-only: every call to `has_crossed_boundary` moves
/// `last_observed` to now, so a given boundary is reported at most once per
/// tracker. Callers that need the answer twice in a tick must keep the first one.
#[derive(Debug, Clone)]
pub struct BoundaryTracker {
    clock: Clock,
    boundary: NaiveTime,
    last_observed: NaiveDateTime,
}

impl BoundaryTracker {
    /// Starts observing from the clock's current instant.
    pub fn new(clock: Clock) -> Self {
        let last_observed = clock.now();
        Self {
            clock,
            boundary: NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0).unwrap_or_default(),
            last_observed,
        }
    }

    pub fn with_boundary_hour(clock: Clock, hour: u32) -> Result<Self, ConfigError> {
        let boundary =
            NaiveTime::from_hms_opt(hour, 0, 0).ok_or(ConfigError::InvalidBoundaryHour { hour })?;
        let last_observed = clock.now();
        Ok(Self {
            clock,
            boundary,
            last_observed,
        })
    }

    pub fn last_observed(&self) -> NaiveDateTime {
        self.last_observed
    }

    /// Overrides the last observed instant, e.g. when a host restores a tracker.
    pub fn observe_from(&mut self, instant: NaiveDateTime) {
        self.last_observed = instant;
    }

    pub fn has_crossed_boundary(&mut self) -> bool {
        let now = self.clock.now();
        let crossed = self.crossed_between(self.last_observed, now);
        if crossed {
            info!("Day boundary crossed (last seen {}, now {})", self.last_observed, now);
        } else {
            debug!("No day boundary since {}", self.last_observed);
        }
        self.last_observed = now;
        crossed
    }

    /// Pure crossing rule against today's boundary (`boundary` on `now`'s date).
    pub fn crossed_between(&self, last: NaiveDateTime, now: NaiveDateTime) -> bool {
        let today_boundary = now.date().and_time(self.boundary);
        if now < today_boundary {
            // Either still before today's boundary, or a new calendar day that has
            // not reached it yet (02:00 with a 04:00 boundary).
            return false;
        }
        let passed_today = last < today_boundary;
        let day_changed = last.date() < now.date();
        passed_today || day_changed
    }
}

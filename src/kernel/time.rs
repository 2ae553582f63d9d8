use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, Timelike, Utc};
#[cfg(any(test, feature = "simulation"))]
use tracing::{debug, info, warn};

/// Host tick counter. Advanced once per reactor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick {
    pub frame: u64,
}

pub const TICK_MS: u64 = 250;

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }
}

/// Single source of "now" for the kernel.
///
/// Reads are `wall clock + offset`. The offset defaults to zero and is shared by
/// every clone of the handle, so a gate, a tracker and a machine built from the
/// same `Clock` always agree on the current instant.
///
/// # Simulation
/// `set_offset_for_simulation`, `simulate_local_time`, `advance` and `reset_offset`
/// only exist with the `simulation` feature (enabled for tests and the driver
/// binary). A build without it always reads the wall clock.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    offset_ns: Arc<AtomicI64>,
}

impl Clock {
    pub fn system() -> Self {
        Self::default()
    }

    /// Local wall-clock time, offset applied.
    pub fn now(&self) -> NaiveDateTime {
        Local::now().naive_local() + self.offset()
    }

    /// Same instant as `now`, as UTC. Used for timestamps handed to the host.
    pub fn now_utc(&self) -> DateTime<Utc> {
        Utc::now() + self.offset()
    }

    pub fn hour_of_day(&self) -> u32 {
        self.now().hour()
    }

    pub fn offset(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.offset_ns.load(Ordering::Relaxed))
    }

    pub fn is_simulated(&self) -> bool {
        self.offset_ns.load(Ordering::Relaxed) != 0
    }

    #[cfg(any(test, feature = "simulation"))]
    pub fn set_offset_for_simulation(&self, delta: TimeDelta) {
        // i64 nanoseconds covers roughly +/- 292 years
        let ns = delta.num_nanoseconds().unwrap_or(if delta < TimeDelta::zero() {
            i64::MIN
        } else {
            i64::MAX
        });
        let previous = self.offset_ns.swap(ns, Ordering::Relaxed);
        if previous == 0 && ns != 0 {
            warn!("Clock offset enabled for simulation: {}s", delta.num_seconds());
        } else {
            debug!("Clock offset now {}s", delta.num_seconds());
        }
    }

    #[cfg(any(test, feature = "simulation"))]
    /// Shifts the offset so that `now()` reads `at` (plus whatever real time
    /// elapses after this call).
    pub fn simulate_local_time(&self, at: NaiveDateTime) {
        let delta = at - Local::now().naive_local();
        self.set_offset_for_simulation(delta);
    }

    #[cfg(any(test, feature = "simulation"))]
    /// Moves simulated time forward (or back, for a negative delta) from where it is now.
    pub fn advance(&self, delta: TimeDelta) {
        self.set_offset_for_simulation(self.offset() + delta);
    }

    #[cfg(any(test, feature = "simulation"))]
    pub fn reset_offset(&self) {
        if self.is_simulated() {
            info!("Clock offset cleared");
        }
        self.offset_ns.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn simulated_time_is_never_before_target() {
        let clock = Clock::system();
        let today = Local::now().date_naive();
        let target = today.and_time(NaiveTime::from_hms_opt(11, 0, 0).unwrap());

        clock.simulate_local_time(target);
        let now = clock.now();
        assert!(now >= target);
        assert!(now - target < TimeDelta::seconds(1));
        assert_eq!(clock.hour_of_day(), 11);
    }

    #[test]
    fn clones_share_offset() {
        let a = Clock::system();
        let b = a.clone();
        a.set_offset_for_simulation(TimeDelta::hours(3));
        assert_eq!(b.offset(), TimeDelta::hours(3));

        b.reset_offset();
        assert!(!a.is_simulated());
    }

    #[test]
    fn advance_accumulates() {
        let clock = Clock::system();
        clock.advance(TimeDelta::minutes(30));
        clock.advance(TimeDelta::minutes(45));
        assert_eq!(clock.offset(), TimeDelta::minutes(75));
    }

    #[test]
    fn tick_advances_frame() {
        let t = Tick::new().next().next();
        assert_eq!(t.frame, 2);
    }
}

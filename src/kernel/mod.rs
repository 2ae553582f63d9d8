//! Ritual kernel.
//!
//! - `time`: `Clock` (wall clock + simulation offset) and the host `Tick`.
//! - `window` / `boundary`: when the ritual is unlockable, when a new day began.
//! - `state` / `machine`: the phase reducer and its single owner.
//! - `scheduler`: budgeted, cooperative execution of long computations.
//! - `reactor`: thin host adapter composing the above.

pub mod boundary;
pub mod error;
pub mod event;
pub mod machine;
pub mod phase;
pub mod reactor;
pub mod scheduler;
pub mod state;
pub mod telemetry;
pub mod time;
pub mod window;

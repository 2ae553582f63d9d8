pub mod config;
pub mod kernel;

// Re-export the kernel surface for hosts
pub use config::RitualConfig;
pub use kernel::boundary::BoundaryTracker;
pub use kernel::error::{SchedulerError, TransitionError};
pub use kernel::event::{HostSignal, SideEffect};
pub use kernel::machine::{Outcome, Subscription, WorkflowMachine};
pub use kernel::phase::{InteractionSignal, Phase};
pub use kernel::reactor::Reactor;
pub use kernel::scheduler::{CooperativeScheduler, Step, WorkUnit};
pub use kernel::state::{Candidate, Command, WorkflowState};
pub use kernel::time::Clock;
pub use kernel::window::{TimeWindowGate, WindowCheckResult};

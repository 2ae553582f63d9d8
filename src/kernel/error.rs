use super::phase::Phase;

/// Precondition violations. State is never mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot enter ritual with an empty candidate set")]
    EmptyCandidates,

    #[error("{command} is not legal from phase {phase:?}")]
    IllegalSource { command: &'static str, phase: Phase },

    #[error("candidate '{id}' is not part of the current ritual")]
    UnknownCandidate { id: String },

    #[error("phase {phase:?} cannot be entered through advance_to")]
    NotNavigational { phase: Phase },

    #[error("the ritual window is locked")]
    WindowLocked,
}

/// Failures surfaced by `CooperativeScheduler` runs.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("work unit '{label}' failed after {steps} steps")]
    WorkFailed {
        label: String,
        steps: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("work unit '{label}' was cancelled")]
    Cancelled { label: String },
}

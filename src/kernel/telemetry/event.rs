use serde::Serialize;

use crate::kernel::phase::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TelemetryEvent {
    Transition {
        from: Phase,
        to: Phase,
        revision: u64,
    },

    /// Precondition violation; state unchanged.
    Rejected {
        command: &'static str,
        phase: Phase,
    },

    /// Ritual-only command outside the ritual; silently dropped.
    Ignored {
        command: &'static str,
        phase: Phase,
    },

    Sealed {
        candidate_id: String,
    },

    SafetyTriggered {
        from: Phase,
    },
}

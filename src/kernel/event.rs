use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::Candidate;

/// Work the kernel asks the host to perform. The kernel never performs it itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SideEffect {
    /// A candidate was sealed. The host records it (inventory, remote sync).
    /// `seal_id` is unique per seal so recorders can deduplicate retries.
    RitualSealed {
        seal_id: Uuid,
        candidate: Candidate,
        sealed_at: DateTime<Utc>,
    },
}

/// Signals the reactor raises for the host on a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostSignal {
    /// A new ritual day started; the machine was reset to Home.
    DayBegan,
    WindowOpened { minutes_remaining: u32 },
    WindowClosed,
    Effect(SideEffect),
}

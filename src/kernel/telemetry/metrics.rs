use std::collections::{HashMap, VecDeque};

use super::event::TelemetryEvent;
use crate::kernel::phase::Phase;

#[derive(Debug, Clone, Default)]
pub struct WorkflowMetrics {
    pub transitions: u64,
    pub rejections: u64,
    pub ignored: u64,
    pub seals: u64,
    pub safety_triggers: u64,
    /// How many times each phase was entered (self-transitions included).
    pub phase_entries: HashMap<Phase, u64>,
}

impl WorkflowMetrics {
    pub fn entries(&self, phase: Phase) -> u64 {
        self.phase_entries.get(&phase).copied().unwrap_or(0)
    }
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> WorkflowMetrics {
    let mut snap = WorkflowMetrics::default();

    for event in events {
        match event {
            TelemetryEvent::Transition { to, .. } => {
                snap.transitions += 1;
                *snap.phase_entries.entry(*to).or_insert(0) += 1;
            }
            TelemetryEvent::Rejected { .. } => snap.rejections += 1,
            TelemetryEvent::Ignored { .. } => snap.ignored += 1,
            TelemetryEvent::Sealed { .. } => snap.seals += 1,
            TelemetryEvent::SafetyTriggered { .. } => snap.safety_triggers += 1,
        }
    }

    snap
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::TransitionError;
use super::phase::{InteractionSignal, Phase};

/// A choice shown during the ritual. Opaque to the kernel apart from its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl Candidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            meta: serde_json::Value::Null,
        }
    }

    pub fn with_meta(id: impl Into<String>, meta: serde_json::Value) -> Self {
        Self { id: id.into(), meta }
    }
}

/// Immutable snapshot of the workflow. Replaced wholesale on every transition.
///
/// `active_index` is only meaningful in `Ritual`, `locked_id` only in `Seal`.
/// `mood` and `active_category` are pass-through fields with no transition rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub phase: Phase,
    pub candidates: Vec<Candidate>,
    pub active_index: usize,
    pub locked_id: Option<String>,
    pub last_seal_timestamp: Option<DateTime<Utc>>,
    pub interaction_signal: InteractionSignal,
    pub mood: f32,
    pub active_category: Option<String>,
    /// Increments on every applied transition.
    pub revision: u64,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            phase: Phase::Void,
            candidates: Vec::new(),
            active_index: 0,
            locked_id: None,
            last_seal_timestamp: None,
            interaction_signal: InteractionSignal::None,
            mood: 0.5,
            active_category: None,
            revision: 0,
        }
    }
}

impl WorkflowState {
    /// Candidate under the cursor, if the ritual is running and the index is in range.
    pub fn active_candidate(&self) -> Option<&Candidate> {
        if self.phase != Phase::Ritual {
            return None;
        }
        self.candidates.get(self.active_index)
    }

    pub fn locked_candidate(&self) -> Option<&Candidate> {
        let id = self.locked_id.as_deref()?;
        self.candidates.iter().find(|c| c.id == id)
    }

    /// Fresh state in `phase`, keeping only what survives a reset.
    fn cleared(&self, phase: Phase) -> Self {
        Self {
            phase,
            candidates: Vec::new(),
            active_index: 0,
            locked_id: None,
            last_seal_timestamp: self.last_seal_timestamp,
            interaction_signal: InteractionSignal::None,
            mood: self.mood,
            active_category: self.active_category.clone(),
            revision: self.revision,
        }
    }
}

/// Every way the workflow can change. `transition` is the only reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AdvanceTo(Phase),
    EnterRitual {
        candidates: Vec<Candidate>,
        start_index: usize,
    },
    UpdateCandidates(Vec<Candidate>),
    SetActiveIndex(usize),
    SetInteractionSignal(InteractionSignal),
    Seal {
        candidate_id: String,
    },
    TriggerSafety,
    ResetToVoid,
    ResetToHome,
    SetMood(f32),
    SetActiveCategory(Option<String>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AdvanceTo(_) => "advance_to",
            Command::EnterRitual { .. } => "enter_ritual",
            Command::UpdateCandidates(_) => "update_candidates",
            Command::SetActiveIndex(_) => "set_active_index",
            Command::SetInteractionSignal(_) => "set_interaction_signal",
            Command::Seal { .. } => "seal",
            Command::TriggerSafety => "trigger_safety",
            Command::ResetToVoid => "reset_to_void",
            Command::ResetToHome => "reset_to_home",
            Command::SetMood(_) => "set_mood",
            Command::SetActiveCategory(_) => "set_active_category",
        }
    }
}

/// Pure reduction: (State, Command) -> next State.
///
/// - `Ok(Some(next))`: applied; `next.revision` is already bumped.
/// - `Ok(None)`: ignored command (a ritual-only update arriving outside `Ritual`).
/// - `Err(_)`: precondition violation; `state` stays as it was.
pub fn transition(
    state: &WorkflowState,
    command: Command,
    now: DateTime<Utc>,
) -> Result<Option<WorkflowState>, TransitionError> {
    let in_ritual = state.phase == Phase::Ritual;

    let mut next = match command {
        Command::AdvanceTo(phase) => {
            if !phase.is_navigational() {
                return Err(TransitionError::NotNavigational { phase });
            }
            state.cleared(phase)
        }
        Command::EnterRitual {
            candidates,
            start_index,
        } => {
            if candidates.is_empty() {
                return Err(TransitionError::EmptyCandidates);
            }
            let mut next = state.cleared(Phase::Ritual);
            next.candidates = candidates;
            next.active_index = start_index;
            next
        }
        Command::UpdateCandidates(candidates) => {
            if !in_ritual {
                return Ok(None);
            }
            WorkflowState {
                candidates,
                ..state.clone()
            }
        }
        Command::SetActiveIndex(index) => {
            if !in_ritual {
                return Ok(None);
            }
            WorkflowState {
                active_index: index,
                ..state.clone()
            }
        }
        Command::SetInteractionSignal(signal) => {
            if !in_ritual {
                return Ok(None);
            }
            WorkflowState {
                interaction_signal: signal,
                ..state.clone()
            }
        }
        Command::Seal { candidate_id } => {
            if !in_ritual {
                return Err(TransitionError::IllegalSource {
                    command: "seal",
                    phase: state.phase,
                });
            }
            if !state.candidates.iter().any(|c| c.id == candidate_id) {
                return Err(TransitionError::UnknownCandidate { id: candidate_id });
            }
            WorkflowState {
                phase: Phase::Seal,
                locked_id: Some(candidate_id),
                last_seal_timestamp: Some(now),
                interaction_signal: InteractionSignal::None,
                ..state.clone()
            }
        }
        Command::TriggerSafety => state.cleared(Phase::Safety),
        Command::ResetToVoid => state.cleared(Phase::Void),
        Command::ResetToHome => state.cleared(Phase::Home),
        Command::SetMood(mood) => WorkflowState {
            mood: if mood.is_nan() { state.mood } else { mood.clamp(0.0, 1.0) },
            ..state.clone()
        },
        Command::SetActiveCategory(category) => WorkflowState {
            active_category: category,
            ..state.clone()
        },
    };

    next.revision = state.revision + 1;
    Ok(Some(next))
}

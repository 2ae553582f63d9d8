use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::TransitionError;
use super::event::SideEffect;
use super::phase::{InteractionSignal, Phase};
use super::state::{transition, Candidate, Command, WorkflowState};
use super::telemetry::event::TelemetryEvent;
use super::telemetry::recorder::TelemetryRecorder;
use super::time::Clock;
use crate::config::RitualConfig;

pub type Listener = Box<dyn FnMut(&WorkflowState) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Handle returned by `subscribe`. Cloneable; `unsubscribe` may be called from
/// anywhere, including from inside a listener while notifications are running.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriptionId,
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

struct Slot {
    id: SubscriptionId,
    active: Arc<AtomicBool>,
    listener: Listener,
}

/// What happened to a command that did not violate a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Ritual-only update outside the ritual. Normal for late async results.
    Ignored,
}

/// Sole authority over the ritual phase and its payload.
///
/// Every change goes through `dispatch`, which runs the pure `transition`
/// reducer, swaps in the new snapshot and notifies subscribers synchronously in
/// subscription order. Listeners only ever see `&WorkflowState`, so they cannot
/// re-enter a mutating call.
pub struct WorkflowMachine {
    state: WorkflowState,
    listeners: Vec<Slot>,
    next_subscription: u64,
    effects: Vec<SideEffect>,
    clock: Clock,
    pub telemetry: TelemetryRecorder,
}

impl Default for WorkflowMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowMachine {
    pub fn new() -> Self {
        Self::with_clock(Clock::system())
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            state: WorkflowState::default(),
            listeners: Vec::new(),
            next_subscription: 0,
            effects: Vec::new(),
            clock,
            telemetry: TelemetryRecorder::new(),
        }
    }

    pub fn from_config(config: &RitualConfig, clock: Clock) -> Self {
        let mut machine = Self::with_clock(clock);
        machine.telemetry = TelemetryRecorder::with_capacity(config.telemetry_capacity);
        machine
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self) -> WorkflowState {
        self.state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, TransitionError> {
        let name = command.name();
        let is_safety = matches!(command, Command::TriggerSafety);
        let from = self.state.phase;

        let next = match transition(&self.state, command, self.clock.now_utc()) {
            Ok(Some(next)) => next,
            Ok(None) => {
                debug!("Ignored {} in {:?}", name, from);
                self.telemetry.record(TelemetryEvent::Ignored {
                    command: name,
                    phase: from,
                });
                return Ok(Outcome::Ignored);
            }
            Err(e) => {
                warn!("Rejected {} in {:?}: {}", name, from, e);
                self.telemetry.record(TelemetryEvent::Rejected {
                    command: name,
                    phase: from,
                });
                return Err(e);
            }
        };

        debug!("{}: {:?} -> {:?} (rev {})", name, from, next.phase, next.revision);
        self.telemetry.record(TelemetryEvent::Transition {
            from,
            to: next.phase,
            revision: next.revision,
        });

        match next.phase {
            Phase::Seal if from == Phase::Ritual => self.queue_seal_effect(&next),
            Phase::Safety if is_safety => {
                info!("Safety triggered from {:?}", from);
                self.telemetry.record(TelemetryEvent::SafetyTriggered { from });
            }
            _ => {}
        }

        self.state = next;
        self.notify();
        Ok(Outcome::Applied)
    }

    fn queue_seal_effect(&mut self, sealed: &WorkflowState) {
        let (Some(candidate), Some(sealed_at)) =
            (sealed.locked_candidate(), sealed.last_seal_timestamp)
        else {
            return;
        };
        info!("Ritual sealed on candidate '{}'", candidate.id);
        self.telemetry.record(TelemetryEvent::Sealed {
            candidate_id: candidate.id.clone(),
        });
        self.effects.push(SideEffect::RitualSealed {
            seal_id: Uuid::new_v4(),
            candidate: candidate.clone(),
            sealed_at,
        });
    }

    fn notify(&mut self) {
        for slot in self.listeners.iter_mut() {
            // re-checked per slot: an earlier listener may have unsubscribed a later one
            if slot.active.load(Ordering::Acquire) {
                (slot.listener)(&self.state);
            }
        }
        self.listeners.retain(|slot| slot.active.load(Ordering::Acquire));
    }

    // Commands that never return Err.
    fn dispatch_infallible(&mut self, command: Command) -> Outcome {
        match self.dispatch(command) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Unexpected rejection swallowed: {}", e);
                debug_assert!(false, "infallible command rejected: {e}");
                Outcome::Ignored
            }
        }
    }

    // === Navigation ===

    pub fn advance_to(&mut self, phase: Phase) -> Result<(), TransitionError> {
        self.dispatch(Command::AdvanceTo(phase)).map(|_| ())
    }

    pub fn reset_to_void(&mut self) {
        info!("Workflow reset to Void");
        self.dispatch_infallible(Command::ResetToVoid);
    }

    pub fn reset_to_home(&mut self) {
        info!("Workflow reset to Home");
        self.dispatch_infallible(Command::ResetToHome);
    }

    /// Universal escape hatch. Legal from every phase, including Safety itself.
    pub fn trigger_safety(&mut self) {
        self.dispatch_infallible(Command::TriggerSafety);
    }

    // === Ritual ===

    pub fn enter_ritual(
        &mut self,
        candidates: Vec<Candidate>,
        start_index: usize,
    ) -> Result<(), TransitionError> {
        self.dispatch(Command::EnterRitual {
            candidates,
            start_index,
        })
        .map(|_| ())
    }

    pub fn update_candidates(&mut self, candidates: Vec<Candidate>) -> Outcome {
        self.dispatch_infallible(Command::UpdateCandidates(candidates))
    }

    /// Out-of-range indices are stored as given; `active_candidate()` then yields `None`.
    pub fn set_active_index(&mut self, index: usize) -> Outcome {
        self.dispatch_infallible(Command::SetActiveIndex(index))
    }

    pub fn set_interaction_signal(&mut self, signal: InteractionSignal) -> Outcome {
        self.dispatch_infallible(Command::SetInteractionSignal(signal))
    }

    /// Commits to `candidate_id` and queues a `RitualSealed` effect.
    /// Only legal in `Ritual`, and only for a candidate currently on offer.
    pub fn seal(&mut self, candidate_id: impl Into<String>) -> Result<(), TransitionError> {
        self.dispatch(Command::Seal {
            candidate_id: candidate_id.into(),
        })
        .map(|_| ())
    }

    // === Auxiliary pass-through ===

    pub fn set_mood(&mut self, mood: f32) {
        self.dispatch_infallible(Command::SetMood(mood));
    }

    pub fn set_active_category(&mut self, category: Option<String>) {
        self.dispatch_infallible(Command::SetActiveCategory(category));
    }

    // === Observers ===

    /// Registers `listener`, calls it once with the current state, then again
    /// after every applied transition until unsubscribed.
    pub fn subscribe<F>(&mut self, mut listener: F) -> Subscription
    where
        F: FnMut(&WorkflowState) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        let active = Arc::new(AtomicBool::new(true));

        listener(&self.state);
        self.listeners.push(Slot {
            id,
            active: active.clone(),
            listener: Box::new(listener),
        });
        debug!("Subscriber {:?} registered", id);

        Subscription { id, active }
    }

    /// Removes a subscriber by id. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|slot| {
            if slot.id == id {
                slot.active.store(false, Ordering::Release);
                false
            } else {
                true
            }
        });
        before != self.listeners.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .iter()
            .filter(|slot| slot.active.load(Ordering::Acquire))
            .count()
    }

    // === Side effects ===

    pub fn pending_effects(&self) -> &[SideEffect] {
        &self.effects
    }

    /// Hands queued effects to the host, oldest first.
    pub fn drain_effects(&mut self) -> Vec<SideEffect> {
        std::mem::take(&mut self.effects)
    }
}

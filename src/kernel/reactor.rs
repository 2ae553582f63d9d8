use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::boundary::BoundaryTracker;
use super::error::TransitionError;
use super::event::HostSignal;
use super::machine::WorkflowMachine;
use super::scheduler::{CooperativeScheduler, WorkUnit};
use super::state::Candidate;
use super::time::{Clock, Tick, TICK_MS};
use super::window::TimeWindowGate;
use crate::config::{ConfigError, RitualConfig};

/// Thin host adapter: polls the gate and the day boundary once per tick and
/// forwards machine side effects to the host.
pub struct Reactor {
    pub gate: TimeWindowGate,
    pub tracker: BoundaryTracker,
    pub machine: WorkflowMachine,
    pub scheduler: CooperativeScheduler,
    pub tick: Tick,
    window_open: Option<bool>,
}

impl Reactor {
    pub fn new(config: &RitualConfig, clock: Clock) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            gate: TimeWindowGate::with_window(clock.clone(), &config.window),
            tracker: BoundaryTracker::with_boundary_hour(clock.clone(), config.window.start_hour)?,
            machine: WorkflowMachine::from_config(config, clock),
            scheduler: CooperativeScheduler::from_config(&config.scheduler),
            tick: Tick::new(),
            window_open: None,
        })
    }

    /// One synchronous host step. Never awaits.
    ///
    /// The boundary tracker is consulted exactly once per step, so a new day is
    /// reported once and the machine is reset to Home once.
    pub fn tick_step(&mut self) -> Vec<HostSignal> {
        self.tick = self.tick.next();
        let mut signals = Vec::new();

        if self.tracker.has_crossed_boundary() {
            self.machine.reset_to_home();
            signals.push(HostSignal::DayBegan);
        }

        let check = self.gate.check();
        if self.window_open != Some(check.is_open) {
            self.window_open = Some(check.is_open);
            signals.push(if check.is_open {
                HostSignal::WindowOpened {
                    minutes_remaining: check.minutes_remaining,
                }
            } else {
                HostSignal::WindowClosed
            });
        }

        signals.extend(self.machine.drain_effects().into_iter().map(HostSignal::Effect));
        signals
    }

    /// Enters the ritual if the window is open.
    pub fn open_ritual(&mut self, candidates: Vec<Candidate>) -> Result<(), TransitionError> {
        if self.gate.is_locked() {
            return Err(TransitionError::WindowLocked);
        }
        self.machine.enter_ritual(candidates, 0)
    }

    /// Generates candidates on the scheduler, then opens the ritual with them.
    pub async fn prepare_ritual<W>(&mut self, work: W) -> anyhow::Result<()>
    where
        W: WorkUnit<Output = Vec<Candidate>>,
    {
        if self.gate.is_locked() {
            return Err(TransitionError::WindowLocked.into());
        }
        let candidates = self.scheduler.run("candidate-generation", work).await?;
        self.open_ritual(candidates)?;
        Ok(())
    }

    /// Async driver loop. Runs `tick_step` every `TICK_MS` until `cancel` fires.
    pub async fn run<F>(&mut self, cancel: CancellationToken, mut on_signal: F)
    where
        F: FnMut(&mut WorkflowMachine, HostSignal),
    {
        info!("Reactor started. Tick: {}ms", TICK_MS);

        let mut cadence = interval(Duration::from_millis(TICK_MS));
        cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Reactor stopped at tick {}", self.tick.frame);
                    break;
                }
                _ = cadence.tick() => {
                    for signal in self.tick_step() {
                        on_signal(&mut self.machine, signal);
                    }
                }
            }
        }
    }
}

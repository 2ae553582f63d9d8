use std::time::{Duration, Instant};

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::error::SchedulerError;
use crate::config::{SchedulerConfig, DEFAULT_BUDGET_MS};

/// One pull from a work unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// More work remains.
    Pending,
    /// Finished. The unit must not be pulled again.
    Done(T),
}

/// A finite, non-restartable, pull-based computation.
///
/// `step` should do a small amount of work: the budget is only checked between
/// steps, never during one.
pub trait WorkUnit {
    type Output;

    fn step(&mut self) -> anyhow::Result<Step<Self::Output>>;
}

/// Work unit backed by a closure.
pub struct FromFn<F>(F);

pub fn from_fn<T, F>(f: F) -> FromFn<F>
where
    F: FnMut() -> anyhow::Result<Step<T>>,
{
    FromFn(f)
}

impl<T, F> WorkUnit for FromFn<F>
where
    F: FnMut() -> anyhow::Result<Step<T>>,
{
    type Output = T;

    fn step(&mut self) -> anyhow::Result<Step<T>> {
        (self.0)()
    }
}

/// Folds one iterator item per step into an accumulator.
pub struct Fold<I, A, F> {
    iter: I,
    acc: Option<A>,
    f: F,
}

pub fn fold<I, A, F>(iter: I, init: A, f: F) -> Fold<I::IntoIter, A, F>
where
    I: IntoIterator,
    F: FnMut(A, I::Item) -> anyhow::Result<A>,
{
    Fold {
        iter: iter.into_iter(),
        acc: Some(init),
        f,
    }
}

impl<I, A, F> WorkUnit for Fold<I, A, F>
where
    I: Iterator,
    F: FnMut(A, I::Item) -> anyhow::Result<A>,
{
    type Output = A;

    fn step(&mut self) -> anyhow::Result<Step<A>> {
        let acc = self
            .acc
            .take()
            .ok_or_else(|| anyhow!("fold pulled after completion or failure"))?;
        match self.iter.next() {
            Some(item) => {
                self.acc = Some((self.f)(acc, item)?);
                Ok(Step::Pending)
            }
            None => Ok(Step::Done(acc)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport<T> {
    pub value: T,
    /// Pulls that returned `Pending`.
    pub steps: u64,
    /// Number of times the run was resumed after yielding to the host.
    pub slices: u64,
    pub elapsed: Duration,
}

/// Runs work units in budgeted slices, yielding to the host runtime between
/// slices so a single thread stays responsive.
///
/// The budget is static and advisory. Concurrent runs do not share it.
#[derive(Debug, Clone, Copy)]
pub struct CooperativeScheduler {
    budget: Duration,
}

impl Default for CooperativeScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_BUDGET_MS))
    }
}

impl CooperativeScheduler {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(Duration::from_millis(config.budget_ms))
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub async fn run<W: WorkUnit>(&self, label: &str, work: W) -> Result<W::Output, SchedulerError> {
        self.drive(label, work, None).await.map(|report| report.value)
    }

    pub async fn run_with_report<W: WorkUnit>(
        &self,
        label: &str,
        work: W,
    ) -> Result<RunReport<W::Output>, SchedulerError> {
        self.drive(label, work, None).await
    }

    /// Like `run`, but stops between steps once `cancel` fires.
    pub async fn run_with_cancel<W: WorkUnit>(
        &self,
        label: &str,
        work: W,
        cancel: &CancellationToken,
    ) -> Result<W::Output, SchedulerError> {
        self.drive(label, work, Some(cancel))
            .await
            .map(|report| report.value)
    }

    async fn drive<W: WorkUnit>(
        &self,
        label: &str,
        mut work: W,
        cancel: Option<&CancellationToken>,
    ) -> Result<RunReport<W::Output>, SchedulerError> {
        let started = Instant::now();
        let mut steps: u64 = 0;
        let mut slices: u64 = 0;
        let cancelled = || cancel.is_some_and(|c| c.is_cancelled());

        loop {
            // The first slice also waits: the caller's tick finishes before any work runs.
            tokio::task::yield_now().await;
            slices += 1;
            let slice_started = Instant::now();
            let slice_first_step = steps;

            loop {
                if cancelled() {
                    info!("'{}' cancelled after {} steps", label, steps);
                    return Err(SchedulerError::Cancelled {
                        label: label.to_string(),
                    });
                }

                match work.step() {
                    Ok(Step::Pending) => steps += 1,
                    Ok(Step::Done(value)) => {
                        let elapsed = started.elapsed();
                        info!(
                            "'{}' completed: {} steps in {} slices ({:?})",
                            label, steps, slices, elapsed
                        );
                        return Ok(RunReport {
                            value,
                            steps,
                            slices,
                            elapsed,
                        });
                    }
                    Err(e) => {
                        return Err(SchedulerError::WorkFailed {
                            label: label.to_string(),
                            steps,
                            source: e.into(),
                        });
                    }
                }

                if slice_started.elapsed() >= self.budget {
                    break;
                }
            }

            debug!(
                "'{}' slice {} used budget after {} steps",
                label,
                slices,
                steps - slice_first_step
            );
        }
    }
}

//! The tick scheduler: a cancellable periodic trigger.
//!
//! The scheduler owns no game data. While running it holds the handle of a
//! tokio task that calls an emit callback once per period with the current
//! *generation*. Every start bumps the generation and every stop aborts the
//! task, so a tick that was already queued when the scheduler stopped
//! carries a generation [`Scheduler::accepts`] refuses. That refusal is what
//! guarantees no late tick is applied after `STOP_TICK`.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Periodic trigger for scheduled ticks.
#[derive(Debug)]
pub struct Scheduler {
    /// Time between ticks.
    period: Duration,
    /// Incremented on every start; stamps each emitted tick.
    generation: u64,
    /// The running timer task, if any.
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Create a stopped scheduler that will tick every `period`.
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            handle: None,
        }
    }

    /// The configured tick period.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// The generation stamped on ticks from the current (or last) run.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a timer task is active.
    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether a tick stamped with `generation` may still be applied.
    pub fn accepts(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }

    /// Begin emitting ticks. Does nothing if already running.
    ///
    /// The first tick fires one full period after the call. `emit` returns
    /// `false` once its receiver is gone, which ends the task. Outside a
    /// tokio runtime no task can be spawned; the scheduler stays stopped and
    /// ticks must be dispatched by hand.
    ///
    /// Returns whether a timer task is running after the call.
    pub fn start<F>(&mut self, emit: F) -> bool
    where
        F: Fn(u64) -> bool + Send + 'static,
    {
        if self.is_running() {
            return true;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime; scheduled ticks are disabled");
            return false;
        };

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let period = self.period;

        self.handle = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !emit(generation) {
                    break;
                }
            }
        }));

        info!(
            generation,
            period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "Tick scheduler started"
        );
        true
    }

    /// Cancel the timer. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!(generation = self.generation, "Tick scheduler stopped");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

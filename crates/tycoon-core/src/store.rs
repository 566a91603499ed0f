//! The dispatch host: owns the current state and serializes every action.
//!
//! All state changes go through [`Store::dispatch`], one action at a time.
//! The store is the only place effects happen: it keeps the [`Scheduler`]
//! in step with the state's scheduler flag, notifies observers, and
//! publishes each settled snapshot on a [`watch`] channel.
//!
//! # Observers
//!
//! Event and game-over collaborators implement [`Observer`]. After a root
//! action has been reduced, every observer sees the resulting snapshot once,
//! in registration order. The actions they return are applied afterwards,
//! in order, and do not re-trigger observers; the collaborators see their
//! effects with the next root action.
//!
//! # Async use
//!
//! [`Store::run`] drives the store from a single tokio task, consuming an
//! inbox fed by [`StoreHandle`]s and by the scheduler. Scheduled ticks carry
//! the scheduler generation that produced them and are discarded unless that
//! generation is still running. The run loop returns on [`StoreHandle::shutdown`]
//! or once every handle has been dropped; the timer holds only a weak sender
//! and never keeps the inbox open on its own.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};
use tycoon_types::{Action, GameState, SchedulerState};

use crate::invariants;
use crate::reducer::{Outcome, Reducer};
use crate::scheduler::Scheduler;

/// A collaborator that reacts to settled states.
pub trait Observer: Send {
    /// Inspect a settled state and return any actions to dispatch.
    fn observe(&mut self, state: &GameState) -> Vec<Action>;
}

/// Errors returned by [`StoreHandle`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store task has stopped and no longer accepts messages.
    #[error("store is no longer running")]
    Closed,
}

/// Messages consumed by [`Store::run`].
#[derive(Debug)]
enum Envelope {
    /// An action from a client or collaborator.
    Dispatch(Action),
    /// A tick from the scheduler run with the given generation.
    ScheduledTick { generation: u64 },
    /// Leave the run loop.
    Shutdown,
}

/// Cloneable client side of a running store.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    inbox: mpsc::UnboundedSender<Envelope>,
    snapshots: watch::Receiver<Arc<GameState>>,
}

impl StoreHandle {
    /// Queue an action. Actions are applied in the order they are queued.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Closed`] if the store has shut down.
    pub fn dispatch(&self, action: Action) -> Result<(), StoreError> {
        self.inbox
            .send(Envelope::Dispatch(action))
            .map_err(|_closed| StoreError::Closed)
    }

    /// Ask the run loop to exit after the actions already queued.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Closed`] if the store has shut down.
    pub fn shutdown(&self) -> Result<(), StoreError> {
        self.inbox
            .send(Envelope::Shutdown)
            .map_err(|_closed| StoreError::Closed)
    }

    /// A receiver that yields every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<GameState>> {
        self.snapshots.clone()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<GameState> {
        Arc::clone(&self.snapshots.borrow())
    }
}

/// Owner of the live game state.
pub struct Store {
    reducer: Reducer,
    state: Arc<GameState>,
    scheduler: Scheduler,
    observers: Vec<Box<dyn Observer>>,
    /// Strong sender used to mint handles. Released when the run loop starts.
    inbox_tx: mpsc::UnboundedSender<Envelope>,
    /// Sender for scheduled ticks.
    inbox_weak: mpsc::WeakUnboundedSender<Envelope>,
    inbox_rx: mpsc::UnboundedReceiver<Envelope>,
    snapshot_tx: watch::Sender<Arc<GameState>>,
}

impl Store {
    /// Create a store holding the reducer's initial state.
    pub fn new(reducer: Reducer) -> Self {
        let state = Arc::new(reducer.initial_state());
        let period = std::time::Duration::from_millis(reducer.config().ms_per_tick);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _initial_rx) = watch::channel(Arc::clone(&state));
        let inbox_weak = inbox_tx.downgrade();
        Self {
            reducer,
            state,
            scheduler: Scheduler::new(period),
            observers: Vec::new(),
            inbox_tx,
            inbox_weak,
            inbox_rx,
            snapshot_tx,
        }
    }

    /// A client handle for queuing actions and reading snapshots.
    pub fn handle(&self) -> StoreHandle {
        StoreHandle {
            inbox: self.inbox_tx.clone(),
            snapshots: self.snapshot_tx.subscribe(),
        }
    }

    /// Register a collaborator. Observers run in registration order.
    pub fn register<O>(&mut self, observer: O)
    where
        O: Observer + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// The current state.
    pub const fn state(&self) -> &Arc<GameState> {
        &self.state
    }

    /// The reducer this store applies.
    pub const fn reducer(&self) -> &Reducer {
        &self.reducer
    }

    /// Apply an action, run observers, and publish the settled snapshot.
    ///
    /// Returns the outcome of `action` itself.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        let outcome = self.apply(&action);

        let settled = Arc::clone(&self.state);
        let follow_ups: Vec<Action> = self
            .observers
            .iter_mut()
            .flat_map(|observer| observer.observe(&settled))
            .collect();
        for follow_up in &follow_ups {
            let _ = self.apply(follow_up);
        }

        self.snapshot_tx.send_replace(Arc::clone(&self.state));
        outcome
    }

    /// Consume the inbox until shutdown or until every [`StoreHandle`] is
    /// gone. The scheduler is stopped on exit. Returns the final state.
    pub async fn run(mut self) -> Arc<GameState> {
        info!(
            ms_per_tick = self.reducer.config().ms_per_tick,
            "Store running"
        );

        // From here on only handles keep the inbox open.
        let (detached, _unused_rx) = mpsc::unbounded_channel();
        drop(std::mem::replace(&mut self.inbox_tx, detached));

        while let Some(envelope) = self.inbox_rx.recv().await {
            if self.handle_envelope(envelope).is_break() {
                break;
            }
        }
        if self.state.scheduler.is_running() {
            let _ = self.dispatch(Action::StopTick);
        }
        self.scheduler.stop();
        info!(tick = self.state.tick, "Store stopped");
        Arc::clone(&self.state)
    }

    fn handle_envelope(&mut self, envelope: Envelope) -> ControlFlow<()> {
        match envelope {
            Envelope::Dispatch(action) => {
                let _ = self.dispatch(action);
            }
            Envelope::ScheduledTick { generation } => {
                if self.scheduler.accepts(generation) && self.state.scheduler.is_running() {
                    let _ = self.dispatch(Action::Tick);
                } else {
                    trace!(generation, "Discarding stale scheduled tick");
                }
            }
            Envelope::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn apply(&mut self, action: &Action) -> Outcome {
        let (mut next, outcome) = self.reducer.apply(&self.state, action);
        match &outcome {
            Outcome::Applied => {}
            Outcome::Rejected(reason) => {
                debug!(action = action.kind(), reason = %reason, "Action rejected");
                return outcome;
            }
            Outcome::Ignored => {
                trace!(action = action.kind(), "Action ignored");
                return outcome;
            }
        }

        next.scheduler = self.sync_scheduler(next.scheduler);

        if cfg!(debug_assertions) {
            let max_ticker = self.reducer.config().max_ticker_length;
            let violations = invariants::check_transition(&self.state, &next, action)
                .into_iter()
                .chain(invariants::check_state(&next, max_ticker));
            for violation in violations {
                warn!(action = action.kind(), violation = %violation, "Invariant violated");
            }
        }

        self.state = Arc::new(next);
        outcome
    }

    /// Bring the timer in line with `desired` and return the state it
    /// actually reached. A timer that cannot start leaves the game stopped.
    fn sync_scheduler(&mut self, desired: SchedulerState) -> SchedulerState {
        match (desired.is_running(), self.scheduler.is_running()) {
            (true, false) => {
                let inbox = self.inbox_weak.clone();
                let _ = self.scheduler.start(move |generation| {
                    inbox
                        .upgrade()
                        .is_some_and(|tx| tx.send(Envelope::ScheduledTick { generation }).is_ok())
                });
            }
            (false, true) => self.scheduler.stop(),
            _ => {}
        }
        if self.scheduler.is_running() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use rust_decimal::Decimal;

    use super::*;
    use crate::config::GameConfig;

    fn store() -> Store {
        Store::new(Reducer::new(GameConfig::default()).unwrap())
    }

    struct CountingObserver {
        calls: Arc<AtomicUsize>,
    }

    impl Observer for CountingObserver {
        fn observe(&mut self, _state: &GameState) -> Vec<Action> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        }
    }

    /// Announces the first tick once.
    struct Announcer {
        announced: bool,
    }

    impl Observer for Announcer {
        fn observe(&mut self, state: &GameState) -> Vec<Action> {
            if self.announced || state.tick == 0 {
                return Vec::new();
            }
            self.announced = true;
            vec![Action::AppendTicker {
                message: "The market opens".to_owned(),
            }]
        }
    }

    /// Ends the run when capital goes negative.
    struct Bankruptcy;

    impl Observer for Bankruptcy {
        fn observe(&mut self, state: &GameState) -> Vec<Action> {
            if state.capital < Decimal::ZERO && !state.is_over() {
                vec![Action::EndGame {
                    reason: "Bankrupt".to_owned(),
                }]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn dispatch_applies_actions_in_order() {
        let mut store = store();
        let outcome = store.dispatch(Action::IncrementLabor {
            name: "Bread".to_owned(),
            labor_change: 1,
        });
        assert_eq!(outcome, Outcome::Applied);
        let _ = store.dispatch(Action::Tick);

        let state = store.state();
        let bread = state.commodity("Bread").unwrap();
        assert_eq!(bread.labor_assigned, 1);
        assert_eq!(bread.num_sold, 10);
        assert_eq!(state.capital, Decimal::from(10_010_u32));
    }

    #[test]
    fn observers_run_once_per_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut store = store();
        store.register(Announcer { announced: false });
        store.register(CountingObserver {
            calls: Arc::clone(&calls),
        });

        let _ = store.dispatch(Action::Tick);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.state().ticker.first().map(String::as_str),
            Some("The market opens")
        );

        let _ = store.dispatch(Action::Tick);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.state().ticker.len(), 1);
    }

    #[test]
    fn observer_can_end_the_game() {
        let mut store = store();
        store.register(Bankruptcy);
        let _ = store.dispatch(Action::IncrementLabor {
            name: "Bread".to_owned(),
            labor_change: 10,
        });
        let _ = store.dispatch(Action::IncrementWages {
            wage_change: Decimal::from(5_000_u32),
        });
        let _ = store.dispatch(Action::Tick);

        let state = store.state();
        assert!(state.capital < Decimal::ZERO);
        assert_eq!(state.game_over.as_deref(), Some("Bankrupt"));
        assert_eq!(state.scheduler, SchedulerState::Stopped);

        let tick = state.tick;
        let outcome = store.dispatch(Action::Tick);
        assert!(matches!(outcome, Outcome::Rejected(_)));
        assert_eq!(store.state().tick, tick);
    }

    #[test]
    fn start_without_runtime_records_stopped() {
        let mut store = store();
        let handle = store.handle();
        let _ = store.dispatch(Action::StartTick);
        assert_eq!(store.state().scheduler, SchedulerState::Stopped);
        assert_eq!(handle.snapshot().scheduler, SchedulerState::Stopped);

        let _ = store.dispatch(Action::Tick);
        assert_eq!(store.state().tick, 1);
        assert_eq!(store.state().scheduler, SchedulerState::Stopped);
    }

    #[test]
    fn snapshots_are_published() {
        let mut store = store();
        let handle = store.handle();
        let _ = store.dispatch(Action::Tick);
        assert_eq!(handle.snapshot().tick, 1);
        assert!(Arc::ptr_eq(&handle.snapshot(), store.state()));
    }

    #[test]
    fn earlier_snapshots_are_never_mutated() {
        let mut store = store();
        let before = Arc::clone(store.state());
        let _ = store.dispatch(Action::Tick);
        assert_eq!(before.tick, 0);
        assert_eq!(store.state().tick, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_queued_before_stop_is_discarded() {
        let mut store = store();
        let _ = store.dispatch(Action::StartTick);
        let generation = store.scheduler.generation();
        let _ = store.dispatch(Action::StopTick);

        let _ = store.handle_envelope(Envelope::ScheduledTick { generation });
        assert_eq!(store.state().tick, 0);

        let _ = store.dispatch(Action::StartTick);
        let _ = store.handle_envelope(Envelope::ScheduledTick { generation });
        assert_eq!(store.state().tick, 0);

        let current = store.scheduler.generation();
        let _ = store.handle_envelope(Envelope::ScheduledTick {
            generation: current,
        });
        assert_eq!(store.state().tick, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_after_stop() {
        let store = store();
        let handle = store.handle();
        let mut snapshots = handle.subscribe();
        let task = tokio::spawn(store.run());

        handle.dispatch(Action::StartTick).unwrap();
        tokio::time::sleep(Duration::from_millis(1_250)).await;
        handle.dispatch(Action::StopTick).unwrap();
        handle.dispatch(Action::StopTick).unwrap();

        snapshots
            .wait_for(|s| !s.scheduler.is_running())
            .await
            .unwrap();
        let ticks_at_stop = snapshots.borrow().tick;
        assert!((1..=2).contains(&ticks_at_stop));

        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.shutdown().unwrap();
        let final_state = task.await.unwrap();
        assert_eq!(final_state.tick, ticks_at_stop);
        assert_eq!(final_state.scheduler, SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ends_when_every_handle_is_dropped() {
        let store = store();
        let handle = store.handle();
        let mut snapshots = handle.subscribe();
        let task = tokio::spawn(store.run());

        handle.dispatch(Action::StartTick).unwrap();
        snapshots
            .wait_for(|s| s.scheduler.is_running())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1_250)).await;
        drop(handle);

        let final_state = tokio::time::timeout(Duration::from_secs(60), task)
            .await
            .unwrap()
            .unwrap();
        assert!(final_state.tick >= 1);
        assert_eq!(final_state.scheduler, SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn handle_fails_after_shutdown() {
        let store = store();
        let handle = store.handle();
        let task = tokio::spawn(store.run());
        handle.shutdown().unwrap();
        let _ = task.await.unwrap();
        assert!(matches!(
            handle.dispatch(Action::Tick),
            Err(StoreError::Closed)
        ));
    }
}

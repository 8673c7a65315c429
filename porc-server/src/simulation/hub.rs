//! SimulationHub: fan-out of simulation events to WebSocket clients
//!
//! ```text
//! SimulationRunner ──publish──▶ broadcast::Sender<LiveEvent>
//!                                   │
//!                    ┌──────────────┼──────────────┐
//!                    ▼              ▼              ▼
//!                WS session     WS session     WS session
//! ```
//!
//! The hub also remembers the latest `INIT_FARMS` so a client joining
//! mid-day can draw the farms before the next day starts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use shared::LiveEvent;
use tokio::sync::{Notify, broadcast};

/// Broadcast channel capacity, enough for a full day of animation steps
const BROADCAST_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct SimulationHub {
    tx: broadcast::Sender<LiveEvent>,
    joined: Arc<Notify>,
    /// Subscribes since the hub was created
    joins: Arc<AtomicU64>,
    /// `joins` when the last run ended
    joins_at_run_end: Arc<AtomicU64>,
    farms_snapshot: Arc<RwLock<Option<LiveEvent>>>,
}

impl Default for SimulationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationHub {
    pub fn new() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }

    /// Hub whose subscribers lag after `capacity` unread events
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            joined: Arc::new(Notify::new()),
            joins: Arc::new(AtomicU64::new(0)),
            joins_at_run_end: Arc::new(AtomicU64::new(0)),
            farms_snapshot: Arc::new(RwLock::new(None)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        let rx = self.tx.subscribe();
        self.joins.fetch_add(1, Ordering::SeqCst);
        self.joined.notify_waiters();
        rx
    }

    /// Publish to every subscriber (no subscribers is not an error)
    pub fn publish(&self, event: LiveEvent) {
        if matches!(event, LiveEvent::InitFarms(_)) {
            let mut snapshot = self
                .farms_snapshot
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *snapshot = Some(event.clone());
        }
        // marked before sending so a client reacting to the event counts as new
        if matches!(event, LiveEvent::SimulationComplete { .. } | LiveEvent::Error { .. }) {
            self.joins_at_run_end
                .store(self.joins.load(Ordering::SeqCst), Ordering::SeqCst);
        }
        let _ = self.tx.send(event);
    }

    /// Latest `INIT_FARMS`, if a day has started
    pub fn farms_snapshot(&self) -> Option<LiveEvent> {
        self.farms_snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Resolve once at least one subscriber is connected
    pub async fn wait_for_subscriber(&self) {
        loop {
            // register before checking so a concurrent subscribe is not missed
            let joined = self.joined.notified();
            if self.subscriber_count() > 0 {
                return;
            }
            joined.await;
        }
    }

    /// Resolve once someone subscribed after the last `SIMULATION_COMPLETE`
    /// or `ERROR`, regardless of who is connected now
    pub async fn wait_for_new_subscriber(&self) {
        loop {
            let joined = self.joined.notified();
            if self.joins.load(Ordering::SeqCst) > self.joins_at_run_end.load(Ordering::SeqCst) {
                return;
            }
            joined.await;
        }
    }
}

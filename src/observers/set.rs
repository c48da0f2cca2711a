//! # Non-blocking event fan-out to multiple observers.
//!
//! Provides [`ObserverSet`] — distributes check lifecycle events to
//! multiple observers concurrently without blocking the publisher.
//!
//! ## Rules
//! - **No cross-observer ordering**: observer A may process event N while B
//!   processes N+5
//! - **Overflow**: event dropped for that observer only, counted and
//!   reported via `ObserverOverflow`
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: a slow or panicking observer doesn't affect others
//! - **Per-observer FIFO**: each observer sees events in order
//!
//! ## Panic handling
//! Worker tasks use `catch_unwind` to isolate panics: the panic is reported
//! as an `ObserverPanicked` event and the worker moves on to the next event.
//! Other observers are unaffected.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::events::{Bus, CheckEvent};
use crate::observers::Observe;

/// Queue handle for one observer.
struct Slot {
    name: &'static str,
    queue: mpsc::Sender<Arc<CheckEvent>>,
}

/// Fan-out coordinator for multiple event observers.
///
/// Manages per-observer bounded queues and worker tasks. A check invocation
/// produces a handful of lifecycle events, so queues are small by default
/// ([`Observe::queue_capacity`]); an observer that cannot keep up loses
/// events rather than stalling the check.
pub struct ObserverSet {
    slots: Vec<Slot>,
    workers: Vec<JoinHandle<()>>,
    dropped: AtomicU64,
    bus: Bus,
}

impl ObserverSet {
    /// Creates a new set and spawns one worker task per observer.
    ///
    /// Queue capacity comes from [`Observe::queue_capacity`], clamped to a
    /// minimum of 1.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn Observe>>, bus: Bus) -> Self {
        let mut slots = Vec::with_capacity(observers.len());
        let mut workers = Vec::with_capacity(observers.len());

        for obs in observers {
            let cap = obs.queue_capacity().max(1);
            let name = obs.name();
            let (tx, rx) = mpsc::channel::<Arc<CheckEvent>>(cap);
            workers.push(spawn_worker(obs, rx, bus.clone()));
            slots.push(Slot { name, queue: tx });
        }
        Self {
            slots,
            workers,
            dropped: AtomicU64::new(0),
            bus,
        }
    }

    /// Emits an event to all observers (non-blocking).
    ///
    /// An observer whose queue is full (or whose worker is gone) loses the
    /// event: the drop is counted and an `ObserverOverflow` event is
    /// published — unless the event being dropped is itself an overflow
    /// report, which is never re-published.
    pub fn emit(&self, event: &CheckEvent) {
        let suppress = event.is_observer_overflow();
        let event = Arc::new(event.clone());

        for slot in &self.slots {
            let Err(err) = slot.queue.try_send(Arc::clone(&event)) else {
                continue;
            };
            self.dropped.fetch_add(1, AtomicOrdering::Relaxed);
            if suppress {
                continue;
            }
            let reason = match err {
                TrySendError::Full(_) => "full",
                TrySendError::Closed(_) => "closed",
            };
            self.bus.publish(CheckEvent::observer_overflow(slot.name, reason));
        }
    }

    /// Returns the total number of events dropped across all observers.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(AtomicOrdering::Relaxed)
    }

    /// Gracefully shuts down all observer workers.
    ///
    /// 1. Drops all queue senders (workers drain and see the channel closed)
    /// 2. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        drop(self.slots);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

/// Drives one observer from its queue until the channel closes.
fn spawn_worker(
    obs: Arc<dyn Observe>,
    mut rx: mpsc::Receiver<Arc<CheckEvent>>,
    bus: Bus,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let handled = std::panic::AssertUnwindSafe(obs.on_event(ev.as_ref()))
                .catch_unwind()
                .await;
            if let Err(payload) = handled {
                bus.publish(CheckEvent::observer_panicked(
                    obs.name(),
                    panic_message(payload.as_ref()),
                ));
            }
        }
    })
}

/// Extracts a printable message from a caught panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

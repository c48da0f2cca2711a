//! # The first-event-wins primitive.
//!
//! [`RaceSpec::start`] attaches one listener for every watched
//! (source, event) pair and returns a [`RaceController`]. The race then
//! settles **exactly once**:
//!
//! - the first delivered event wins: every attached listener is detached,
//!   then the settle callback runs with a [`Settled`] outcome;
//! - or [`RaceController::cancel`] detaches every listener without invoking
//!   the callback at all.
//!
//! ## Settle point
//! ```text
//! state: Mutex<Option<Armed>>        Armed = { cleanup set, callback }
//!
//! listener fires ──► take()  ──► Some(armed) ──► detach all ──► callback
//!                        │
//! cancel()       ──► take()  ──► Some(armed) ──► detach all   (no callback)
//!                        │
//! any later fire ──► take() == None ──► return (no effect)
//! ```
//! The cleanup set and the callback live in the *same* `Option`, so whoever
//! takes it owns both: at-most-once detachment and at-most-once invocation
//! fall out of a single atomic `take()`, and detachment always happens
//! before the callback runs.
//!
//! ## Shared sources
//! The race never assumes exclusive ownership of a source: it removes only
//! the listeners it attached, by identity, leaving other registrations
//! untouched.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::RaceError;
use crate::race::spec::RaceSpec;
use crate::sources::{Listener, ListenerId, SourceRef};

/// Reserved event name signalling a source-level error.
///
/// When the winning event carries this name, the race settles with
/// [`Settled::Errored`] and the event payload as the error value.
pub const ERROR_EVENT: &str = "error";

/// One-time outcome of a race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<P> {
    /// A watched event fired first.
    Won {
        /// Name of the winning source.
        source: Arc<str>,
        /// Name of the winning event.
        event: Arc<str>,
        /// Payload the winning event was emitted with.
        payload: P,
    },

    /// A watched source emitted the reserved [`ERROR_EVENT`] first.
    Errored {
        /// Name of the erroring source.
        source: Arc<str>,
        /// Payload of the error event.
        error: P,
    },
}

impl<P> Settled<P> {
    /// Returns the name of the source that settled the race.
    pub fn source(&self) -> &str {
        match self {
            Settled::Won { source, .. } | Settled::Errored { source, .. } => source,
        }
    }

    /// Returns the winning event name, or `None` for an error settlement.
    pub fn event(&self) -> Option<&str> {
        match self {
            Settled::Won { event, .. } => Some(event),
            Settled::Errored { .. } => None,
        }
    }

    /// Returns `true` when the race settled via the reserved error event.
    pub fn is_error(&self) -> bool {
        matches!(self, Settled::Errored { .. })
    }
}

/// Callback invoked at most once with the race outcome.
type SettleFn<P> = Box<dyn FnOnce(Settled<P>) + Send>;

/// Everything a live race owns: released as one unit on settlement.
struct Armed<P> {
    /// Cleanup set: every listener this race attached, in attachment order.
    attached: Vec<(SourceRef<P>, Arc<str>, ListenerId)>,
    on_settle: SettleFn<P>,
}

/// Shared race state; `None` once settled or cancelled.
struct RaceState<P> {
    armed: Mutex<Option<Armed<P>>>,
}

impl<P> RaceState<P> {
    fn lock_armed(&self) -> MutexGuard<'_, Option<Armed<P>>> {
        self.armed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Takes the armed state and detaches every listener in the cleanup set.
    ///
    /// Returns the settle callback if this call was the one that settled,
    /// `None` if the race had already settled or been cancelled.
    fn disarm(&self) -> Option<SettleFn<P>> {
        let armed = self.lock_armed().take()?;
        for (source, event, id) in &armed.attached {
            source.detach(event, *id);
        }
        Some(armed.on_settle)
    }
}

impl<P> RaceSpec<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Starts the race: attaches one listener per watched (source, event)
    /// pair and returns a controller for explicit cancellation.
    ///
    /// The first delivered event across all watched pairs settles the race;
    /// `on_settle` is then invoked exactly once with the outcome. An event
    /// named [`ERROR_EVENT`] settles as [`Settled::Errored`].
    ///
    /// ## Errors
    /// [`RaceError`] if the spec is malformed (no entries, or an entry with
    /// no events). Validation runs before attachment, so a rejected spec
    /// leaves no listener behind on any source.
    ///
    /// ## Ordering
    /// Listeners are attached in entry order. Attachment order never decides
    /// the winner — delivery order does — it only keeps tests deterministic.
    pub fn start(
        self,
        on_settle: impl FnOnce(Settled<P>) + Send + 'static,
    ) -> Result<RaceController<P>, RaceError> {
        self.validate()?;

        let state = Arc::new(RaceState {
            armed: Mutex::new(None),
        });

        // The armed lock is held across attachment: an event delivered on
        // another task before the cleanup set is complete blocks at the
        // settle point instead of observing a half-built race.
        {
            let mut slot = state.lock_armed();
            let mut attached = Vec::new();
            for entry in self.entries() {
                let source = Arc::clone(entry.source());
                let source_name: Arc<str> = Arc::from(source.name());
                for event in entry.events() {
                    let listener = settle_listener(&state, &source_name, event);
                    let id = source.attach(event, listener);
                    attached.push((Arc::clone(&source), Arc::clone(event), id));
                }
            }
            *slot = Some(Armed {
                attached,
                on_settle: Box::new(on_settle),
            });
        }

        Ok(RaceController { state })
    }
}

/// Builds the listener for one watched (source, event) pair.
fn settle_listener<P>(
    state: &Arc<RaceState<P>>,
    source_name: &Arc<str>,
    event: &Arc<str>,
) -> Listener<P>
where
    P: Clone + Send + Sync + 'static,
{
    let state = Arc::clone(state);
    let source_name = Arc::clone(source_name);
    let event = Arc::clone(event);
    Arc::new(move |payload: &P| {
        // Losing and late invocations find the state already taken.
        let Some(on_settle) = state.disarm() else {
            return;
        };
        let outcome = if &*event == ERROR_EVENT {
            Settled::Errored {
                source: Arc::clone(&source_name),
                error: payload.clone(),
            }
        } else {
            Settled::Won {
                source: Arc::clone(&source_name),
                event: Arc::clone(&event),
                payload: payload.clone(),
            }
        };
        on_settle(outcome);
    })
}

/// Handle for explicitly cancelling a running race.
///
/// Dropping the controller does **not** cancel the race; cancellation is an
/// explicit operation.
pub struct RaceController<P> {
    state: Arc<RaceState<P>>,
}

impl<P> RaceController<P> {
    /// Cancels the race: detaches every attached listener and discards the
    /// settle callback without invoking it.
    ///
    /// Calling `cancel` after the race has settled, or calling it twice, is
    /// a no-op.
    pub fn cancel(&self) {
        if let Some(on_settle) = self.state.disarm() {
            drop(on_settle);
        }
    }

    /// Returns `true` once the race has settled or been cancelled.
    pub fn is_settled(&self) -> bool {
        self.state.lock_armed().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{Emitter, Source};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn capture<P: Send + 'static>() -> (
        impl FnOnce(Settled<P>) + Send + 'static,
        Arc<Mutex<Option<Settled<P>>>>,
        Arc<AtomicUsize>,
    ) {
        let slot: Arc<Mutex<Option<Settled<P>>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));
        let cb = {
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            move |settled: Settled<P>| {
                calls.fetch_add(1, Ordering::SeqCst);
                *slot.lock().unwrap() = Some(settled);
            }
        };
        (cb, slot, calls)
    }

    #[test]
    fn test_first_event_wins_and_reports_payload() {
        let a = Emitter::<u32>::arc("a");
        let b = Emitter::<u32>::arc("b");
        let (cb, slot, calls) = capture();

        let spec = RaceSpec::new()
            .watch(a.clone() as SourceRef<u32>, ["done"])
            .watch(b.clone() as SourceRef<u32>, ["cancel"]);
        let ctl = spec.start(cb).unwrap();

        b.emit("cancel", 42);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match slot.lock().unwrap().take().unwrap() {
            Settled::Won { source, event, payload } => {
                assert_eq!(&*source, "b");
                assert_eq!(&*event, "cancel");
                assert_eq!(payload, 42);
            }
            other => panic!("expected Won, got {other:?}"),
        }
        assert!(ctl.is_settled());
    }

    #[test]
    fn test_callback_runs_at_most_once_under_repeated_fires() {
        let a = Emitter::<u32>::arc("a");
        let b = Emitter::<u32>::arc("b");
        let (cb, _slot, calls) = capture();

        RaceSpec::new()
            .watch(a.clone() as SourceRef<u32>, ["done", "error"])
            .watch(b.clone() as SourceRef<u32>, ["cancel"])
            .start(cb)
            .unwrap();

        a.emit("done", 1);
        a.emit("done", 2);
        a.emit("error", 3);
        b.emit("cancel", 4);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_all_listeners_detached_after_win() {
        let a = Emitter::<u32>::arc("a");
        let b = Emitter::<u32>::arc("b");
        let c = Emitter::<u32>::arc("c");
        let (cb, slot, _calls) = capture();

        // 3 sources x 2 events = 6 listeners; trigger the 4th.
        RaceSpec::new()
            .watch(a.clone() as SourceRef<u32>, ["one", "two"])
            .watch(b.clone() as SourceRef<u32>, ["three", "four"])
            .watch(c.clone() as SourceRef<u32>, ["five", "six"])
            .start(cb)
            .unwrap();

        assert_eq!(a.total_listeners() + b.total_listeners() + c.total_listeners(), 6);

        b.emit("four", 44);

        match slot.lock().unwrap().take().unwrap() {
            Settled::Won { source, event, payload } => {
                assert_eq!(&*source, "b");
                assert_eq!(&*event, "four");
                assert_eq!(payload, 44);
            }
            other => panic!("expected Won, got {other:?}"),
        }
        assert_eq!(a.total_listeners(), 0);
        assert_eq!(b.total_listeners(), 0);
        assert_eq!(c.total_listeners(), 0);
    }

    #[test]
    fn test_winner_is_decided_by_delivery_order_not_input_order() {
        for fire_first in ["a", "b"] {
            let a = Emitter::<()>::arc("a");
            let b = Emitter::<()>::arc("b");
            let (cb, slot, _calls) = capture();

            RaceSpec::new()
                .watch(a.clone() as SourceRef<()>, ["fire"])
                .watch(b.clone() as SourceRef<()>, ["fire"])
                .start(cb)
                .unwrap();

            if fire_first == "a" {
                a.emit("fire", ());
                b.emit("fire", ());
            } else {
                b.emit("fire", ());
                a.emit("fire", ());
            }

            let settled = slot.lock().unwrap().take().unwrap();
            assert_eq!(settled.source(), fire_first);
        }
    }

    #[test]
    fn test_error_event_settles_as_errored() {
        let a = Emitter::<String>::arc("upstream");
        let (cb, slot, _calls) = capture();

        RaceSpec::new()
            .watch(a.clone() as SourceRef<String>, ["done", "error"])
            .start(cb)
            .unwrap();

        a.emit("error", "disk on fire".to_string());

        match slot.lock().unwrap().take().unwrap() {
            Settled::Errored { source, error } => {
                assert_eq!(&*source, "upstream");
                assert_eq!(error, "disk on fire");
            }
            other => panic!("expected Errored, got {other:?}"),
        };
    }

    #[test]
    fn test_cancel_detaches_without_invoking_callback() {
        let a = Emitter::<()>::arc("a");
        let (cb, _slot, calls) = capture();

        let ctl = RaceSpec::new()
            .watch(a.clone() as SourceRef<()>, ["fire"])
            .start(cb)
            .unwrap();

        ctl.cancel();
        assert_eq!(a.total_listeners(), 0);

        // An emit queued behind the cancel must have no effect.
        a.emit("fire", ());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(ctl.is_settled());
    }

    #[test]
    fn test_cancel_is_idempotent_and_noop_after_settle() {
        let a = Emitter::<()>::arc("a");
        let (cb, _slot, calls) = capture();

        let ctl = RaceSpec::new()
            .watch(a.clone() as SourceRef<()>, ["fire"])
            .start(cb)
            .unwrap();

        a.emit("fire", ());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        ctl.cancel();
        ctl.cancel();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_malformed_spec_attaches_nothing() {
        let a = Emitter::<()>::arc("a");
        let b = Emitter::<()>::arc("b");

        let result = RaceSpec::new()
            .watch(a.clone() as SourceRef<()>, ["fire"])
            .watch(b.clone() as SourceRef<()>, Vec::<&str>::new())
            .start(|_| {});

        assert!(matches!(result, Err(RaceError::NoEvents { .. })));
        assert_eq!(a.total_listeners(), 0, "partial attachment leaked");
        assert_eq!(b.total_listeners(), 0);
    }

    #[test]
    fn test_race_leaves_foreign_listeners_untouched() {
        let a = Emitter::<()>::arc("a");
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = Arc::clone(&hits);
            a.attach(
                "fire",
                Arc::new(move |_: &()| {
                    hits.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        let (cb, _slot, _calls) = capture();
        RaceSpec::new()
            .watch(a.clone() as SourceRef<()>, ["fire"])
            .start(cb)
            .unwrap();

        a.emit("fire", ());
        assert_eq!(a.listener_count("fire"), 1, "foreign listener removed");

        a.emit("fire", ());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}

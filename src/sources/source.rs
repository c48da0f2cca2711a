//! # Source capability contract.
//!
//! A [`Source`] is anything that can emit named events to registered
//! listeners and can have a listener removed **by identity**. The race
//! primitive depends only on this contract, never on a concrete emitter
//! type, so a channel, a timer wrapper, or a cancellation-signal adapter can
//! all participate in the same race.
//!
//! A source is never owned by a race: the race only adds and removes its own
//! listeners, and must not disturb listeners registered by other code.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global sequence counter for listener identities.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Shared listener handle invoked with a borrowed event payload.
///
/// Listeners run on whichever task emits the event; implementations must not
/// hold the source's registry lock while invoking them, so a listener may
/// detach itself (or others) during dispatch.
pub type Listener<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Shared handle to a source (`Arc<dyn Source<P>>`).
pub type SourceRef<P> = Arc<dyn Source<P>>;

/// Identity of one attached listener.
///
/// Ids are unique across the whole process, so detaching with an id obtained
/// from a different source is a harmless no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocates a fresh process-unique id.
    pub fn next() -> Self {
        Self(LISTENER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// # Entity that emits named events to registered listeners.
///
/// Implementors keep a registry of listeners per event name and invoke every
/// registered listener when that event is emitted.
///
/// ## Contract
/// - `attach` registers exactly one listener and returns its identity.
/// - `detach` removes that listener; detaching twice (or with a foreign id)
///   returns `false` and has no other effect.
/// - Emission order defines "first" for racing purposes; the contract itself
///   imposes no ordering beyond the implementor's dispatch order.
pub trait Source<P>: Send + Sync {
    /// Returns a stable, human-readable source name.
    fn name(&self) -> &str;

    /// Registers a listener for `event` and returns its identity.
    fn attach(&self, event: &str, listener: Listener<P>) -> ListenerId;

    /// Removes the listener registered under `id` for `event`.
    ///
    /// Returns `true` if a listener was removed, `false` if none matched
    /// (already detached, or the id belongs elsewhere).
    fn detach(&self, event: &str, id: ListenerId) -> bool;
}

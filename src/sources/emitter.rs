//! # Generic named-event emitter.
//!
//! [`Emitter`] is a minimal publish/subscribe object implementing the
//! [`Source`] contract: listeners are registered per event name and removed
//! by [`ListenerId`].
//!
//! ## Rules
//! - **Dispatch outside the lock**: `emit()` clones the listener handles
//!   under the registry lock, releases it, then invokes them — so a listener
//!   may attach/detach on the same emitter without deadlocking.
//! - **Borrowed payload**: listeners receive `&P`; a listener that needs
//!   ownership clones what it keeps.
//! - **No delivery guarantee**: emitting an event with no listeners is a
//!   no-op.
//!
//! ## Racing detach
//! A listener detached *between* the snapshot and its invocation may still
//! run once for that emission. Callers needing exactly-once semantics under
//! concurrent detach (like [`RaceSpec::start`](crate::RaceSpec::start)) must
//! gate the listener body on their own settled state.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::sources::source::{Listener, ListenerId, Source};

/// Named-event publish/subscribe source.
///
/// Cheap to share via `Arc`; all methods take `&self`.
pub struct Emitter<P> {
    name: Cow<'static, str>,
    listeners: Mutex<HashMap<Arc<str>, Vec<(ListenerId, Listener<P>)>>>,
}

impl<P> Emitter<P> {
    /// Creates a new emitter with the given name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Creates the emitter and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    /// Emits `event` to every listener currently registered for it.
    ///
    /// Listener handles are snapshotted under the lock and invoked after it
    /// is released, in registration order.
    pub fn emit(&self, event: &str, payload: P) {
        let snapshot: Vec<Listener<P>> = {
            let registry = self.lock_registry();
            match registry.get(event) {
                Some(entries) => entries.iter().map(|(_, l)| Arc::clone(l)).collect(),
                None => Vec::new(),
            }
        };
        for listener in snapshot {
            listener(&payload);
        }
    }

    /// Returns the number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock_registry().get(event).map_or(0, Vec::len)
    }

    /// Returns the total number of listeners across all events.
    pub fn total_listeners(&self) -> usize {
        self.lock_registry().values().map(Vec::len).sum()
    }

    fn lock_registry(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<Arc<str>, Vec<(ListenerId, Listener<P>)>>> {
        // A poisoned registry still holds structurally valid data.
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<P> Source<P> for Emitter<P>
where
    P: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn attach(&self, event: &str, listener: Listener<P>) -> ListenerId {
        let id = ListenerId::next();
        self.lock_registry()
            .entry(Arc::from(event))
            .or_default()
            .push((id, listener));
        id
    }

    fn detach(&self, event: &str, id: ListenerId) -> bool {
        let mut registry = self.lock_registry();
        let Some(entries) = registry.get_mut(event) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(lid, _)| *lid != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            registry.remove(event);
        }
        removed
    }
}

//! # Race specification.
//!
//! Defines [`RaceSpec`] an ordered list of (source, event names) pairs that
//! one race invocation watches.
//!
//! A spec is built incrementally with [`RaceSpec::watch`] and consumed by
//! [`RaceSpec::start`](crate::RaceSpec::start). Validation happens inside
//! `start`, synchronously, **before** any listener is attached: a spec with
//! no entries, or an entry naming no events, is rejected whole.
//!
//! ## Rules
//! - Entry order determines attachment order. It has no effect on which
//!   event wins — only delivery order does — but keeps tests deterministic.
//! - The same source may appear in multiple entries; each (source, event)
//!   pair gets exactly one listener per entry occurrence.

use std::sync::Arc;

use crate::error::RaceError;
use crate::sources::SourceRef;

/// One watched source together with the event names to observe on it.
pub struct RaceEntry<P> {
    source: SourceRef<P>,
    events: Vec<Arc<str>>,
}

impl<P> RaceEntry<P> {
    /// Creates an entry watching `events` on `source`.
    pub fn new(source: SourceRef<P>, events: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            source,
            events: events.into_iter().map(|e| Arc::from(e.as_ref())).collect(),
        }
    }

    /// Returns the watched source.
    pub fn source(&self) -> &SourceRef<P> {
        &self.source
    }

    /// Returns the event names watched on this source.
    pub fn events(&self) -> &[Arc<str>] {
        &self.events
    }
}

/// Specification of one race: which events to watch on which sources.
///
/// ## Example
/// ```
/// use checkrace::{Emitter, RaceSpec, SourceRef};
///
/// let a: SourceRef<()> = Emitter::arc("a");
/// let b: SourceRef<()> = Emitter::arc("b");
///
/// let spec = RaceSpec::new()
///     .watch(a, ["done", "error"])
///     .watch(b, ["cancel"]);
/// assert_eq!(spec.entries().len(), 2);
/// ```
pub struct RaceSpec<P> {
    entries: Vec<RaceEntry<P>>,
}

impl<P> Default for RaceSpec<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> RaceSpec<P> {
    /// Creates an empty specification.
    ///
    /// An empty spec is buildable but not startable; `start` rejects it with
    /// [`RaceError::EmptyRace`].
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Adds an entry watching `events` on `source`.
    #[must_use]
    pub fn watch(
        mut self,
        source: SourceRef<P>,
        events: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        self.entries.push(RaceEntry::new(source, events));
        self
    }

    /// Returns the entries in attachment order.
    pub fn entries(&self) -> &[RaceEntry<P>] {
        &self.entries
    }

    /// Checks the spec is well-formed: at least one entry, and every entry
    /// names at least one event.
    pub(crate) fn validate(&self) -> Result<(), RaceError> {
        if self.entries.is_empty() {
            return Err(RaceError::EmptyRace);
        }
        for entry in &self.entries {
            if entry.events.is_empty() {
                return Err(RaceError::NoEvents {
                    source: entry.source.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::Emitter;

    #[test]
    fn test_empty_spec_rejected() {
        let spec: RaceSpec<()> = RaceSpec::new();
        assert!(matches!(spec.validate(), Err(RaceError::EmptyRace)));
    }

    #[test]
    fn test_entry_without_events_rejected() {
        let src: SourceRef<()> = Emitter::arc("mute");
        let spec = RaceSpec::new().watch(src, Vec::<&str>::new());
        match spec.validate() {
            Err(RaceError::NoEvents { source }) => assert_eq!(source, "mute"),
            other => panic!("expected NoEvents, got {other:?}"),
        }
    }

    #[test]
    fn test_well_formed_spec_accepted() {
        let a: SourceRef<()> = Emitter::arc("a");
        let b: SourceRef<()> = Emitter::arc("b");
        let spec = RaceSpec::new().watch(a, ["done"]).watch(b, ["cancel", "error"]);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.entries()[1].events().len(), 2);
    }
}

//! # Lifecycle events emitted by the check orchestrator.
//!
//! The [`CheckEventKind`] enum classifies event types across three
//! categories:
//! - **Check lifecycle**: one check invocation's flow (started, completed,
//!   cancelled, errored)
//! - **Observer events**: fan-out failures (overflow, panic)
//!
//! The [`CheckEvent`] struct carries additional metadata such as timestamps,
//! the check label, the winning event name, and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use checkrace::{CheckEvent, CheckEventKind};
//!
//! let ev = CheckEvent::new(CheckEventKind::CheckStarted)
//!     .with_check("image-basics")
//!     .with_timeout(Duration::from_millis(50));
//!
//! assert_eq!(ev.kind, CheckEventKind::CheckStarted);
//! assert_eq!(ev.check.as_deref(), Some("image-basics"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of check lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckEventKind {
    // === Observer events ===
    /// Observer panicked during event processing.
    ///
    /// Sets:
    /// - `check`: observer name
    /// - `reason`: panic info/message
    ObserverPanicked,

    /// Observer dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `check`: observer name
    /// - `reason`: reason string (e.g., "full", "closed")
    ObserverOverflow,

    // === Check lifecycle events ===
    /// A check invocation started its race.
    ///
    /// Sets:
    /// - `check`: check label
    /// - `timeout_ms`: configured simulated-work delay (ms)
    CheckStarted,

    /// The timer won: the check resolved with its configured findings.
    ///
    /// Sets:
    /// - `check`: check label
    /// - `winner`: winning event name
    CheckCompleted,

    /// The cancellation signal won: the check resolved with no findings.
    ///
    /// Sets:
    /// - `check`: check label
    /// - `winner`: winning event name
    CheckCancelled,

    /// A watched source errored; the check resolved with no findings.
    ///
    /// Sets:
    /// - `check`: check label
    /// - `reason`: error payload from the source
    CheckErrored,
}

/// Check lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`CheckEventKind`]
#[derive(Clone)]
pub struct CheckEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: CheckEventKind,
    /// Label of the check (or observer name for observer events).
    pub check: Option<Arc<str>>,
    /// Name of the event that won the race, if applicable.
    pub winner: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Configured simulated-work delay in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl CheckEvent {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: CheckEventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            check: None,
            winner: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Attaches a check label (or observer name).
    #[inline]
    pub fn with_check(mut self, check: impl Into<Arc<str>>) -> Self {
        self.check = Some(check.into());
        self
    }

    /// Attaches the winning event name.
    #[inline]
    pub fn with_winner(mut self, winner: impl Into<Arc<str>>) -> Self {
        self.winner = Some(winner.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the simulated-work delay (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates an observer overflow event.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        CheckEvent::new(CheckEventKind::ObserverOverflow)
            .with_check(observer)
            .with_reason(reason)
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        CheckEvent::new(CheckEventKind::ObserverPanicked)
            .with_check(observer)
            .with_reason(info)
    }

    #[inline]
    pub fn is_observer_overflow(&self) -> bool {
        matches!(self.kind, CheckEventKind::ObserverOverflow)
    }
}

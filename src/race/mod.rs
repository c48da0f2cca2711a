//! First-event-wins racing across multiple sources.
//!
//! This module contains the core primitive of the crate: attach a listener
//! for every watched (source, event) pair, settle exactly once on whichever
//! event is delivered first, and detach every attached listener exactly once
//! — whether the race is won or explicitly cancelled.
//!
//! ## Contents
//! - [`RaceSpec`], [`RaceEntry`] — what to watch (validated before attaching)
//! - [`RaceController`] — explicit cancellation handle
//! - [`Settled`] — the one-time outcome (won, or errored via the reserved
//!   [`ERROR_EVENT`])
//!
//! See `check/orchestrator.rs` for the canonical caller: a timer source
//! raced against an external cancellation signal.

mod race;
mod spec;

pub use race::{ERROR_EVENT, RaceController, Settled};
pub use spec::{RaceEntry, RaceSpec};

//! # Event observers for check lifecycle events.
//!
//! This module provides the [`Observe`] trait and the fan-out machinery for
//! handling events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Orchestrator ── publish(CheckEvent) ──► Bus ──► observer listener
//!                                                        │
//!                                                  ObserverSet::emit
//!                                             ┌─────────┼─────────┐
//!                                             ▼         ▼         ▼
//!                                        [queue 1] [queue 2]  [queue N]
//!                                             │         │         │
//!                                        worker 1  worker 2  worker N
//!                                             ▼         ▼         ▼
//!                                       obs.on_event(&CheckEvent)
//! ```
//!
//! Observers are the pluggable logging/metrics sink of the orchestrator: it
//! never writes to a hard-coded side channel.

mod observe;
mod set;

#[cfg(feature = "logging")]
mod log;

pub use observe::Observe;
pub use set::ObserverSet;

#[cfg(feature = "logging")]
pub use log::LogWriter;

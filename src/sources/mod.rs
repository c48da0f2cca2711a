//! Event sources: the capability trait and a generic emitter.
//!
//! This module groups the **capability contract** a race can observe and a
//! concrete, generic publish/subscribe implementation of it.
//!
//! ## Contents
//! - [`Source`], [`Listener`], [`ListenerId`] — the attach/detach contract
//! - [`Emitter`] — named-event publish/subscribe with removal by identity
//!
//! ## Quick reference
//! - **Attachers**: [`RaceSpec::start`](crate::RaceSpec::start) attaches one
//!   listener per watched (source, event) pair and detaches them all on
//!   settlement.
//! - **Emitters**: timer/cancellation helpers in the check orchestrator, or
//!   any other code holding an [`Emitter`].

mod emitter;
mod source;

pub use emitter::Emitter;
pub use source::{Listener, ListenerId, Source, SourceRef};

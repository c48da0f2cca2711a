//! # checkrace
//!
//! **checkrace** is a small library for racing event sources, built around
//! one guarantee: whichever event fires first settles the race **exactly
//! once**, and every listener the race attached is removed **exactly once**
//! — whether the race is won or cancelled mid-flight.
//!
//! On top of the primitive sits a thin check layer: a cancellable "image
//! check" invocation that races a work timer against an external
//! cancellation signal, plus the host-facing provider glue a plugin would
//! register with.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!           ┌─────────────┐            ┌────────────────┐
//!           │ timer source│            │ cancel source  │
//!           │  ("done")   │            │   ("cancel")   │
//!           └──────┬──────┘            └───────┬────────┘
//!                  │  emit                     │  emit
//!                  ▼                           ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  Race (one per check invocation)                          │
//! │  - one listener per watched (source, event) pair          │
//! │  - settle point: Mutex<Option<Armed>> taken exactly once  │
//! │  - cleanup set detached before the callback runs          │
//! └──────────────────────────┬────────────────────────────────┘
//!                            ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  CheckOrchestrator                                        │
//! │  - "done" wins   → configured findings, verbatim          │
//! │  - "cancel" wins → empty result (graceful)                │
//! │  - lifecycle events → Bus → ObserverSet → observers       │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! RaceSpec ──► start(on_settle) ──► RaceController
//!
//! settle paths (mutually exclusive, each runs at most once):
//!   ├─ first event delivered ─► detach all ─► on_settle(Settled::Won)
//!   ├─ reserved "error" event ─► detach all ─► on_settle(Settled::Errored)
//!   └─ controller.cancel()    ─► detach all   (callback never invoked)
//!
//! later fires, repeated cancels: no-ops (state already taken)
//! ```
//!
//! ## Features
//! | Area           | Description                                               | Key types / traits                  |
//! |----------------|-----------------------------------------------------------|-------------------------------------|
//! | **Racing**     | First-event-wins across N sources with guaranteed cleanup.| [`RaceSpec`], [`RaceController`], [`Settled`] |
//! | **Sources**    | Capability contract + generic named-event emitter.        | [`Source`], [`Emitter`]             |
//! | **Checks**     | Cancellable check invocation with pass-through findings.  | [`CheckOrchestrator`], [`CheckConfig`] |
//! | **Providers**  | Host registration surface and sample providers.           | [`CheckProvider`], [`ProviderRegistry`] |
//! | **Observers**  | Pluggable lifecycle-event sinks (logging, metrics).       | [`Observe`], [`ObserverSet`]        |
//! | **Errors**     | Typed errors for race specs and provider failures.        | [`RaceError`], [`CheckError`]       |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use checkrace::{CheckConfig, CheckOrchestrator, CheckStatus, Finding};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cfg = CheckConfig {
//!         work_delay: Duration::from_millis(50),
//!         ..CheckConfig::default()
//!     };
//!     let orch = CheckOrchestrator::new(
//!         "image-basics",
//!         vec![Finding::new("image-size", CheckStatus::Success)],
//!         cfg,
//!         Vec::new(),
//!     );
//!
//!     // No cancellation requested: the timer wins and the configured
//!     // findings come back verbatim.
//!     let result = orch.run_check(CancellationToken::new()).await;
//!     assert_eq!(result.findings.len(), 1);
//! }
//! ```

mod check;
mod error;
mod events;
mod observers;
mod race;
mod sources;

// ---- Public re-exports ----

pub use check::{
    CANCEL_EVENT, CheckConfig, CheckOrchestrator, CheckProvider, CheckResult, CheckStatus,
    DONE_EVENT, FailingCheckProvider, Finding, MockCheckProvider, ProviderRef, ProviderRegistry,
    Registration, Severity,
};
pub use error::{CheckError, RaceError};
pub use events::{Bus, CheckEvent, CheckEventKind};
pub use observers::{Observe, ObserverSet};
pub use race::{ERROR_EVENT, RaceController, RaceEntry, RaceSpec, Settled};
pub use sources::{Emitter, Listener, ListenerId, Source, SourceRef};

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;

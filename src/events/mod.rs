//! Check lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the check orchestrator
//! and the observer workers.
//!
//! ## Contents
//! - [`CheckEventKind`], [`CheckEvent`] event classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `CheckOrchestrator`, `ObserverSet` workers
//!   (overflow/panic).
//! - **Consumers**: the orchestrator's observer listener, which fans events
//!   out to the [`ObserverSet`](crate::observers::ObserverSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{CheckEvent, CheckEventKind};

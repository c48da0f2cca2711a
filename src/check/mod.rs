//! Check layer: configuration, payloads, orchestration, and host glue.
//!
//! This module contains the caller side of the race primitive:
//! - [`CheckOrchestrator`] races a timer (standing in for real work) against
//!   an external cancellation signal and resolves to either the configured
//!   findings or an empty result;
//! - [`CheckProvider`] / [`ProviderRegistry`] are the host-facing
//!   registration surface, with sample providers matching the demonstration
//!   payloads.
//!
//! Internal modules:
//! - [`config`]: orchestrator settings with sentinel-documented defaults;
//! - [`finding`]: pass-through payload types (findings, statuses, severities);
//! - [`orchestrator`]: the race-driven check invocation;
//! - [`provider`]: provider trait, registry, and sample implementations.

mod config;
mod finding;
mod orchestrator;
mod provider;

pub use config::CheckConfig;
pub use finding::{CheckResult, CheckStatus, Finding, Severity};
pub use orchestrator::{CANCEL_EVENT, CheckOrchestrator, DONE_EVENT};
pub use provider::{
    CheckProvider, FailingCheckProvider, MockCheckProvider, ProviderRef, ProviderRegistry,
    Registration,
};

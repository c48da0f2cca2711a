//! # Orchestrator configuration.
//!
//! Provides [`CheckConfig`] centralized settings for check invocations.
//!
//! ## Sentinel values
//! - `work_delay = 0s` → the "done" timer fires on the next timer tick (the
//!   check resolves almost immediately unless cancellation is already
//!   requested)

use std::time::Duration;

/// Configuration for a [`CheckOrchestrator`](crate::CheckOrchestrator).
///
/// Defines:
/// - **Simulated work**: how long the stand-in timer runs before the check
///   "completes"
/// - **Event system**: bus capacity for lifecycle event delivery
#[derive(Clone, Debug)]
pub struct CheckConfig {
    /// Duration of the simulated work; when the timer fires, the check
    /// resolves with its configured findings.
    pub work_delay: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow observers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items. Minimum value is 1 (enforced
    /// by the bus).
    pub bus_capacity: usize,
}

impl CheckConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for CheckConfig {
    /// Default configuration:
    ///
    /// - `work_delay = 2s` (noticeable but short demo delay)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            work_delay: Duration::from_secs(2),
            bus_capacity: 1024,
        }
    }
}

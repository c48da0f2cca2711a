//! Error types used by the race primitive and the check layer.
//!
//! This module defines two main error enums:
//!
//! - [`RaceError`] — rejected race specifications, surfaced synchronously
//!   by [`RaceSpec::start`](crate::RaceSpec::start) before any listener is
//!   attached.
//! - [`CheckError`] — failures raised by individual check providers.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics. Errors emitted *by a watched source* are not represented
//! here: they flow through [`Settled::Errored`](crate::Settled) instead of
//! being thrown from inside a listener.

use thiserror::Error;

/// # Errors produced when starting a race.
///
/// These represent malformed race specifications. They are returned
/// synchronously: when `Race::start` fails, no listener has been attached
/// to any source (no partial attachment).
#[non_exhaustive]
#[derive(Debug)]
pub enum RaceError {
    /// The race specification contains no entries.
    EmptyRace,

    /// An entry names a source but no events to watch on it.
    NoEvents {
        /// Name of the source whose entry is malformed.
        source: String,
    },
}

impl std::fmt::Display for RaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RaceError::EmptyRace => {
                write!(f, "race specification is empty; at least one source is required")
            }
            RaceError::NoEvents { source } => {
                write!(f, "entry for source {source:?} names no events")
            }
        }
    }
}

impl std::error::Error for RaceError {}

impl RaceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use checkrace::RaceError;
    ///
    /// let err = RaceError::EmptyRace;
    /// assert_eq!(err.as_label(), "race_empty");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RaceError::EmptyRace => "race_empty",
            RaceError::NoEvents { .. } => "race_no_events",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RaceError::EmptyRace => "empty race specification".to_string(),
            RaceError::NoEvents { source } => {
                format!("no events named for source {source:?}")
            }
        }
    }
}

/// # Errors produced by check providers.
///
/// These belong to the host-facing glue layer: a provider may fail hard
/// instead of producing findings. The orchestrator itself never returns
/// them — timeout and cancellation are both successful resolutions.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CheckError {
    /// Provider execution failed and no findings were produced.
    #[error("check failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl CheckError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CheckError::Failed { .. } => "check_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CheckError::Failed { error } => format!("error: {error}"),
        }
    }
}

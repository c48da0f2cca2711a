//! # LogWriter — simple event printer
//!
//! A minimal observer that prints incoming [`CheckEvent`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [check-started] check="image-basics" timeout_ms=50
//! [check-completed] check="image-basics" winner="done"
//! [check-cancelled] check="image-basics" winner="cancel"
//! [check-errored] check="image-basics" reason="source failed"
//! ```

use async_trait::async_trait;

use crate::events::{CheckEvent, CheckEventKind};
use crate::observers::Observe;

/// Event writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &CheckEvent) {
        match e.kind {
            CheckEventKind::CheckStarted => {
                println!(
                    "[check-started] check={:?} timeout_ms={:?}",
                    e.check, e.timeout_ms
                );
            }
            CheckEventKind::CheckCompleted => {
                println!("[check-completed] check={:?} winner={:?}", e.check, e.winner);
            }
            CheckEventKind::CheckCancelled => {
                println!("[check-cancelled] check={:?} winner={:?}", e.check, e.winner);
            }
            CheckEventKind::CheckErrored => {
                println!("[check-errored] check={:?} reason={:?}", e.check, e.reason);
            }
            CheckEventKind::ObserverOverflow => {
                println!(
                    "[observer-overflow] observer={:?} reason={:?}",
                    e.check, e.reason
                );
            }
            CheckEventKind::ObserverPanicked => {
                println!(
                    "[observer-panicked] observer={} info={}",
                    e.check.as_deref().unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

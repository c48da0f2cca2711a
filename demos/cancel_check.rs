//! # Example: cancel_check
//!
//! Demonstrates cancelling a running check mid-flight.
//!
//! Shows how to:
//! - Start a check with a long simulated work delay
//! - Request cancellation from a controller task after 100ms
//! - Observe the lifecycle via the built-in [`LogWriter`] observer
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► run_check(token)            (work_delay = 5s)
//!   │     ├─► race: timer "done" vs signal "cancel"
//!   │     └─► publishes CheckStarted
//!   │
//!   └─► controller task
//!         ├─► sleep 100ms
//!         └─► token.cancel()
//!               ├─► "cancel" wins the race
//!               ├─► publishes CheckCancelled
//!               └─► run_check resolves with an empty result
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cancel_check --features logging
//! ```

use std::{sync::Arc, time::Duration};

use checkrace::{
    CheckConfig, CheckOrchestrator, CheckStatus, Finding, LogWriter, Observe,
};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== cancel_check example ===\n");

    // 1. A delay long enough that cancellation always wins
    let cfg = CheckConfig {
        work_delay: Duration::from_secs(5),
        ..CheckConfig::default()
    };

    // 2. Observer printing lifecycle events
    let observers: Vec<Arc<dyn Observe>> = vec![Arc::new(LogWriter::new())];

    let orch = CheckOrchestrator::new(
        "image-basics",
        vec![Finding::new("image-size", CheckStatus::Success)],
        cfg,
        observers,
    );

    // 3. Controller: request cancellation after 100ms
    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            println!("[controller] requesting cancellation...");
            token.cancel();
        });
    }

    // 4. The check resolves gracefully with no findings
    let result = orch.run_check(token).await;
    println!("\n[host] check resolved, findings: {}", result.findings.len());
    assert!(result.is_empty(), "cancellation should yield an empty result");

    // Give the observer worker a moment to drain its queue.
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("\n=== example completed ===");
    Ok(())
}

//! # Example: basic_check
//!
//! Demonstrates registering check providers and running them to completion.
//!
//! Shows how to:
//! - Build a [`CheckOrchestrator`] with canned findings
//! - Register a [`MockCheckProvider`] and a [`FailingCheckProvider`]
//! - Run every registered provider and print the outcomes
//!
//! ## Run
//! ```bash
//! cargo run --example basic_check
//! ```

use std::{sync::Arc, time::Duration};

use checkrace::{
    CheckConfig, CheckOrchestrator, CheckStatus, FailingCheckProvider, Finding,
    MockCheckProvider, ProviderRegistry, Severity,
};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== basic_check example ===\n");

    // 1. Configure a short simulated work delay
    let cfg = CheckConfig {
        work_delay: Duration::from_millis(300),
        ..CheckConfig::default()
    };

    // 2. Canned findings the mock provider reports
    let findings = vec![
        Finding::new("image-size", CheckStatus::Success),
        Finding::new("no-root-user", CheckStatus::Failed)
            .with_severity(Severity::Critical)
            .with_description("Container runs as **root**; add a `USER` directive."),
        Finding::new("layer-count", CheckStatus::Warning)
            .with_severity(Severity::Low)
            .with_description("Image has 42 layers; consider squashing."),
    ];

    // 3. Register both sample providers
    let registry = ProviderRegistry::new();
    let orch = CheckOrchestrator::new("image-basics", findings, cfg, Vec::new());
    let _mock = registry.register(Arc::new(MockCheckProvider::new(orch)));
    let _failing = registry.register(Arc::new(FailingCheckProvider::new("always-broken")));
    println!("registered {} providers\n", registry.len());

    // 4. Run each provider the way a host would
    for label in ["image-basics", "always-broken"] {
        let provider = registry.find(label).expect("provider registered above");
        println!("[host] running {label:?}...");
        match provider.check(CancellationToken::new()).await {
            Ok(result) => {
                println!("[host] {label:?} reported {} findings:", result.findings.len());
                for f in &result.findings {
                    println!(
                        "       - {} ({:?}, severity {:?})",
                        f.name, f.status, f.severity
                    );
                }
            }
            Err(e) => {
                println!("[host] {label:?} failed: {e}");
            }
        }
        println!();
    }

    println!("=== example completed ===");
    Ok(())
}

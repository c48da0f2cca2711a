//! # Check providers and host registration glue.
//!
//! The host-facing surface of the crate: a [`CheckProvider`] inspects an
//! image and reports findings, and a [`ProviderRegistry`] hands out
//! disposable [`Registration`] handles the way a host application would.
//!
//! Two sample providers match the demonstration payloads:
//! - [`MockCheckProvider`]: canned findings after a simulated delay, driven
//!   by a [`CheckOrchestrator`]; cancellable at any point.
//! - [`FailingCheckProvider`]: always fails hard — the deliberately
//!   unrecovered path a host must surface as-is.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::check::finding::CheckResult;
use crate::check::orchestrator::CheckOrchestrator;
use crate::error::CheckError;

/// Shared handle to a provider (`Arc<dyn CheckProvider>`).
pub type ProviderRef = Arc<dyn CheckProvider>;

/// # Host-facing check abstraction.
///
/// A provider inspects an image and reports findings. The supplied
/// [`CancellationToken`] is the host's cancellation signal; implementations
/// should resolve promptly (with an empty result or an error) once it fires.
#[async_trait]
pub trait CheckProvider: Send + Sync + 'static {
    /// Returns the display label the host shows for this provider.
    fn label(&self) -> &str;

    /// Runs one check.
    async fn check(&self, cancel_token: CancellationToken) -> Result<CheckResult, CheckError>;
}

/// Registry of check providers, keyed by registration identity.
///
/// Mirrors a host's registration interface: [`register`](Self::register)
/// returns a disposable handle, and dropping the handle (or calling
/// [`Registration::dispose`]) removes the provider again.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    inner: Arc<Mutex<HashMap<u64, ProviderRef>>>,
}

/// Registration sequence counter.
static REGISTRATION_SEQ: AtomicU64 = AtomicU64::new(0);

impl ProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider and returns its disposable handle.
    pub fn register(&self, provider: ProviderRef) -> Registration {
        let id = REGISTRATION_SEQ.fetch_add(1, AtomicOrdering::Relaxed);
        self.lock_inner().insert(id, provider);
        Registration {
            id,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Returns the provider registered under `label`, if any.
    pub fn find(&self, label: &str) -> Option<ProviderRef> {
        self.lock_inner()
            .values()
            .find(|p| p.label() == label)
            .map(Arc::clone)
    }

    /// Returns the number of registered providers.
    pub fn len(&self) -> usize {
        self.lock_inner().len()
    }

    /// Returns `true` when no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.lock_inner().is_empty()
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, HashMap<u64, ProviderRef>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Disposable handle to one registered provider.
///
/// Dropping the handle deregisters the provider.
pub struct Registration {
    id: u64,
    registry: Arc<Mutex<HashMap<u64, ProviderRef>>>,
}

impl Registration {
    /// Deregisters the provider now instead of on drop.
    pub fn dispose(self) {}

    fn remove(&self) {
        self.registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Provider returning canned findings after a simulated delay.
///
/// Thin wrapper over [`CheckOrchestrator`]: the host's cancellation token is
/// handed straight to the race, so cancellation yields `Ok` with an empty
/// result, never an error.
pub struct MockCheckProvider {
    orchestrator: CheckOrchestrator,
}

impl MockCheckProvider {
    /// Creates a provider around an already-configured orchestrator.
    pub fn new(orchestrator: CheckOrchestrator) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl CheckProvider for MockCheckProvider {
    fn label(&self) -> &str {
        self.orchestrator.label()
    }

    async fn check(&self, cancel_token: CancellationToken) -> Result<CheckResult, CheckError> {
        Ok(self.orchestrator.run_check(cancel_token).await)
    }
}

/// Provider that always fails hard.
///
/// Exists to exercise the host's failure surface; nothing recovers this
/// error on purpose.
pub struct FailingCheckProvider {
    label: String,
}

impl FailingCheckProvider {
    /// Creates a failing provider with the given display label.
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

#[async_trait]
impl CheckProvider for FailingCheckProvider {
    fn label(&self) -> &str {
        &self.label
    }

    async fn check(&self, _cancel_token: CancellationToken) -> Result<CheckResult, CheckError> {
        Err(CheckError::Failed {
            error: format!("{} always fails", self.label),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::config::CheckConfig;
    use crate::check::finding::{CheckStatus, Finding};
    use std::time::Duration;

    fn mock_provider() -> MockCheckProvider {
        let cfg = CheckConfig {
            work_delay: Duration::from_millis(5),
            bus_capacity: 16,
        };
        let orch = CheckOrchestrator::new(
            "mock-image-check",
            vec![Finding::new("image-size", CheckStatus::Success)],
            cfg,
            Vec::new(),
        );
        MockCheckProvider::new(orch)
    }

    #[tokio::test(start_paused = true)]
    async fn test_registration_drop_deregisters() {
        let registry = ProviderRegistry::new();
        let reg = registry.register(Arc::new(mock_provider()));
        assert_eq!(registry.len(), 1);
        assert!(registry.find("mock-image-check").is_some());

        drop(reg);
        assert!(registry.is_empty());
        assert!(registry.find("mock-image-check").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_is_equivalent_to_drop() {
        let registry = ProviderRegistry::new();
        let reg = registry.register(Arc::new(mock_provider()));
        reg.dispose();
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_provider_reports_findings() {
        let provider = mock_provider();
        let result = provider.check(CancellationToken::new()).await.unwrap();
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].name, "image-size");
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_provider_cancellation_is_ok_and_empty() {
        let provider = mock_provider();
        let token = CancellationToken::new();
        token.cancel();
        let result = provider.check(token).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_failing_provider_fails_unrecovered() {
        let provider = FailingCheckProvider::new("broken-check");
        let err = provider.check(CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "check_failed");
        assert!(err.as_message().contains("broken-check"));
    }
}

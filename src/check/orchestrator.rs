//! # Check orchestration: one race per check invocation.
//!
//! [`CheckOrchestrator::run_check`] creates two logical event sources — a
//! "done" source driven by a timer standing in for real work, and a "cancel"
//! source driven by an externally supplied [`CancellationToken`] — and races
//! them to decide whether the configured findings or an empty result is
//! produced.
//!
//! ## Flow
//! ```text
//! run_check(cancel_token)
//!   ├─► attach race listeners on timer + cancellation sources
//!   ├─► spawn timer helper:  sleep(work_delay) ──► timer.emit("done")
//!   ├─► spawn signal helper: token.cancelled() ──► cancellation.emit("cancel")
//!   ├─► await first event (oneshot bridged from the settle callback)
//!   ├─► tear down helpers (child token)
//!   └─► "done" won   ──► configured findings, verbatim
//!       "cancel" won ──► empty result (graceful, not an error)
//! ```
//!
//! ## Rules
//! - Per invocation the state machine is
//!   `Pending → (TimerFired | CancelRequested) → Settled`, terminal exactly
//!   once; `run_check` never returns an error.
//! - Listeners are attached **before** the helper tasks start, so an
//!   already-cancelled token (or a zero delay) cannot emit into a source
//!   nobody watches.
//! - Lifecycle events flow to the injected observers via the bus; the
//!   orchestrator never writes to a hard-coded side channel.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::check::config::CheckConfig;
use crate::check::finding::CheckResult;
use crate::events::{Bus, CheckEvent, CheckEventKind};
use crate::observers::{Observe, ObserverSet};
use crate::race::{RaceSpec, Settled};
use crate::sources::{Emitter, SourceRef};

/// Event name emitted by the timer source when the simulated work is done.
pub const DONE_EVENT: &str = "done";

/// Event name emitted by the cancellation source when the external signal
/// requests cancellation.
pub const CANCEL_EVENT: &str = "cancel";

/// Runs one check invocation as a race between completion and cancellation.
///
/// The orchestrator passes its configured findings through unchanged — it
/// never inspects them. Cancellation resolves to an empty result.
pub struct CheckOrchestrator {
    label: Arc<str>,
    findings: CheckResult,
    cfg: CheckConfig,
    bus: Bus,
    // Stops the bus listener (and with it the observer workers) when the
    // orchestrator is dropped.
    _observer_stop: DropGuard,
}

impl CheckOrchestrator {
    /// Creates an orchestrator with the given label, configured findings,
    /// and observers.
    ///
    /// Spawns one worker per observer plus a bus listener, so this must be
    /// called within a tokio runtime.
    pub fn new(
        label: impl Into<Arc<str>>,
        findings: impl Into<CheckResult>,
        cfg: CheckConfig,
        observers: Vec<Arc<dyn Observe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let stop = CancellationToken::new();
        Self::observer_listener(&bus, ObserverSet::new(observers, bus.clone()), stop.clone());
        Self {
            label: label.into(),
            findings: findings.into(),
            cfg,
            bus,
            _observer_stop: stop.drop_guard(),
        }
    }

    /// Subscribes to the bus and forwards events to the observer set until
    /// `stop` fires, then drains the workers.
    ///
    /// The set holds a bus sender (it publishes overflow/panic reports), so
    /// the listener would never see the channel close on its own; the stop
    /// token is what ends it.
    fn observer_listener(bus: &Bus, set: ObserverSet, stop: CancellationToken) {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    recv = rx.recv() => match recv {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            set.shutdown().await;
        });
    }

    /// Returns the check label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the configured findings.
    pub fn findings(&self) -> &CheckResult {
        &self.findings
    }

    /// Creates a receiver observing this orchestrator's lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<CheckEvent> {
        self.bus.subscribe()
    }

    /// Runs one check: resolves with the configured findings once the
    /// simulated work completes, or with an empty result if `cancel_token`
    /// requests cancellation first.
    ///
    /// Never returns an error; both outcomes are successful resolutions.
    /// Whichever of the two events is delivered first wins — there is no
    /// priority between them.
    pub async fn run_check(&self, cancel_token: CancellationToken) -> CheckResult {
        self.bus.publish(
            CheckEvent::new(CheckEventKind::CheckStarted)
                .with_check(Arc::clone(&self.label))
                .with_timeout(self.cfg.work_delay),
        );

        let timer = Emitter::<()>::arc("timer");
        let cancellation = Emitter::<()>::arc("cancellation");

        // Attach before the helpers run; see module rules.
        let (tx, rx) = oneshot::channel();
        let spec = RaceSpec::new()
            .watch(Arc::clone(&timer) as SourceRef<()>, [DONE_EVENT])
            .watch(Arc::clone(&cancellation) as SourceRef<()>, [CANCEL_EVENT]);
        let _controller = match spec.start(move |settled| {
            let _ = tx.send(settled);
        }) {
            Ok(controller) => controller,
            // The spec built above always names events; unreachable.
            Err(_) => return CheckResult::empty(),
        };

        let helpers = CancellationToken::new();
        // Tears the helper tasks down on every exit path, including this
        // future being dropped before the race settles.
        let _teardown = helpers.clone().drop_guard();
        self.spawn_timer(&timer, &helpers);
        self.spawn_cancel_adapter(&cancellation, cancel_token, &helpers);

        let outcome = rx.await;

        match outcome {
            Ok(Settled::Won { event, .. }) if &*event == DONE_EVENT => {
                self.bus.publish(
                    CheckEvent::new(CheckEventKind::CheckCompleted)
                        .with_check(Arc::clone(&self.label))
                        .with_winner(event),
                );
                self.findings.clone()
            }
            Ok(Settled::Won { event, .. }) => {
                self.bus.publish(
                    CheckEvent::new(CheckEventKind::CheckCancelled)
                        .with_check(Arc::clone(&self.label))
                        .with_winner(event),
                );
                CheckResult::empty()
            }
            Ok(Settled::Errored { source, .. }) => {
                // A source-level error resolves like cancellation: empty
                // result, observable via the bus.
                self.bus.publish(
                    CheckEvent::new(CheckEventKind::CheckErrored)
                        .with_check(Arc::clone(&self.label))
                        .with_reason(format!("source {source} errored")),
                );
                CheckResult::empty()
            }
            // Settle callback dropped without firing; only reachable if the
            // race was cancelled out from under us.
            Err(_) => CheckResult::empty(),
        }
    }

    /// Spawns the timer standing in for real work.
    fn spawn_timer(&self, timer: &Arc<Emitter<()>>, helpers: &CancellationToken) {
        let timer = Arc::clone(timer);
        let helpers = helpers.clone();
        let delay = self.cfg.work_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => timer.emit(DONE_EVENT, ()),
                _ = helpers.cancelled() => {}
            }
        });
    }

    /// Spawns the adapter turning the external cancellation signal into the
    /// "cancel" event source.
    fn spawn_cancel_adapter(
        &self,
        cancellation: &Arc<Emitter<()>>,
        cancel_token: CancellationToken,
        helpers: &CancellationToken,
    ) {
        let cancellation = Arc::clone(cancellation);
        let helpers = helpers.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_token.cancelled() => cancellation.emit(CANCEL_EVENT, ()),
                _ = helpers.cancelled() => {}
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::finding::{CheckStatus, Finding, Severity};
    use std::time::Duration;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::time::Instant;

    fn sample_findings() -> Vec<Finding> {
        vec![
            Finding::new("image-size", CheckStatus::Success),
            Finding::new("no-root-user", CheckStatus::Failed)
                .with_severity(Severity::Critical)
                .with_description("Container runs as **root**."),
            Finding::new("layer-count", CheckStatus::Warning).with_severity(Severity::Low),
        ]
    }

    fn orchestrator(delay: Duration) -> CheckOrchestrator {
        let cfg = CheckConfig {
            work_delay: delay,
            bus_capacity: 64,
        };
        CheckOrchestrator::new("image-basics", sample_findings(), cfg, Vec::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_win_passes_findings_through_verbatim() {
        let orch = orchestrator(Duration::from_millis(50));
        let started = Instant::now();

        let result = orch.run_check(CancellationToken::new()).await;

        assert!(
            started.elapsed() >= Duration::from_millis(50),
            "resolved before the simulated work elapsed"
        );
        assert_eq!(result, CheckResult::new(sample_findings()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_resolves_empty_without_error() {
        let orch = orchestrator(Duration::from_millis(50));
        let token = CancellationToken::new();
        {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                token.cancel();
            });
        }

        let mut events = orch.subscribe();
        let started = Instant::now();
        let result = orch.run_check(token).await;

        assert!(result.is_empty());
        assert!(started.elapsed() < Duration::from_millis(50));

        assert_eq!(
            events.recv().await.unwrap().kind,
            CheckEventKind::CheckStarted
        );
        assert_eq!(
            events.recv().await.unwrap().kind,
            CheckEventKind::CheckCancelled
        );

        // Nothing further happens once the original delay would have fired.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_token_wins_immediately() {
        let orch = orchestrator(Duration::from_millis(50));
        let token = CancellationToken::new();
        token.cancel();

        let result = orch.run_check(token).await;
        assert!(result.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_event_carries_winner_and_label() {
        let orch = orchestrator(Duration::from_millis(5));
        let mut events = orch.subscribe();

        let _ = orch.run_check(CancellationToken::new()).await;

        let started = events.recv().await.unwrap();
        assert_eq!(started.kind, CheckEventKind::CheckStarted);
        assert_eq!(started.check.as_deref(), Some("image-basics"));
        assert_eq!(started.timeout_ms, Some(5));

        let completed = events.recv().await.unwrap();
        assert_eq!(completed.kind, CheckEventKind::CheckCompleted);
        assert_eq!(completed.winner.as_deref(), Some(DONE_EVENT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_checks_reuse_the_orchestrator() {
        let orch = orchestrator(Duration::from_millis(5));

        let first = orch.run_check(CancellationToken::new()).await;
        let second = orch.run_check(CancellationToken::new()).await;

        assert_eq!(first, second);
        assert_eq!(first.findings.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_a_check_midflight_does_not_wedge_reuse() {
        let orch = orchestrator(Duration::from_millis(50));
        let token = CancellationToken::new();

        // Abandon the invocation partway through the simulated work.
        let check = orch.run_check(token.clone());
        assert!(tokio::time::timeout(Duration::from_millis(10), check)
            .await
            .is_err());

        // The abandoned invocation's helpers are torn down; cancelling its
        // token reaches nobody and the orchestrator still serves fresh checks.
        token.cancel();
        let result = orch.run_check(CancellationToken::new()).await;
        assert_eq!(result.findings.len(), 3);
    }

    #[tokio::test]
    async fn test_abandoned_check_releases_the_cancel_adapter() {
        let orch = orchestrator(Duration::from_millis(50));
        let cancellation = Emitter::<()>::arc("cancellation");
        let weak = Arc::downgrade(&cancellation);
        let helpers = CancellationToken::new();

        orch.spawn_cancel_adapter(&cancellation, CancellationToken::new(), &helpers);
        drop(cancellation);

        // run_check keeps `helpers` behind a drop guard; dropping the
        // in-flight future fires it.
        drop(helpers.clone().drop_guard());

        for _ in 0..50 {
            if weak.upgrade().is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(weak.upgrade().is_none(), "adapter still holds its source");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_orchestrator_releases_its_observers() {
        use async_trait::async_trait;
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Recorder {
            hits: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl Observe for Recorder {
            async fn on_event(&self, _event: &CheckEvent) {
                self.hits.fetch_add(1, Ordering::SeqCst);
            }

            fn name(&self) -> &'static str {
                "recorder"
            }
        }

        let hits = Arc::new(AtomicUsize::new(0));
        let observer: Arc<dyn Observe> = Arc::new(Recorder {
            hits: Arc::clone(&hits),
        });
        let weak = Arc::downgrade(&observer);

        let cfg = CheckConfig {
            work_delay: Duration::from_millis(5),
            bus_capacity: 64,
        };
        let orch = CheckOrchestrator::new(
            "image-basics",
            sample_findings(),
            cfg,
            vec![Arc::clone(&observer)],
        );
        drop(observer);

        let _ = orch.run_check(CancellationToken::new()).await;
        assert!(hits.load(Ordering::SeqCst) >= 1, "no event reached the observer");

        drop(orch);
        for _ in 0..50 {
            if weak.upgrade().is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(weak.upgrade().is_none(), "observer worker kept running");
    }
}

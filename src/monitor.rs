//! Push-mode cycle runner.
//!
//! Every tick spawns one probe → classify → notify task per registered
//! target. Tasks are independent: a failure in one never touches another.
//! The scheduling loop does not join the tasks of a cycle before sleeping
//! until the next one, so cycles overlap when a probe outlives the interval.
//! There is no cap on concurrent tasks.
//!
//! ```text
//!            tick
//!              │
//!   ┌──────────┼──────────┐
//!   ▼          ▼          ▼
//! probe      probe      probe      (one task per target)
//!   │          │          │
//! classify   classify   classify
//!   │          │          │
//! POST       POST       POST       (single attempt each)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::classify::{classify_push, Verdict};
use crate::notify::{NotifyError, Notifier, Payload};
use crate::probe::Prober;
use crate::registry::{MonitoredTarget, Registry};

/// Default delay between two cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Drives probe cycles over a registry.
pub struct Monitor<P: Prober + 'static> {
    registry: Arc<Registry>,
    prober: Arc<P>,
    notifier: Notifier,
    interval: Duration,
}

impl<P: Prober + 'static> Monitor<P> {
    pub fn new(registry: Registry, prober: P, notifier: Notifier) -> Self {
        Self {
            registry: Arc::new(registry),
            prober: Arc::new(prober),
            notifier,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Launch one pipeline per target and return immediately.
    ///
    /// The handles resolve to each pipeline's verdict; callers that don't
    /// care may drop them without cancelling anything.
    pub fn run_cycle(&self) -> Vec<JoinHandle<Verdict>> {
        let cycle = Uuid::new_v4();
        debug!(%cycle, targets = self.registry.len(), prober = self.prober.name(), "starting cycle");

        self.registry
            .iter()
            .map(|entry| {
                let entry = entry.clone();
                let prober = Arc::clone(&self.prober);
                let notifier = self.notifier.clone();
                tokio::spawn(async move { check_and_notify(cycle, &*prober, &notifier, &entry).await })
            })
            .collect()
    }

    /// Run cycles forever, one per interval, starting immediately.
    pub async fn run(&self) {
        info!(
            "Monitoring {} target(s) every {}s",
            self.registry.len(),
            self.interval.as_secs()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            // In-flight pipelines are left running
            drop(self.run_cycle());
        }
    }
}

/// One probe-classify-notify pipeline.
async fn check_and_notify<P: Prober + ?Sized>(
    cycle: Uuid,
    prober: &P,
    notifier: &Notifier,
    entry: &MonitoredTarget,
) -> Verdict {
    let target = &entry.target;
    let result = prober.probe(target).await;
    let verdict = classify_push(&result);

    info!(
        %cycle,
        probe = %target,
        status = %verdict.status,
        "{}",
        verdict.message
    );

    let Some(ref webhook) = entry.webhook else {
        return verdict;
    };

    let payload = Payload::from_verdict(target.kind(), &verdict);
    if let Err(e) = notifier.notify(webhook, &payload).await {
        error!(%cycle, probe = %target, webhook = %webhook, "webhook delivery failed: {}", e);
        if let NotifyError::Rejected { ref payload, .. } = e {
            debug!(%cycle, webhook = %webhook, payload = %payload, "rejected payload");
        }
    } else {
        debug!(%cycle, probe = %target, "verdict delivered");
    }

    verdict
}

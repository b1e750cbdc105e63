//! The sync scheduler.
//!
//! Drives reconciliation cycles on a fixed period with at most one cycle in
//! flight. A cycle is fetch -> map -> classify -> resolve -> apply ->
//! push-back -> persist; its outcome is returned as a value and routed to
//! the log and the notifier, never thrown.

use crate::error::Result;
use crate::notify::Notifier;
use crate::policy::ConflictPolicy;
use crate::remote::RemoteSource;
use crate::storage::Storage;
use quotesync_engine::{apply, classify, map_snapshot, IdentityCache, Timestamp};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::MissedTickBehavior;

/// Milliseconds since the Unix epoch.
fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis() as Timestamp
}

/// Summary of one successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    /// Newly discovered remote records appended
    pub appended: usize,
    /// Conflicts resolved in favor of the remote side
    pub remote_wins: usize,
    /// Whether the persisted collection changed
    pub changed: bool,
    /// Remote entries discarded during normalization
    pub discarded: usize,
}

impl CycleSummary {
    /// The one summary notification for this cycle.
    pub fn message(&self) -> String {
        if self.remote_wins > 0 {
            format!("Sync complete: {} conflict(s) resolved.", self.remote_wins)
        } else if self.changed {
            "Sync complete: updates applied.".to_string()
        } else {
            "Sync complete: no changes.".to_string()
        }
    }
}

/// Periodic reconciliation driver.
///
/// Cloning yields another handle to the same gate, so manual triggers from
/// other tasks serialize against timer ticks.
#[derive(Clone)]
pub struct SyncScheduler {
    storage: Arc<dyn Storage>,
    remote: Arc<dyn RemoteSource>,
    policy: Arc<dyn ConflictPolicy>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    fetch_cap: usize,
    gate: Arc<Semaphore>,
}

impl SyncScheduler {
    /// Wire a scheduler to its collaborators.
    pub fn new(
        storage: Arc<dyn Storage>,
        remote: Arc<dyn RemoteSource>,
        policy: Arc<dyn ConflictPolicy>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        fetch_cap: usize,
    ) -> Self {
        Self {
            storage,
            remote,
            policy,
            notifier,
            interval,
            fetch_cap,
            gate: Arc::new(Semaphore::new(1)),
        }
    }

    /// Run forever: one immediate cycle, then one per interval tick.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        // A tick that comes due mid-cycle is dropped, not queued
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Run one gated cycle and route its outcome.
    pub async fn tick(&self) {
        match self.try_run_cycle().await {
            None => {}
            Some(Ok(summary)) => {
                tracing::info!(
                    appended = summary.appended,
                    remote_wins = summary.remote_wins,
                    discarded = summary.discarded,
                    "sync cycle complete"
                );
                self.notifier.notify(&summary.message());
            }
            Some(Err(e)) => {
                tracing::error!(error = %e, "sync cycle failed");
                self.notifier.notify("Sync failed.");
            }
        }
    }

    /// Run one cycle unless another is already in flight.
    ///
    /// Returns `None` when the single-permit gate is held, in which case
    /// this trigger is dropped.
    pub async fn try_run_cycle(&self) -> Option<Result<CycleSummary>> {
        let _permit = match self.gate.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::debug!("sync cycle already running, tick dropped");
                return None;
            }
        };
        Some(self.run_cycle().await)
    }

    /// One full cycle against the remote source.
    ///
    /// Nothing is persisted unless the cycle reaches its end; a failure at
    /// any step leaves the stored state exactly as it was.
    pub async fn run_cycle(&self) -> Result<CycleSummary> {
        let items = self.remote.fetch().await?;
        let now = now_millis();

        // The cache is reconstructible, so a corrupt one costs a round of
        // re-minted identities rather than a failed cycle.
        let mut cache = match self.storage.load_identity_cache() {
            Ok(cache) => cache.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "identity cache unreadable, starting fresh");
                IdentityCache::new()
            }
        };
        let cache_len_before = cache.len();

        let snapshot = map_snapshot(&items, &mut cache, now, self.fetch_cap);
        let discarded = items.len().min(self.fetch_cap) - snapshot.len();
        if discarded > 0 {
            tracing::warn!(discarded, "discarded malformed remote entries");
        }

        let mut collection = self.storage.load_collection()?.unwrap_or_default();

        let diff = classify(&collection, &snapshot);
        tracing::debug!(
            fresh = diff.fresh.len(),
            conflicts = diff.conflicts.len(),
            unchanged = diff.unchanged,
            "classified remote snapshot"
        );

        let mut resolutions = Vec::with_capacity(diff.conflicts.len());
        for pair in &diff.conflicts {
            resolutions.push(self.policy.decide(&pair.local, &pair.remote).await);
        }

        let report = apply(&mut collection, diff, &resolutions, now)?;

        for record in &report.push_upstream {
            if let Err(e) = self.remote.push(record).await {
                tracing::warn!(error = %e, id = %record.id, "push-back failed, keeping local result");
            }
        }

        if cache.len() > cache_len_before {
            self.storage.save_identity_cache(&cache)?;
        }
        if report.changed {
            self.storage.save_collection(&collection, now)?;
        }
        self.storage.set_last_sync(now)?;

        Ok(CycleSummary {
            appended: report.appended,
            remote_wins: report.remote_wins,
            changed: report.changed,
            discarded,
        })
    }
}

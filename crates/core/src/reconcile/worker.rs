//! The reconciliation loop.

use std::time::Duration;

use gophermart_shared::config::WorkerConfig;
use gophermart_shared::types::Amount;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::store::{ApplyOutcome, ReconcileStore, Resolution};

/// Upper bound on an upstream `Retry-After` hint.
pub const MAX_RATE_LIMIT_PAUSE: Duration = Duration::from_secs(600);
use crate::accrual::{AccrualClient, AccrualOutcome};
use crate::orders::OrderStatus;

/// Result of a single [`ReconciliationWorker::run_once`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// No unresolved order exists.
    Idle,
    /// A resolution was committed.
    Applied {
        /// Order number.
        number: String,
        /// New status.
        status: OrderStatus,
        /// Amount credited to the owner.
        credited: Option<Amount>,
    },
    /// Upstream confirmed the current status; nothing was written.
    Unchanged,
    /// The order changed underneath; nothing was written.
    Stale,
    /// Upstream does not know the order yet.
    NotYetAvailable,
    /// Upstream rate-limited us; the whole loop pauses this long.
    RateLimited(Duration),
    /// Upstream call failed; retried later.
    TransientError,
    /// Reading or writing the store failed; retried later.
    StoreFailed,
    /// Shutdown was requested before the iteration finished.
    Cancelled,
}

/// Resolves pending orders one at a time, oldest first.
#[derive(Debug)]
pub struct ReconciliationWorker<S, C> {
    store: S,
    client: C,
    config: WorkerConfig,
}

impl<S, C> ReconciliationWorker<S, C>
where
    S: ReconcileStore,
    C: AccrualClient,
{
    /// Creates a worker.
    pub const fn new(store: S, client: C, config: WorkerConfig) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    /// Runs until `shutdown` is cancelled.
    ///
    /// Sleeps and upstream calls are abandoned on cancellation; a resolution
    /// that is already being applied always completes first.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            idle_interval = ?self.config.idle_interval(),
            retry_interval = ?self.config.retry_interval(),
            rate_limit_cooldown = ?self.config.rate_limit_cooldown(),
            "Reconciliation worker started"
        );

        loop {
            let outcome = self.run_once(&shutdown).await;
            if outcome == IterationOutcome::Cancelled {
                break;
            }
            let pause = self.pause_after(&outcome);
            if !sleep_or_cancel(pause, &shutdown).await {
                break;
            }
        }

        info!("Reconciliation worker stopped");
    }

    /// Performs one poll-fetch-apply iteration.
    pub async fn run_once(&self, shutdown: &CancellationToken) -> IterationOutcome {
        if shutdown.is_cancelled() {
            return IterationOutcome::Cancelled;
        }

        let order = match self.store.next_unresolved().await {
            Ok(Some(order)) => order,
            Ok(None) => return IterationOutcome::Idle,
            Err(e) => {
                error!(error = %e, "Failed to load next unresolved order");
                return IterationOutcome::StoreFailed;
            }
        };

        let answer = tokio::select! {
            biased;
            () = shutdown.cancelled() => return IterationOutcome::Cancelled,
            answer = self.client.fetch_status(&order.number) => answer,
        };

        let resolution = match answer {
            AccrualOutcome::Resolved { status, accrual } => Resolution { status, accrual },
            AccrualOutcome::NotYetAvailable => {
                debug!(order = %order.number, "Order not registered in accrual system yet");
                return IterationOutcome::NotYetAvailable;
            }
            AccrualOutcome::RateLimited { retry_after } => {
                let pause = self.rate_limit_pause(retry_after);
                warn!(order = %order.number, pause = ?pause, "Accrual system rate limit hit");
                return IterationOutcome::RateLimited(pause);
            }
            AccrualOutcome::TransientError { reason } => {
                warn!(order = %order.number, reason = %reason, "Accrual system request failed");
                return IterationOutcome::TransientError;
            }
        };

        // Not raced against shutdown: status update and credit commit together.
        match self.store.apply_resolution(&order, resolution).await {
            Ok(ApplyOutcome::Applied { credited }) => {
                info!(
                    order = %order.number,
                    user_id = %order.user_id,
                    from = %order.status,
                    to = %resolution.status,
                    credited = ?credited.map(Amount::minor),
                    "Order resolved"
                );
                IterationOutcome::Applied {
                    number: order.number,
                    status: resolution.status,
                    credited,
                }
            }
            Ok(ApplyOutcome::Unchanged) => {
                debug!(order = %order.number, status = %order.status, "Order status unchanged");
                IterationOutcome::Unchanged
            }
            Ok(ApplyOutcome::Stale) => {
                warn!(order = %order.number, "Order changed while resolving, skipped");
                IterationOutcome::Stale
            }
            Err(e) => {
                error!(order = %order.number, error = %e, "Failed to apply resolution");
                IterationOutcome::StoreFailed
            }
        }
    }

    /// Global pause after a 429.
    ///
    /// Never shorter than the configured cooldown and never longer than
    /// [`MAX_RATE_LIMIT_PAUSE`], whatever `Retry-After` says.
    pub fn rate_limit_pause(&self, retry_after: Option<Duration>) -> Duration {
        let cooldown = self.config.rate_limit_cooldown();
        retry_after.map_or(cooldown, |hint| {
            hint.clamp(cooldown, cooldown.max(MAX_RATE_LIMIT_PAUSE))
        })
    }

    /// How long to wait before the next iteration.
    pub fn pause_after(&self, outcome: &IterationOutcome) -> Duration {
        match outcome {
            IterationOutcome::Idle => self.config.idle_interval(),
            IterationOutcome::RateLimited(pause) => *pause,
            IterationOutcome::Unchanged
            | IterationOutcome::NotYetAvailable
            | IterationOutcome::TransientError
            | IterationOutcome::StoreFailed => self.config.retry_interval(),
            IterationOutcome::Applied { .. }
            | IterationOutcome::Stale
            | IterationOutcome::Cancelled => Duration::ZERO,
        }
    }
}

/// Sleeps for `duration` unless cancelled first. Returns false on cancellation.
async fn sleep_or_cancel(duration: Duration, shutdown: &CancellationToken) -> bool {
    if duration.is_zero() {
        return !shutdown.is_cancelled();
    }
    tokio::select! {
        biased;
        () = shutdown.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

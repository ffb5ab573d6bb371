use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, warn};

use crate::args::PositiveUsize;
use crate::metrics::Outcome;

use super::fetcher::{FetchRequest, Fetcher};

/// How many requests to issue and how many may be in flight at once.
#[derive(Debug, Clone, Copy)]
pub struct DispatchPlan {
    pub requests: PositiveUsize,
    pub concurrency: PositiveUsize,
}

/// Live counters for observers such as the progress bar.
///
/// Nothing here feeds the summary; outcomes are the only source of truth.
#[derive(Debug, Default)]
pub struct DispatchCounters {
    launched: AtomicU64,
    in_flight: AtomicU64,
    completed: AtomicU64,
}

impl DispatchCounters {
    #[must_use]
    pub fn launched(&self) -> u64 {
        self.launched.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

/// Receiving half of a dispatch: one outcome per launched request.
#[derive(Debug)]
pub struct OutcomeStream {
    outcomes_rx: mpsc::Receiver<Outcome>,
    launcher: JoinHandle<()>,
}

impl OutcomeStream {
    pub const fn receiver_mut(&mut self) -> &mut mpsc::Receiver<Outcome> {
        &mut self.outcomes_rx
    }

    /// Waits for the launcher task to finish spawning.
    ///
    /// # Errors
    ///
    /// Returns the join error when the launcher panicked or was cancelled.
    pub async fn join(self) -> Result<(), JoinError> {
        drop(self.outcomes_rx);
        self.launcher.await
    }
}

/// Launches `plan.requests` fetches of `request`, never more than
/// `plan.concurrency` at a time.
///
/// A permit is taken before each task is spawned and held by the task until
/// its outcome is handed to the channel, so the permit count bounds both the
/// fetches in flight and the outcomes waiting to be sent.
#[must_use]
pub fn dispatch<F>(
    fetcher: Arc<F>,
    request: FetchRequest,
    plan: DispatchPlan,
    counters: Arc<DispatchCounters>,
) -> OutcomeStream
where
    F: Fetcher + 'static,
{
    let (outcomes_tx, outcomes_rx) = mpsc::channel::<Outcome>(plan.concurrency.get());
    let limiter = Arc::new(Semaphore::new(plan.concurrency.get()));
    let request = Arc::new(request);

    let launcher = tokio::spawn(async move {
        debug!(
            requests = plan.requests.get(),
            concurrency = plan.concurrency.get(),
            url = %request.url(),
            "Dispatching requests"
        );

        for _ in 0..plan.requests.get() {
            let permit = match Arc::clone(&limiter).acquire_owned().await {
                Ok(permit) => permit,
                Err(err) => {
                    error!("Concurrency limiter closed: {}", err);
                    break;
                }
            };
            counters.launched.fetch_add(1, Ordering::Relaxed);

            let fetcher = Arc::clone(&fetcher);
            let request = Arc::clone(&request);
            let counters = Arc::clone(&counters);
            let outcomes_tx = outcomes_tx.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let in_flight = InflightGuard::acquire(&counters.in_flight);
                let outcome = fetcher.fetch(&request).await;
                drop(in_flight);
                counters.completed.fetch_add(1, Ordering::Relaxed);

                if outcomes_tx.send(outcome).await.is_err() {
                    warn!("Outcome receiver dropped before all requests finished");
                }
            });
        }

        debug!(
            launched = counters.launched(),
            "All requests launched"
        );
    });

    OutcomeStream {
        outcomes_rx,
        launcher,
    }
}

struct InflightGuard<'counter> {
    counter: &'counter AtomicU64,
}

impl<'counter> InflightGuard<'counter> {
    fn acquire(counter: &'counter AtomicU64) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self { counter }
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        loop {
            let current = self.counter.load(Ordering::Relaxed);
            let Some(next) = current.checked_sub(1) else {
                break;
            };
            if self
                .counter
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                break;
            }
        }
    }
}

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Runs an async operation immediately and then on a fixed interval.
///
/// Each tick is spawned on its own, so a slow fetch never delays the next
/// one and completions may arrive out of order. Consumers sort that out with
/// generations (see [`crate::view::ViewStore`]).
///
/// Once [`Poller::stop`] returns, the operation is never invoked again.
/// Dropping the poller cancels it as well, but without waiting.
#[derive(Debug)]
pub struct Poller {
    name: String,
    cancel: CancellationToken,
    ticks: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn start<F, Fut>(name: &str, interval: Duration, op: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let ticks = Arc::new(AtomicU64::new(0));
        let handle = tokio::spawn(run(
            name.to_string(),
            interval,
            op,
            cancel.clone(),
            ticks.clone(),
        ));
        info!("[POLLER] {} started, every {:?}", name, interval);

        Poller {
            name: name.to_string(),
            cancel,
            ticks,
            handle: Some(handle),
        }
    }

    /// Stop ticking and wait for the loop to exit. Fetches already in flight
    /// are left to finish; their results are the consumer's to discard.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!(
            "[POLLER] {} stopped after {} ticks",
            self.name,
            self.ticks.load(Ordering::SeqCst)
        );
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of times the operation has been invoked.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<F, Fut>(
    name: String,
    interval: Duration,
    op: F,
    cancel: CancellationToken,
    ticks: Arc<AtomicU64>,
) where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // biased: a pending cancellation always beats a ready tick
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("[POLLER] {} cancelled", name);
                break;
            }
            _ = ticker.tick() => {
                let n = ticks.fetch_add(1, Ordering::SeqCst) + 1;
                debug!("[POLLER] {} tick {}", name, n);
                tokio::spawn(op());
            }
        }
    }
}

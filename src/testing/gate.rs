use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// Async gate a processor can park on until a test opens it.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Arc<GateInner>,
}

#[derive(Default)]
struct GateInner {
    open: AtomicBool,
    opened: Notify,
    entered: AtomicUsize,
    arrivals: Notify,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an arrival, then wait until the gate is open.
    pub async fn wait(&self) {
        self.inner.entered.fetch_add(1, Ordering::SeqCst);
        self.inner.arrivals.notify_waiters();

        let notified = self.inner.opened.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_open() {
            return;
        }
        notified.await;
    }

    pub fn open(&self) {
        self.inner.open.store(true, Ordering::SeqCst);
        self.inner.opened.notify_waiters();
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::SeqCst)
    }

    /// How many times `wait` has been entered.
    pub fn entered(&self) -> usize {
        self.inner.entered.load(Ordering::SeqCst)
    }

    /// Wait until `count` arrivals have been recorded. False on timeout.
    pub async fn wait_entered(&self, count: usize, timeout: Duration) -> bool {
        let arrived = async {
            loop {
                let notified = self.inner.arrivals.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.entered() >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, arrived).await.is_ok()
    }
}

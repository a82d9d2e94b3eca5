use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::Notify;

/// What the drain task is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DrainPhase {
    /// Waiting for the next intent.
    Idle = 0,
    /// Pulling and applying one intent's outcomes.
    Draining = 1,
    /// Torn down; no more intents will be processed.
    TornDown = 2,
}

/// Teardown flag plus drain phase, shared between the store handle and its
/// drain task.
pub(crate) struct Lifecycle {
    torn_down: AtomicBool,
    phase: AtomicU8,
    notify: Notify,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            torn_down: AtomicBool::new(false),
            phase: AtomicU8::new(DrainPhase::Idle as u8),
            notify: Notify::new(),
        }
    }

    /// Signal teardown. Returns true only for the first caller.
    pub(crate) fn signal(&self) -> bool {
        if !self.torn_down.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
            return true;
        }
        false
    }

    pub(crate) fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    pub(crate) fn phase(&self) -> DrainPhase {
        match self.phase.load(Ordering::SeqCst) {
            0 => DrainPhase::Idle,
            1 => DrainPhase::Draining,
            _ => DrainPhase::TornDown,
        }
    }

    pub(crate) fn advance(&self, phase: DrainPhase) {
        // TornDown is terminal.
        if self.phase() == DrainPhase::TornDown {
            return;
        }
        self.phase.store(phase as u8, Ordering::SeqCst);
        tracing::trace!(?phase, "Drain phase");
    }

    /// Resolves once teardown has been signalled.
    pub(crate) async fn wait(&self) {
        // Register with Notify before checking the flag, otherwise a signal
        // landing between the check and the await would be lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_torn_down() {
            return;
        }
        notified.await;
    }
}

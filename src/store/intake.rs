use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

use super::lifecycle::Lifecycle;
use crate::error::StoreError;

/// Bookkeeping shared by the store handle, its senders and its drain task.
pub(crate) struct Control {
    pub(crate) name: String,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) intake_capacity: usize,
    accepted: AtomicU64,
    processed: watch::Sender<u64>,
}

impl Control {
    pub(crate) fn new(name: String, intake_capacity: usize) -> Self {
        let (processed, _) = watch::channel(0);
        Self {
            name,
            lifecycle: Lifecycle::new(),
            intake_capacity,
            accepted: AtomicU64::new(0),
            processed,
        }
    }

    pub(crate) fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::SeqCst)
    }

    pub(crate) fn processed(&self) -> u64 {
        *self.processed.borrow()
    }

    pub(crate) fn finish_one(&self) {
        self.processed.send_modify(|count| *count += 1);
    }

    /// Resolves once `target` intents have finished draining, or on teardown.
    pub(crate) async fn wait_processed(&self, target: u64) {
        let mut progress = self.processed.subscribe();
        tokio::select! {
            _ = self.lifecycle.wait() => {}
            _ = progress.wait_for(|done| *done >= target) => {}
        }
    }
}

/// Cloneable, non-blocking submit handle.
///
/// Safe to use from any number of tasks or threads at once; the bounded
/// intake queue is the only synchronisation point.
pub struct IntentSender<I> {
    sender: mpsc::Sender<I>,
    control: Arc<Control>,
}

impl<I> Clone for IntentSender<I> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            control: Arc::clone(&self.control),
        }
    }
}

impl<I> IntentSender<I> {
    pub(crate) fn new(sender: mpsc::Sender<I>, control: Arc<Control>) -> Self {
        Self { sender, control }
    }

    /// Queue an intent for draining.
    ///
    /// # Errors
    /// `IntakeOverflow` if the queue is full, `TornDown` after teardown.
    pub fn submit(&self, intent: I) -> Result<(), StoreError> {
        if self.control.lifecycle.is_torn_down() {
            tracing::warn!(store = %self.control.name, "Submit after teardown rejected");
            return Err(StoreError::TornDown);
        }

        match self.sender.try_send(intent) {
            Ok(()) => {
                self.control.accepted.fetch_add(1, Ordering::SeqCst);
                tracing::trace!(store = %self.control.name, "Intent queued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                let capacity = self.control.intake_capacity;
                tracing::warn!(
                    store = %self.control.name,
                    capacity,
                    "Intake queue full, intent rejected"
                );
                Err(StoreError::IntakeOverflow { capacity })
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(store = %self.control.name, "Submit after teardown rejected");
                Err(StoreError::TornDown)
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.control.lifecycle.is_torn_down() || self.sender.is_closed()
    }
}

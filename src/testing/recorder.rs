use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures_core::Stream;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::{ErrorHandler, StoreError};
use crate::store::{EffectStream, StateStream};

/// Records every value a stream delivers, in arrival order, on a background
/// task. Needs a running tokio runtime.
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
    changed: Arc<Notify>,
    task: JoinHandle<()>,
}

/// Recorder over a store's state stream.
pub type StateRecorder<S> = Recorder<S>;

/// Recorder over a store's effect stream.
pub type EffectRecorder<E> = Recorder<E>;

impl<T: Send + 'static> Recorder<T> {
    pub fn from_stream<St>(mut stream: St) -> Self
    where
        St: Stream<Item = T> + Send + Unpin + 'static,
    {
        let values = Arc::new(Mutex::new(Vec::new()));
        let changed = Arc::new(Notify::new());

        let task = {
            let values = Arc::clone(&values);
            let changed = Arc::clone(&changed);
            tokio::spawn(async move {
                while let Some(value) = stream.next().await {
                    values.lock().push(value);
                    changed.notify_waiters();
                }
            })
        };

        Self {
            values,
            changed,
            task,
        }
    }

    /// Record a store's effects. Takes them from the shared receiver, so
    /// other effect consumers will not see what this recorder gets.
    pub fn from_effects(effects: EffectStream<T>) -> Self {
        Self::from_stream(effects.into_stream())
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least `len` values were recorded. False on timeout.
    pub async fn wait_for_len(&self, len: usize, timeout: Duration) -> bool {
        let reached = async {
            loop {
                let notified = self.changed.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.len() >= len {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, reached).await.is_ok()
    }

    #[track_caller]
    pub fn assert_count(&self, expected: usize) {
        let actual = self.len();
        assert_eq!(
            actual, expected,
            "expected {expected} recorded values, got {actual}"
        );
    }
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }
}

impl<T: Clone + PartialEq + Debug + Send + 'static> Recorder<T> {
    #[track_caller]
    pub fn assert_sequence(&self, expected: &[T]) {
        assert_eq!(self.values().as_slice(), expected);
    }
}

impl<S: Send + 'static> Recorder<S> {
    pub fn from_states(states: StateStream<S>) -> Self {
        Self::from_stream(states)
    }
}

impl<T> Drop for Recorder<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Error handler that keeps every error for later assertions.
#[derive(Clone, Default)]
pub struct ErrorRecorder {
    errors: Arc<Mutex<Vec<StoreError>>>,
}

impl ErrorRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.lock().iter().map(ToString::to_string).collect()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<StoreError> {
        std::mem::take(&mut *self.errors.lock())
    }
}

impl ErrorHandler for ErrorRecorder {
    fn on_error(&self, error: StoreError) {
        self.errors.lock().push(error);
    }
}

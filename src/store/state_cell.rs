//! Current-state storage with a lossless, last-value-cached observer stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Holds the current state and the queues of every live observer.
///
/// Replacement and subscription take the same lock, so a new observer sees
/// the latest value exactly once and then every later replacement, with
/// nothing skipped or repeated.
pub(crate) struct StateCell<S> {
    inner: Mutex<StateInner<S>>,
}

struct StateInner<S> {
    current: S,
    observers: Vec<mpsc::UnboundedSender<S>>,
    closed: bool,
}

impl<S: Clone> StateCell<S> {
    pub(crate) fn new(initial: S) -> Self {
        Self {
            inner: Mutex::new(StateInner {
                current: initial,
                observers: Vec::new(),
                closed: false,
            }),
        }
    }

    pub(crate) fn snapshot(&self) -> S {
        self.inner.lock().current.clone()
    }

    pub(crate) fn subscribe(&self) -> StateStream<S> {
        let mut inner = self.inner.lock();
        let (sender, receiver) = mpsc::unbounded_channel();
        // After close the sender is dropped here and the stream ends after
        // the latest value.
        if !inner.closed {
            inner.observers.push(sender);
        }
        StateStream {
            latest: Some(inner.current.clone()),
            receiver,
        }
    }

    /// Replace the current state and publish it to every observer.
    pub(crate) fn replace(&self, next: S) {
        let mut inner = self.inner.lock();
        inner
            .observers
            .retain(|observer| observer.send(next.clone()).is_ok());
        inner.current = next;
    }

    /// Drop every observer queue; streams end after their buffered values.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.observers.clear();
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }
}

/// Latest state followed by every subsequent replacement.
///
/// Each observer has its own unbounded queue: a slow observer never makes the
/// store skip a value, it only accumulates a backlog.
pub struct StateStream<S> {
    latest: Option<S>,
    receiver: mpsc::UnboundedReceiver<S>,
}

impl<S> StateStream<S> {
    /// Next state value, or `None` once the store has been torn down and the
    /// backlog is empty.
    pub async fn recv(&mut self) -> Option<S> {
        if let Some(latest) = self.latest.take() {
            return Some(latest);
        }
        self.receiver.recv().await
    }
}

impl<S> Unpin for StateStream<S> {}

impl<S> Stream for StateStream<S> {
    type Item = S;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S>> {
        if let Some(latest) = self.latest.take() {
            return Poll::Ready(Some(latest));
        }
        self.receiver.poll_recv(cx)
    }
}

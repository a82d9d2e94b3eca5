//! Building blocks for outcome streams.
//!
//! [`emit`] turns an `async` producer into a pull-based [`OutcomeStream`]:
//! the producer pushes through a single-slot channel and suspends until the
//! store takes the value, so backpressure reaches the producer and dropping
//! the stream cancels it.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use futures_core::Stream;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::mvi::{Outcome, OutcomeStream};

/// Returned by [`Emitter`] once the consuming stream has been dropped.
#[derive(Debug, Error)]
#[error("outcome stream was dropped")]
pub struct StreamClosed;

/// Push side of an outcome stream.
pub struct Emitter<M, E> {
    sender: mpsc::Sender<Outcome<M, E>>,
}

impl<M, E> Clone for Emitter<M, E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M, E> Emitter<M, E> {
    pub async fn emit(&self, outcome: Outcome<M, E>) -> Result<(), StreamClosed> {
        self.sender.send(outcome).await.map_err(|_| StreamClosed)
    }

    pub async fn mutate(&self, mutation: M) -> Result<(), StreamClosed> {
        self.emit(Outcome::Mutation(mutation)).await
    }

    pub async fn effect(&self, effect: E) -> Result<(), StreamClosed> {
        self.emit(Outcome::Effect(effect)).await
    }
}

/// Build a stream from an `async` producer polled inline by the consumer.
pub fn emit<M, E, F, Fut>(producer: F) -> OutcomeStream<M, E>
where
    M: Send + 'static,
    E: Send + 'static,
    F: FnOnce(Emitter<M, E>) -> Fut,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(1);
    let producer = producer(Emitter { sender }).boxed();
    EmitStream {
        producer: Some(producer),
        receiver,
        failure: None,
        done: false,
    }
    .boxed()
}

/// Like [`emit`], but the producer runs as its own task on `handle`.
pub fn spawn_on<M, E, F, Fut>(handle: &Handle, producer: F) -> OutcomeStream<M, E>
where
    M: Send + 'static,
    E: Send + 'static,
    F: FnOnce(Emitter<M, E>) -> Fut,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(1);
    let task = handle.spawn(producer(Emitter { sender }));
    SpawnedStream {
        task: Some(task),
        receiver,
        failure: None,
        done: false,
    }
    .boxed()
}

/// Stream over an already-known list of outcomes.
pub fn from_iter<M, E, I>(outcomes: I) -> OutcomeStream<M, E>
where
    M: Send + 'static,
    E: Send + 'static,
    I: IntoIterator<Item = Outcome<M, E>>,
    I::IntoIter: Send + 'static,
{
    futures::stream::iter(outcomes.into_iter().map(Ok)).boxed()
}

pub fn empty<M, E>() -> OutcomeStream<M, E>
where
    M: Send + 'static,
    E: Send + 'static,
{
    futures::stream::empty().boxed()
}

/// Stream that fails immediately without producing any outcome.
pub fn fail<M, E>(error: impl Into<anyhow::Error>) -> OutcomeStream<M, E>
where
    M: Send + 'static,
    E: Send + 'static,
{
    futures::stream::once(futures::future::ready(Err(error.into()))).boxed()
}

struct EmitStream<M, E> {
    producer: Option<BoxFuture<'static, anyhow::Result<()>>>,
    receiver: mpsc::Receiver<Outcome<M, E>>,
    failure: Option<anyhow::Error>,
    done: bool,
}

impl<M, E> Unpin for EmitStream<M, E> {}

impl<M, E> Stream for EmitStream<M, E> {
    type Item = anyhow::Result<Outcome<M, E>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.done {
            return Poll::Ready(None);
        }

        if let Poll::Ready(Some(outcome)) = this.receiver.poll_recv(cx) {
            return Poll::Ready(Some(Ok(outcome)));
        }

        if let Some(producer) = this.producer.as_mut() {
            if let Poll::Ready(result) = producer.as_mut().poll(cx) {
                this.producer = None;
                if let Err(err) = result {
                    this.failure = Some(err);
                }
            }
        }

        finish_poll(&mut this.receiver, &mut this.failure, &mut this.done, cx)
    }
}

struct SpawnedStream<M, E> {
    task: Option<JoinHandle<anyhow::Result<()>>>,
    receiver: mpsc::Receiver<Outcome<M, E>>,
    failure: Option<anyhow::Error>,
    done: bool,
}

impl<M, E> Unpin for SpawnedStream<M, E> {}

impl<M, E> Stream for SpawnedStream<M, E> {
    type Item = anyhow::Result<Outcome<M, E>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.done {
            return Poll::Ready(None);
        }

        if let Poll::Ready(Some(outcome)) = this.receiver.poll_recv(cx) {
            return Poll::Ready(Some(Ok(outcome)));
        }

        if let Some(task) = this.task.as_mut() {
            // The stream ends when the task does, not when the channel closes:
            // a panicking task drops its emitter before its join result is ready.
            let Poll::Ready(joined) = Pin::new(task).poll(cx) else {
                return Poll::Pending;
            };
            this.task = None;
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => this.failure = Some(err),
                // Re-raise on the consumer side so the store's panic boundary sees it.
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => this.failure = Some(anyhow::anyhow!("producer task failed: {err}")),
            }
        }

        finish_poll(&mut this.receiver, &mut this.failure, &mut this.done, cx)
    }
}

impl<M, E> Drop for SpawnedStream<M, E> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Second receive after the producer has been driven: buffered outcomes win,
/// then a recorded failure, then end-of-stream once every emitter is gone.
fn finish_poll<M, E>(
    receiver: &mut mpsc::Receiver<Outcome<M, E>>,
    failure: &mut Option<anyhow::Error>,
    done: &mut bool,
    cx: &mut Context<'_>,
) -> Poll<Option<anyhow::Result<Outcome<M, E>>>> {
    match receiver.poll_recv(cx) {
        Poll::Ready(Some(outcome)) => Poll::Ready(Some(Ok(outcome))),
        Poll::Ready(None) => {
            *done = true;
            Poll::Ready(failure.take().map(Err))
        }
        Poll::Pending => match failure.take() {
            Some(err) => {
                *done = true;
                Poll::Ready(Some(Err(err)))
            }
            None => Poll::Pending,
        },
    }
}

//! Processor trait: the asynchronous business-logic stage.

use std::future::Future;

use futures::stream::BoxStream;
use tokio::runtime::Handle;

use super::intent::Intent;
use super::outcome::Outcome;
use super::state::State;
use crate::outcomes::{self, Emitter};

/// Lazy, possibly suspending sequence of outcomes for one intent.
///
/// An `Err` item ends processing of the intent: the store stops pulling and
/// routes the error to its error handler.
pub type OutcomeStream<M, E> = BoxStream<'static, anyhow::Result<Outcome<M, E>>>;

/// Turns intents into outcome streams.
///
/// `process` must not block; any slow work belongs inside the returned
/// stream, which the store polls on its drain task. The snapshot is the
/// state observed when the intent began draining and is not refreshed while
/// the stream runs, even if earlier outcomes of the same intent already
/// replaced the store's state.
pub trait Processor: Send + Sync + 'static {
    type Intent: Intent;
    type State: State;
    type Mutation: Send + 'static;
    type Effect: Send + 'static;

    fn process(
        &self,
        intent: Self::Intent,
        snapshot: Self::State,
        ctx: &ProcessContext,
    ) -> OutcomeStream<Self::Mutation, Self::Effect>;
}

/// Per-intent context handed to [`Processor::process`].
#[derive(Debug, Clone)]
pub struct ProcessContext {
    intent_seq: u64,
    handle: Handle,
}

impl ProcessContext {
    pub fn new(intent_seq: u64, handle: Handle) -> Self {
        Self { intent_seq, handle }
    }

    /// Submission order of the intent being processed, starting at 1.
    pub fn intent_seq(&self) -> u64 {
        self.intent_seq
    }

    /// Execution context configured for processor work.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Run `producer` as a task on the processing runtime and stream what it
    /// emits. Dropping the stream aborts the task.
    pub fn spawn_outcomes<M, E, F, Fut>(&self, producer: F) -> OutcomeStream<M, E>
    where
        M: Send + 'static,
        E: Send + 'static,
        F: FnOnce(Emitter<M, E>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        outcomes::spawn_on(&self.handle, producer)
    }
}

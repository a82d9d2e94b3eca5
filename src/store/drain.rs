//! The store's single sequential task.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::StreamExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::intake::Control;
use super::lifecycle::DrainPhase;
use super::state_cell::StateCell;
use crate::error::{panic_message, ErrorHandler, StoreError};
use crate::mvi::{Outcome, ProcessContext, Processor, Reducer};

/// Owns everything the drain task touches. Only this task replaces state,
/// so the reducer never runs concurrently with itself.
pub(crate) struct DrainLoop<P, R>
where
    P: Processor,
{
    pub(crate) processor: P,
    pub(crate) reducer: R,
    pub(crate) intake: mpsc::Receiver<P::Intent>,
    pub(crate) effects: mpsc::Sender<P::Effect>,
    pub(crate) state: Arc<StateCell<P::State>>,
    pub(crate) control: Arc<Control>,
    pub(crate) errors: Arc<dyn ErrorHandler>,
    pub(crate) processing: Handle,
}

impl<P, R> DrainLoop<P, R>
where
    P: Processor,
    R: Reducer<State = P::State, Mutation = P::Mutation>,
{
    pub(crate) async fn run(mut self) {
        let control = Arc::clone(&self.control);
        let state = Arc::clone(&self.state);
        // Runs on normal exit, on a panic, and when the task is dropped
        // mid-drain. Signalling releases `wait_idle` callers and rejects
        // further submits.
        let _finalize = scopeguard::guard((), move |_| {
            control.lifecycle.signal();
            control.lifecycle.advance(DrainPhase::TornDown);
            state.close();
        });

        let mut intent_seq = 0u64;
        loop {
            let intent = tokio::select! {
                biased;
                _ = self.control.lifecycle.wait() => break,
                next = self.intake.recv() => match next {
                    Some(intent) => intent,
                    None => break,
                },
            };

            intent_seq += 1;
            self.control.lifecycle.advance(DrainPhase::Draining);
            tracing::debug!(intent_seq, "Draining intent");

            let lifecycle = &self.control.lifecycle;
            let result = tokio::select! {
                biased;
                _ = lifecycle.wait() => {
                    tracing::debug!(intent_seq, "Teardown cancelled in-flight intent");
                    break;
                }
                result = Self::drain_intent(
                    &self.processor,
                    &self.reducer,
                    &self.state,
                    &self.effects,
                    &self.processing,
                    intent_seq,
                    intent,
                ) => result,
            };

            if let Err(err) = result {
                self.report(intent_seq, err);
            }
            self.control.finish_one();
            self.control.lifecycle.advance(DrainPhase::Idle);
        }

        self.intake.close();
        let mut discarded = 0usize;
        while self.intake.try_recv().is_ok() {
            discarded += 1;
        }
        tracing::debug!(discarded, "Drain loop stopped");
    }

    /// Hand a drain failure to the error handler. A panicking handler is
    /// logged and the loop keeps going.
    fn report(&self, intent_seq: u64, err: StoreError) {
        let errors = &self.errors;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| errors.on_error(err))) {
            tracing::error!(
                intent_seq,
                panic = %panic_message(&*payload),
                "Error handler panicked"
            );
        }
    }

    /// Pull one intent's outcomes to exhaustion, applying each in order.
    async fn drain_intent(
        processor: &P,
        reducer: &R,
        state: &StateCell<P::State>,
        effects: &mpsc::Sender<P::Effect>,
        processing: &Handle,
        intent_seq: u64,
        intent: P::Intent,
    ) -> Result<(), StoreError> {
        let snapshot = state.snapshot();
        let ctx = ProcessContext::new(intent_seq, processing.clone());

        let stream = panic::catch_unwind(AssertUnwindSafe(|| {
            processor.process(intent, snapshot, &ctx)
        }))
        .map_err(|payload| StoreError::ProcessorPanicked {
            intent_seq,
            message: panic_message(&*payload),
        })?;

        let mut stream = AssertUnwindSafe(stream).catch_unwind();
        while let Some(next) = stream.next().await {
            let outcome = match next {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(source)) => return Err(StoreError::Processing { intent_seq, source }),
                Err(payload) => {
                    return Err(StoreError::ProcessorPanicked {
                        intent_seq,
                        message: panic_message(&*payload),
                    })
                }
            };

            tracing::trace!(intent_seq, kind = outcome.kind(), "Outcome");
            match outcome {
                Outcome::Mutation(mutation) => {
                    let current = state.snapshot();
                    let next = panic::catch_unwind(AssertUnwindSafe(|| {
                        reducer.reduce(&current, mutation)
                    }))
                    .map_err(|payload| StoreError::ReducerPanicked {
                        intent_seq,
                        message: panic_message(&*payload),
                    })?;
                    state.replace(next);
                }
                Outcome::Effect(effect) => {
                    // Waits while the buffer is full.
                    if effects.send(effect).await.is_err() {
                        tracing::trace!(intent_seq, "Effect dropped (receiver gone)");
                    }
                }
            }
        }

        Ok(())
    }
}

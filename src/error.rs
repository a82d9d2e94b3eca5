//! Error types and the per-intent error boundary.

use std::any::Any;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors reported by a store.
///
/// `IntakeOverflow`, `TornDown`, `NoRuntime` and `Config` are returned
/// synchronously to the caller. The remaining variants are produced while
/// draining an intent and are routed to the store's [`ErrorHandler`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The intake queue is at capacity; the intent was not accepted.
    #[error("intake queue is full (capacity {capacity})")]
    IntakeOverflow { capacity: usize },

    /// The store has been torn down and accepts no more intents.
    #[error("store has been torn down")]
    TornDown,

    /// `build()` was called outside a tokio runtime and no handle was given.
    #[error("no tokio runtime available to run the store")]
    NoRuntime,

    /// Invalid store configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The processor's outcome stream yielded an error.
    #[error("processing intent #{intent_seq} failed: {source}")]
    Processing {
        intent_seq: u64,
        #[source]
        source: anyhow::Error,
    },

    /// The processor panicked while building or producing its outcomes.
    #[error("processor panicked on intent #{intent_seq}: {message}")]
    ProcessorPanicked { intent_seq: u64, message: String },

    /// The reducer panicked. Reducers must be total; this is a defect.
    #[error("reducer panicked on intent #{intent_seq}: {message}")]
    ReducerPanicked { intent_seq: u64, message: String },
}

impl StoreError {
    /// True for failures caused by how the store was called rather than by
    /// the work an intent did.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            StoreError::IntakeOverflow { .. }
                | StoreError::TornDown
                | StoreError::NoRuntime
                | StoreError::Config(_)
        )
    }

    /// Sequence number of the failing intent, for drain failures.
    pub fn intent_seq(&self) -> Option<u64> {
        match self {
            StoreError::Processing { intent_seq, .. }
            | StoreError::ProcessorPanicked { intent_seq, .. }
            | StoreError::ReducerPanicked { intent_seq, .. } => Some(*intent_seq),
            _ => None,
        }
    }
}

/// Receives every drain failure, once per failing intent.
///
/// The store keeps draining after the handler returns; retrying is the
/// submitter's business.
pub trait ErrorHandler: Send + Sync + 'static {
    fn on_error(&self, error: StoreError);
}

impl<F> ErrorHandler for F
where
    F: Fn(StoreError) + Send + Sync + 'static,
{
    fn on_error(&self, error: StoreError) {
        self(error)
    }
}

/// Default handler: report through `tracing` and continue.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn on_error(&self, error: StoreError) {
        tracing::error!(
            intent_seq = error.intent_seq(),
            error = %error,
            "Intent failed; continuing with next intent"
        );
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

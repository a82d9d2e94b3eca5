//! The orchestrator: owns state, the intake queue and the effect channel,
//! and drains intents one at a time on its own task.
//!
//! ```text
//!  submit ──→ [intake queue] ──→ drain task ──→ Processor::process
//!                                    │                 │
//!                                    │        Mutation │ Effect
//!                                    ▼                 ▼
//!                           Reducer → StateCell   [effect channel]
//!                                    │                 │
//!                               StateStream       EffectStream
//! ```
//!
//! Intents drain strictly in submission order and never interleave: the
//! processor for intent N+1 is not called until every outcome of intent N
//! has been applied.

mod drain;
mod effects;
mod intake;
mod lifecycle;
mod state_cell;

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::StoreConfig;
use crate::error::{ErrorHandler, LogErrorHandler, StoreError};
use crate::mvi::{Processor, Reducer};

use drain::DrainLoop;
use intake::Control;
use state_cell::StateCell;

pub use effects::EffectStream;
pub use intake::IntentSender;
pub use lifecycle::DrainPhase;
pub use state_cell::StateStream;

/// Handle to a running store.
///
/// Dropping the handle tears the store down.
pub struct Store<P: Processor> {
    intents: IntentSender<P::Intent>,
    state: Arc<StateCell<P::State>>,
    effects: EffectStream<P::Effect>,
    control: Arc<Control>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<P: Processor> Store<P> {
    /// Start configuring a store.
    pub fn builder<R>(initial: P::State, processor: P, reducer: R) -> StoreBuilder<P, R>
    where
        R: Reducer<State = P::State, Mutation = P::Mutation>,
    {
        StoreBuilder {
            initial,
            processor,
            reducer,
            config: StoreConfig::default(),
            errors: None,
            runtime: None,
            processing: None,
        }
    }

    /// Build a store with default configuration on the current runtime.
    ///
    /// # Errors
    /// `NoRuntime` when called outside a tokio runtime.
    pub fn new<R>(initial: P::State, processor: P, reducer: R) -> Result<Self, StoreError>
    where
        R: Reducer<State = P::State, Mutation = P::Mutation>,
    {
        Self::builder(initial, processor, reducer).build()
    }

    /// Queue an intent. Never waits.
    ///
    /// # Errors
    /// `IntakeOverflow` if the queue is full, `TornDown` after teardown.
    pub fn submit(&self, intent: P::Intent) -> Result<(), StoreError> {
        self.intents.submit(intent)
    }

    /// Cloneable submit handle for concurrent submitters.
    pub fn sender(&self) -> IntentSender<P::Intent> {
        self.intents.clone()
    }

    /// Latest state.
    pub fn snapshot(&self) -> P::State {
        self.state.snapshot()
    }

    /// Latest state immediately, then every replacement in order.
    pub fn states(&self) -> StateStream<P::State> {
        self.state.subscribe()
    }

    /// Number of live state observers.
    pub fn state_observers(&self) -> usize {
        self.state.observer_count()
    }

    /// Effect consumer handle; clones compete for effects.
    pub fn effects(&self) -> EffectStream<P::Effect> {
        self.effects.clone()
    }

    pub fn name(&self) -> &str {
        &self.control.name
    }

    pub fn phase(&self) -> DrainPhase {
        self.control.lifecycle.phase()
    }

    pub fn is_torn_down(&self) -> bool {
        self.control.lifecycle.is_torn_down()
    }

    /// Intents fully drained so far, failed ones included.
    pub fn processed(&self) -> u64 {
        self.control.processed()
    }

    /// Wait until every intent accepted before this call has drained.
    /// Returns straight away once the store is torn down.
    pub async fn wait_idle(&self) {
        let target = self.control.accepted();
        self.control.wait_processed(target).await;
    }

    /// Stop the store: cancel the in-flight intent at its current suspension
    /// point, discard queued intents, close the state and effect streams.
    /// Later calls are no-ops.
    pub async fn teardown(&self) {
        if self.control.lifecycle.signal() {
            tracing::info!(store = %self.control.name, "Store teardown initiated");
        }

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                if err.is_panic() {
                    tracing::error!(store = %self.control.name, "Drain task panicked");
                }
            }
            tracing::info!(store = %self.control.name, "Store torn down");
        }
    }
}

impl<P: Processor> Drop for Store<P> {
    fn drop(&mut self) {
        if self.control.lifecycle.signal() {
            tracing::debug!(store = %self.control.name, "Store dropped without teardown");
        }
    }
}

/// Configures and starts a [`Store`].
pub struct StoreBuilder<P: Processor, R> {
    initial: P::State,
    processor: P,
    reducer: R,
    config: StoreConfig,
    errors: Option<Arc<dyn ErrorHandler>>,
    runtime: Option<Handle>,
    processing: Option<Handle>,
}

impl<P, R> StoreBuilder<P, R>
where
    P: Processor,
    R: Reducer<State = P::State, Mutation = P::Mutation>,
{
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default log-and-continue error handler.
    pub fn error_handler(mut self, handler: impl ErrorHandler) -> Self {
        self.errors = Some(Arc::new(handler));
        self
    }

    /// Runtime the drain task is spawned on. Defaults to the current one.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Runtime handed to processors for background work
    /// ([`ProcessContext::spawn_outcomes`](crate::mvi::ProcessContext::spawn_outcomes)).
    /// Defaults to the drain runtime.
    pub fn processing_runtime(mut self, handle: Handle) -> Self {
        self.processing = Some(handle);
        self
    }

    /// Validate the configuration and spawn the drain task.
    ///
    /// # Errors
    /// `Config` for invalid capacities, `NoRuntime` if no runtime was given
    /// and none is current.
    pub fn build(self) -> Result<Store<P>, StoreError> {
        self.config.validate()?;

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| StoreError::NoRuntime)?,
        };
        let processing = self.processing.unwrap_or_else(|| runtime.clone());

        let StoreConfig {
            name,
            intake_capacity,
            effect_capacity,
        } = self.config;

        let (intake_tx, intake_rx) = mpsc::channel(intake_capacity);
        let (effect_tx, effect_rx) = mpsc::channel(effect_capacity);
        let control = Arc::new(Control::new(name.clone(), intake_capacity));
        let state = Arc::new(StateCell::new(self.initial));

        let drain = DrainLoop {
            processor: self.processor,
            reducer: self.reducer,
            intake: intake_rx,
            effects: effect_tx,
            state: Arc::clone(&state),
            control: Arc::clone(&control),
            errors: self
                .errors
                .unwrap_or_else(|| Arc::new(LogErrorHandler) as Arc<dyn ErrorHandler>),
            processing,
        };

        let span = tracing::info_span!("store", name = %name);
        let task = runtime.spawn(drain.run().instrument(span));
        tracing::debug!(store = %name, intake_capacity, effect_capacity, "Store started");

        Ok(Store {
            intents: IntentSender::new(intake_tx, Arc::clone(&control)),
            state,
            effects: EffectStream::new(effect_rx),
            control,
            task: Mutex::new(Some(task)),
        })
    }
}

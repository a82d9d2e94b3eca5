//! Unidirectional state management in the Model-View-Intent style.
//!
//! A [`Store`] accepts intents, hands each one to a [`Processor`] that
//! produces a stream of [`Outcome`]s, folds mutations into state with a pure
//! [`Reducer`] and delivers effects once to a listener. Intents drain one at
//! a time in submission order.

pub mod config;
pub mod demo;
pub mod error;
pub mod logging;
pub mod mvi;
pub mod outcomes;
pub mod store;
pub mod testing;

pub use config::{ConfigError, StoreConfig};
pub use error::{ErrorHandler, LogErrorHandler, StoreError};
pub use mvi::{Intent, Outcome, OutcomeStream, ProcessContext, Processor, Reducer, State};
pub use store::{DrainPhase, EffectStream, IntentSender, StateStream, Store, StoreBuilder};

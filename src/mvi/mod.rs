//! Model-View-Intent (MVI) architecture primitives.
//!
//! This module provides the contract types for unidirectional data flow:
//!
//! ```text
//! Intent ──→ Processor ──→ Outcome ──┬─ Mutation ──→ Reducer ──→ State
//!    ↑                               └─ Effect ───→ listener      │
//!    └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **State**: Immutable snapshot of everything a consumer renders
//! - **Intent**: User actions or external events
//! - **Processor**: Turns one intent into a lazy stream of outcomes
//! - **Outcome**: Either a mutation (folded into state) or an effect (delivered once)
//! - **Reducer**: Pure function that folds a mutation into state

mod intent;
mod outcome;
mod processor;
mod reducer;
mod state;

pub use intent::Intent;
pub use outcome::Outcome;
pub use processor::{OutcomeStream, ProcessContext, Processor};
pub use reducer::{reducer_fn, FnReducer, Reducer};
pub use state::State;

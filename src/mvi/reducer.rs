//! Reducer trait for MVI architecture.

use std::marker::PhantomData;

use super::state::State;

/// Reducer folds mutations into state.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (&State, Mutation) -> State. The input
/// state is borrowed, so it can be neither mutated nor retained.
///
/// A mutation that makes no sense for the current state must still yield
/// a valid state (usually the input, cloned). Panicking is a programming
/// defect; the store reports it through its error handler.
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: State;

    /// The mutation type this reducer handles.
    type Mutation: Send + 'static;

    /// Apply a mutation and return the new state.
    fn reduce(&self, state: &Self::State, mutation: Self::Mutation) -> Self::State;
}

/// Reducer backed by a plain function or closure.
pub struct FnReducer<S, M, F> {
    reduce: F,
    _marker: PhantomData<fn(&S, M) -> S>,
}

/// Wrap a closure as a [`Reducer`].
pub fn reducer_fn<S, M, F>(reduce: F) -> FnReducer<S, M, F>
where
    S: State,
    M: Send + 'static,
    F: Fn(&S, M) -> S + Send + Sync + 'static,
{
    FnReducer {
        reduce,
        _marker: PhantomData,
    }
}

impl<S, M, F> Reducer for FnReducer<S, M, F>
where
    S: State,
    M: Send + 'static,
    F: Fn(&S, M) -> S + Send + Sync + 'static,
{
    type State = S;
    type Mutation = M;

    fn reduce(&self, state: &S, mutation: M) -> S {
        (self.reduce)(state, mutation)
    }
}

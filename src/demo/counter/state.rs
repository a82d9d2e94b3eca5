use serde::Serialize;

use crate::mvi::State;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CounterState {
    pub count: i64,
    pub message: String,
}

impl State for CounterState {}

impl CounterState {
    pub fn with_count(count: i64) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }
}

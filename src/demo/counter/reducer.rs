use crate::mvi::Reducer;

use super::intent::CounterMutation;
use super::state::CounterState;

pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = CounterState;
    type Mutation = CounterMutation;

    fn reduce(&self, state: &Self::State, mutation: Self::Mutation) -> Self::State {
        match mutation {
            CounterMutation::Add(delta) => CounterState {
                count: state.count.saturating_add(delta),
                ..state.clone()
            },
            CounterMutation::SetCount(count) => CounterState {
                count,
                ..state.clone()
            },
            CounterMutation::SetMessage(message) => CounterState {
                message,
                ..state.clone()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_changes_only_count() {
        let state = CounterState {
            count: 2,
            message: "keep".to_string(),
        };
        let next = CounterReducer.reduce(&state, CounterMutation::Add(-5));
        assert_eq!(next.count, -3);
        assert_eq!(next.message, "keep");
    }

    #[test]
    fn add_saturates() {
        let state = CounterState::with_count(i64::MAX);
        let next = CounterReducer.reduce(&state, CounterMutation::Add(1));
        assert_eq!(next.count, i64::MAX);
    }

    #[test]
    fn set_message_keeps_count() {
        let state = CounterState::with_count(9);
        let next = CounterReducer.reduce(&state, CounterMutation::SetMessage("x".to_string()));
        assert_eq!(next, CounterState { count: 9, message: "x".to_string() });
    }
}

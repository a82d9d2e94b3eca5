mod intent;
mod processor;
mod reducer;
mod state;

pub use intent::{CounterEffect, CounterIntent, CounterMutation, ParseIntentError};
pub use processor::CounterProcessor;
pub use reducer::CounterReducer;
pub use state::CounterState;

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::mvi::Intent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterIntent {
    Increment,
    Decrement,
    /// Zero the counter and notify the listener.
    Reset,
    SetMessage(String),
    /// Always fails in the processor; exercises the error boundary.
    Fail,
    /// Increment after a delay, computed on the processing runtime.
    SlowIncrement { delay_ms: u64 },
}

impl Intent for CounterIntent {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterMutation {
    Add(i64),
    SetCount(i64),
    SetMessage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CounterEffect {
    Notify(String),
}

#[derive(Debug, Error)]
#[error("unknown intent '{0}' (expected inc, dec, reset, fail, msg=<text> or slow=<ms>)")]
pub struct ParseIntentError(String);

/// Command-line spelling: `inc`, `dec`, `reset`, `fail`, `msg=<text>`,
/// `slow=<ms>`.
impl FromStr for CounterIntent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inc" => return Ok(CounterIntent::Increment),
            "dec" => return Ok(CounterIntent::Decrement),
            "reset" => return Ok(CounterIntent::Reset),
            "fail" => return Ok(CounterIntent::Fail),
            _ => {}
        }

        if let Some(text) = s.strip_prefix("msg=") {
            return Ok(CounterIntent::SetMessage(text.to_string()));
        }
        if let Some(ms) = s.strip_prefix("slow=") {
            let delay_ms = ms.parse().map_err(|_| ParseIntentError(s.to_string()))?;
            return Ok(CounterIntent::SlowIncrement { delay_ms });
        }

        Err(ParseIntentError(s.to_string()))
    }
}

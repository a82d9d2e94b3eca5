//! Helpers for asserting on store output.
//!
//! These only use the public store surface: outcome streams, state streams,
//! effect streams and the error-handler hook.

mod collect;
mod gate;
mod recorder;

pub use collect::{collect_prefix, only_effects, only_mutations};
pub use gate::Gate;
pub use recorder::{EffectRecorder, ErrorRecorder, Recorder, StateRecorder};

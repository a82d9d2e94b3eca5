//! Base trait for intents (user/system actions) in MVI architecture.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions (button clicks, key presses)
/// - System events (API responses, timers)
///
/// An intent is consumed exactly once by a processor.
pub trait Intent: Send + 'static {}

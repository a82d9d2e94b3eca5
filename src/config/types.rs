use serde::{Deserialize, Serialize};

/// Tunables for one store instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name attached to every log line the store emits (default: "store").
    #[serde(default = "default_name")]
    pub name: String,
    /// Intents that may wait in the intake queue before `submit` fails
    /// with an overflow (default: 64).
    #[serde(default = "default_intake_capacity")]
    pub intake_capacity: usize,
    /// Effects buffered for the listener before the drain loop waits
    /// (default: 16).
    #[serde(default = "default_effect_capacity")]
    pub effect_capacity: usize,
}

fn default_name() -> String {
    "store".to_string()
}

fn default_intake_capacity() -> usize {
    64
}

fn default_effect_capacity() -> usize {
    16
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            intake_capacity: default_intake_capacity(),
            effect_capacity: default_effect_capacity(),
        }
    }
}

impl StoreConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_intake_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self
    }

    pub fn with_effect_capacity(mut self, capacity: usize) -> Self {
        self.effect_capacity = capacity;
        self
    }
}

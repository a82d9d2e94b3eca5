//! Outcome model: the closed two-kind result of processing an intent.

/// A single value produced by a processor for one intent.
///
/// The store dispatches on the variant, so applications add new outcome
/// shapes by extending their own `M` and `E` types without touching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<M, E> {
    /// Folded into state through the reducer. Never delivered as an effect.
    Mutation(M),
    /// Delivered once to an effect listener. Never folded into state.
    Effect(E),
}

impl<M, E> Outcome<M, E> {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Mutation(_))
    }

    pub fn is_effect(&self) -> bool {
        matches!(self, Self::Effect(_))
    }

    pub fn into_mutation(self) -> Option<M> {
        match self {
            Self::Mutation(mutation) => Some(mutation),
            Self::Effect(_) => None,
        }
    }

    pub fn into_effect(self) -> Option<E> {
        match self {
            Self::Mutation(_) => None,
            Self::Effect(effect) => Some(effect),
        }
    }

    /// Short label used in trace output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mutation(_) => "mutation",
            Self::Effect(_) => "effect",
        }
    }
}

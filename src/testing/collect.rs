use futures::StreamExt;
use futures_core::Stream;

use crate::mvi::Outcome;

/// Collect at most `limit` outcomes, stopping early when the stream ends.
///
/// The first error ends collection and is returned.
pub async fn collect_prefix<M, E, S>(
    mut stream: S,
    limit: usize,
) -> anyhow::Result<Vec<Outcome<M, E>>>
where
    S: Stream<Item = anyhow::Result<Outcome<M, E>>> + Unpin,
{
    let mut collected = Vec::new();
    while collected.len() < limit {
        match stream.next().await {
            Some(outcome) => collected.push(outcome?),
            None => break,
        }
    }
    Ok(collected)
}

pub fn only_mutations<M, E>(outcomes: impl IntoIterator<Item = Outcome<M, E>>) -> Vec<M> {
    outcomes.into_iter().filter_map(Outcome::into_mutation).collect()
}

pub fn only_effects<M, E>(outcomes: impl IntoIterator<Item = Outcome<M, E>>) -> Vec<E> {
    outcomes.into_iter().filter_map(Outcome::into_effect).collect()
}

use std::time::Duration;

use crate::mvi::{Outcome, OutcomeStream, ProcessContext, Processor};
use crate::outcomes;

use super::intent::{CounterEffect, CounterIntent, CounterMutation};
use super::state::CounterState;

pub struct CounterProcessor;

impl Processor for CounterProcessor {
    type Intent = CounterIntent;
    type State = CounterState;
    type Mutation = CounterMutation;
    type Effect = CounterEffect;

    fn process(
        &self,
        intent: CounterIntent,
        snapshot: CounterState,
        ctx: &ProcessContext,
    ) -> OutcomeStream<CounterMutation, CounterEffect> {
        match intent {
            CounterIntent::Increment => {
                outcomes::from_iter([Outcome::Mutation(CounterMutation::Add(1))])
            }
            CounterIntent::Decrement => {
                outcomes::from_iter([Outcome::Mutation(CounterMutation::Add(-1))])
            }
            CounterIntent::Reset => outcomes::from_iter([
                Outcome::Mutation(CounterMutation::SetCount(0)),
                Outcome::Effect(CounterEffect::Notify("reset".to_string())),
            ]),
            CounterIntent::SetMessage(message) => {
                outcomes::from_iter([Outcome::Mutation(CounterMutation::SetMessage(message))])
            }
            CounterIntent::Fail => outcomes::fail(anyhow::anyhow!(
                "requested failure at count {}",
                snapshot.count
            )),
            CounterIntent::SlowIncrement { delay_ms } => ctx.spawn_outcomes(move |out| async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                out.mutate(CounterMutation::Add(1)).await?;
                out.effect(CounterEffect::Notify(format!(
                    "{} -> {}",
                    snapshot.count,
                    snapshot.count + 1
                )))
                .await?;
                Ok(())
            }),
        }
    }
}

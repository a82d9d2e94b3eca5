//! Shared test utilities: a scripted processor whose intents spell out the
//! outcomes they produce.

#![allow(dead_code, unused_imports)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mvistore::demo::counter::{CounterProcessor, CounterReducer, CounterState};
use mvistore::mvi::{Intent, OutcomeStream, ProcessContext, Processor, Reducer, State};
use mvistore::outcomes;
use mvistore::testing::{ErrorRecorder, Gate};
use mvistore::{Store, StoreConfig};
use parking_lot::Mutex;

pub const WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tally {
    pub total: i64,
}

impl State for Tally {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyMutation {
    Add(i64),
    Set(i64),
    /// Makes the reducer panic.
    Explode,
}

pub struct TallyReducer;

impl Reducer for TallyReducer {
    type State = Tally;
    type Mutation = TallyMutation;

    fn reduce(&self, state: &Tally, mutation: TallyMutation) -> Tally {
        match mutation {
            TallyMutation::Add(delta) => Tally {
                total: state.total + delta,
            },
            TallyMutation::Set(total) => Tally { total },
            TallyMutation::Explode => panic!("reducer exploded at {}", state.total),
        }
    }
}

#[derive(Clone)]
pub enum Step {
    Add(i64),
    /// `Set(snapshot.total + offset)`, using the intent's snapshot.
    SetFromSnapshot(i64),
    Effect(String),
    Explode,
    Fail(String),
    Panic,
    Wait(Gate),
    SleepMs(u64),
    /// Flag set when the script's future is dropped or completes.
    OnDrop(Arc<AtomicBool>),
}

#[derive(Clone)]
pub struct Script {
    pub label: String,
    pub steps: Vec<Step>,
    /// Panic inside `process` itself, before any stream exists.
    pub eager_panic: bool,
    /// Run the steps as a task on the processing runtime.
    pub spawned: bool,
}

impl Intent for Script {}

impl Script {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            steps: Vec::new(),
            eager_panic: false,
            spawned: false,
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn add(self, delta: i64) -> Self {
        self.step(Step::Add(delta))
    }

    pub fn effect(self, text: &str) -> Self {
        self.step(Step::Effect(text.to_string()))
    }

    pub fn fail(self, message: &str) -> Self {
        self.step(Step::Fail(message.to_string()))
    }

    pub fn wait(self, gate: &Gate) -> Self {
        self.step(Step::Wait(gate.clone()))
    }

    pub fn eager_panic(mut self) -> Self {
        self.eager_panic = true;
        self
    }

    pub fn spawned(mut self) -> Self {
        self.spawned = true;
        self
    }
}

/// Runs [`Script`] intents and records which labels it was called with, and
/// on which thread the spawned ones ran.
#[derive(Clone, Default)]
pub struct ScriptProcessor {
    pub entered: Arc<Mutex<Vec<String>>>,
    pub threads: Arc<Mutex<Vec<String>>>,
}

impl ScriptProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entered(&self) -> Vec<String> {
        self.entered.lock().clone()
    }
}

impl Processor for ScriptProcessor {
    type Intent = Script;
    type State = Tally;
    type Mutation = TallyMutation;
    type Effect = String;

    fn process(
        &self,
        intent: Script,
        snapshot: Tally,
        ctx: &ProcessContext,
    ) -> OutcomeStream<TallyMutation, String> {
        self.entered.lock().push(intent.label.clone());
        if intent.eager_panic {
            panic!("eager panic in {}", intent.label);
        }

        let steps = intent.steps;
        let threads = Arc::clone(&self.threads);
        if intent.spawned {
            ctx.spawn_outcomes(move |out| async move {
                let name = std::thread::current().name().unwrap_or("unnamed").to_string();
                threads.lock().push(name);
                run_steps(steps, snapshot, out).await
            })
        } else {
            outcomes::emit(move |out| run_steps(steps, snapshot, out))
        }
    }
}

async fn run_steps(
    steps: Vec<Step>,
    snapshot: Tally,
    out: outcomes::Emitter<TallyMutation, String>,
) -> anyhow::Result<()> {
    let mut guards = Vec::new();
    for step in steps {
        match step {
            Step::Add(delta) => out.mutate(TallyMutation::Add(delta)).await?,
            Step::SetFromSnapshot(offset) => {
                out.mutate(TallyMutation::Set(snapshot.total + offset)).await?
            }
            Step::Effect(text) => out.effect(text).await?,
            Step::Explode => out.mutate(TallyMutation::Explode).await?,
            Step::Fail(message) => anyhow::bail!(message),
            Step::Panic => panic!("panic inside outcome stream"),
            Step::Wait(gate) => gate.wait().await,
            Step::SleepMs(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            Step::OnDrop(flag) => guards.push(scopeguard::guard(flag, |flag| {
                flag.store(true, Ordering::SeqCst)
            })),
        }
    }
    Ok(())
}

pub fn script_store(
    config: StoreConfig,
) -> (Store<ScriptProcessor>, ScriptProcessor, ErrorRecorder) {
    let processor = ScriptProcessor::new();
    let errors = ErrorRecorder::new();
    let store = Store::builder(Tally::default(), processor.clone(), TallyReducer)
        .config(config)
        .error_handler(errors.clone())
        .build()
        .expect("store builds");
    (store, processor, errors)
}

pub fn counter_store(config: StoreConfig) -> (Store<CounterProcessor>, ErrorRecorder) {
    let errors = ErrorRecorder::new();
    let store = Store::builder(CounterState::default(), CounterProcessor, CounterReducer)
        .config(config)
        .error_handler(errors.clone())
        .build()
        .expect("store builds");
    (store, errors)
}

/// `wait_idle` with a timeout so a broken store fails the test instead of
/// hanging it.
pub async fn settle<P: Processor>(store: &Store<P>) {
    tokio::time::timeout(WAIT, store.wait_idle())
        .await
        .expect("store settled in time");
}

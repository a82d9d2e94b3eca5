mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{script_store, settle, Script, ScriptProcessor, Step, Tally, TallyReducer, WAIT};
use mvistore::testing::{ErrorRecorder, Gate, StateRecorder};
use mvistore::{DrainPhase, Store, StoreConfig, StoreError};

#[tokio::test]
async fn full_intake_rejects_without_waiting() {
    let (store, _, _) = script_store(StoreConfig::default().with_intake_capacity(1));
    let gate = Gate::new();

    store.submit(Script::new("held").wait(&gate)).unwrap();
    assert!(gate.wait_entered(1, WAIT).await);

    store.submit(Script::new("queued").add(1)).unwrap();
    let rejected = store.submit(Script::new("overflow").add(100));
    assert!(matches!(
        rejected,
        Err(StoreError::IntakeOverflow { capacity: 1 })
    ));

    gate.open();
    settle(&store).await;
    assert_eq!(store.snapshot(), Tally { total: 1 });
    assert_eq!(store.processed(), 2);

    store.teardown().await;
}

#[tokio::test]
async fn submit_after_teardown_is_rejected() {
    let (store, _, _) = script_store(StoreConfig::default());
    let sender = store.sender();
    store.teardown().await;

    assert!(matches!(store.submit(Script::new("late")), Err(StoreError::TornDown)));
    assert!(matches!(sender.submit(Script::new("late")), Err(StoreError::TornDown)));
    assert!(sender.is_closed());
    assert!(store.is_torn_down());
    assert_eq!(store.phase(), DrainPhase::TornDown);
}

#[tokio::test]
async fn teardown_cancels_in_flight_intent_and_discards_queue() {
    let (store, processor, errors) = script_store(StoreConfig::default());
    let gate = Gate::new();
    let dropped = Arc::new(AtomicBool::new(false));

    store
        .submit(
            Script::new("in-flight")
                .step(Step::OnDrop(dropped.clone()))
                .add(1)
                .wait(&gate)
                .add(100),
        )
        .unwrap();
    store.submit(Script::new("queued").add(1000)).unwrap();
    assert!(gate.wait_entered(1, WAIT).await);

    tokio::time::timeout(WAIT, store.teardown())
        .await
        .expect("teardown finished");

    assert!(dropped.load(Ordering::SeqCst));
    assert_eq!(store.snapshot(), Tally { total: 1 });
    assert_eq!(processor.entered(), vec!["in-flight"]);
    assert_eq!(errors.count(), 0);

    // Opening the gate afterwards must not resume anything.
    gate.open();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.snapshot(), Tally { total: 1 });
}

#[tokio::test]
async fn teardown_ends_state_and_effect_streams() {
    let (store, _, _) = script_store(StoreConfig::default());
    store.submit(Script::new("one").add(1).effect("fx")).unwrap();
    settle(&store).await;

    let states = StateRecorder::from_states(store.states());
    let effects = store.effects();
    assert!(states.wait_for_len(1, WAIT).await);
    store.teardown().await;

    let mut late = store.states();
    assert_eq!(late.recv().await, Some(Tally { total: 1 }));
    assert_eq!(late.recv().await, None);

    assert_eq!(effects.recv().await.as_deref(), Some("fx"));
    assert_eq!(effects.recv().await, None);
    states.assert_sequence(&[Tally { total: 1 }]);
    assert_eq!(store.state_observers(), 0);
}

#[tokio::test]
async fn teardown_is_idempotent_and_releases_waiters() {
    let (store, _, _) = script_store(StoreConfig::default());
    let gate = Gate::new();
    store.submit(Script::new("stuck").wait(&gate)).unwrap();
    assert!(gate.wait_entered(1, WAIT).await);

    let store = Arc::new(store);
    let waiter = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.wait_idle().await })
    };

    store.teardown().await;
    store.teardown().await;
    tokio::time::timeout(WAIT, waiter)
        .await
        .expect("wait_idle released")
        .expect("waiter joined");
    settle(&store).await;
}

#[tokio::test]
async fn dropping_the_store_closes_its_senders() {
    let (store, _, _) = script_store(StoreConfig::default());
    let sender = store.sender();
    drop(store);

    assert!(sender.is_closed());
    assert!(matches!(sender.submit(Script::new("orphan")), Err(StoreError::TornDown)));
}

#[test]
fn build_outside_a_runtime_fails() {
    let result = Store::builder(Tally::default(), ScriptProcessor::new(), TallyReducer).build();
    assert!(matches!(result, Err(StoreError::NoRuntime)));
}

#[test]
fn build_with_explicit_runtime_outside_async_context() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("runtime");

    let store = Store::builder(Tally::default(), ScriptProcessor::new(), TallyReducer)
        .runtime(runtime.handle().clone())
        .build()
        .expect("store builds");
    store.submit(Script::new("x").add(3)).unwrap();

    runtime.block_on(async {
        tokio::time::timeout(WAIT, store.wait_idle())
            .await
            .expect("settled");
        assert_eq!(store.snapshot(), Tally { total: 3 });
        store.teardown().await;
    });
}

#[test]
fn runtime_shutdown_marks_the_store_torn_down() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("runtime");
    let gate = Gate::new();

    let store = Store::builder(Tally::default(), ScriptProcessor::new(), TallyReducer)
        .runtime(runtime.handle().clone())
        .build()
        .expect("store builds");
    store.submit(Script::new("held").wait(&gate)).unwrap();
    assert!(runtime.block_on(gate.wait_entered(1, WAIT)));

    // Drops the drain task mid-intent.
    runtime.shutdown_timeout(WAIT);

    assert!(store.is_torn_down());
    assert_eq!(store.phase(), DrainPhase::TornDown);
    assert!(matches!(store.submit(Script::new("late")), Err(StoreError::TornDown)));

    let waiter = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("waiter runtime");
    waiter.block_on(async {
        tokio::time::timeout(WAIT, store.wait_idle())
            .await
            .expect("wait_idle released");
    });
}

#[tokio::test]
async fn invalid_config_is_rejected_at_build() {
    let result = Store::builder(Tally::default(), ScriptProcessor::new(), TallyReducer)
        .config(StoreConfig::default().with_effect_capacity(0))
        .error_handler(ErrorRecorder::new())
        .build();
    match result {
        Err(StoreError::Config(err)) => assert!(err.to_string().contains("effect_capacity")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("zero effect capacity accepted"),
    }
}

#[tokio::test]
async fn spawned_producers_run_on_the_processing_runtime() {
    let processing = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("mvistore-processing")
        .enable_all()
        .build()
        .expect("processing runtime");

    let processor = ScriptProcessor::new();
    let store = Store::builder(Tally::default(), processor.clone(), TallyReducer)
        .processing_runtime(processing.handle().clone())
        .build()
        .expect("store builds");

    store.submit(Script::new("bg").add(2).spawned()).unwrap();
    settle(&store).await;

    assert_eq!(store.snapshot(), Tally { total: 2 });
    assert_eq!(
        processor.threads.lock().clone(),
        vec!["mvistore-processing".to_string()]
    );

    store.teardown().await;
    processing.shutdown_background();
}

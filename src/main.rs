use std::path::PathBuf;

use clap::Parser;
use mvistore::demo::counter::{CounterIntent, CounterProcessor, CounterReducer, CounterState};
use mvistore::{logging, Store, StoreConfig, StoreError};
use tokio::task::JoinHandle;

/// Drive the counter sample store from the command line.
#[derive(Debug, Parser)]
#[command(name = "mvistore", version, about)]
struct Cli {
    /// TOML file with store settings (name, intake_capacity, effect_capacity).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print states and effects as JSON lines.
    #[arg(long)]
    json: bool,

    /// Intents to submit in order: inc, dec, reset, fail, msg=<text>, slow=<ms>.
    intents: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Some(path) = logging::init_tracing() {
        eprintln!("Logging to {}", path);
    }

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => StoreConfig::load_from(path)?,
        None => StoreConfig::named("counter"),
    };
    let intents = cli
        .intents
        .iter()
        .map(|raw| raw.parse::<CounterIntent>())
        .collect::<Result<Vec<_>, _>>()?;

    let store = Store::builder(CounterState::default(), CounterProcessor, CounterReducer)
        .config(config)
        .error_handler(|err: StoreError| eprintln!("error: {}", err))
        .build()?;

    let mut states = store.states();
    let effects = store.effects();
    let json = cli.json;
    let printer = tokio::spawn(async move {
        while let Some(effect) = effects.recv().await {
            if json {
                match serde_json::to_string(&effect) {
                    Ok(line) => println!("{{\"effect\":{}}}", line),
                    Err(err) => eprintln!("error: {}", err),
                }
            } else {
                println!("effect: {:?}", effect);
            }
        }
    });

    for intent in intents {
        if let Err(err) = store.submit(intent) {
            eprintln!("rejected: {}", err);
        }
    }

    store.wait_idle().await;
    store.teardown().await;
    join_printer(printer).await;

    while let Some(state) = states.recv().await {
        if json {
            println!("{{\"state\":{}}}", serde_json::to_string(&state)?);
        } else {
            println!("state: count={} message={:?}", state.count, state.message);
        }
    }

    Ok(())
}

/// Wait for the effect printer. Returns false if it panicked.
async fn join_printer(printer: JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(err) => {
            if err.is_panic() {
                tracing::error!("Effect printer panicked");
                eprintln!("error: effect printer panicked");
            }
            false
        }
    }
}

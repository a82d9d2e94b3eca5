use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "MVISTORE_LOG";

/// Initialize tracing with optional file output.
///
/// Logging is disabled unless `MVISTORE_LOG` names a file path. The level
/// comes from `RUST_LOG` and defaults to `info`.
///
/// Log files get unique names so concurrent processes don't clobber each
/// other: `{path}.{timestamp}.{pid}`. Returns the path actually written.
pub fn init_tracing() -> Option<String> {
    let log_path = std::env::var(LOG_ENV).ok()?;
    let unique_path = unique_log_path(&log_path);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Ok(file) = std::fs::File::create(&unique_path) else {
        eprintln!("Warning: Failed to create log file: {}", unique_path);
        return None;
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    if tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already installed");
        return None;
    }

    Some(unique_path)
}

fn unique_log_path(base: &str) -> String {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}.{}.{}", base, timestamp, pid)
}

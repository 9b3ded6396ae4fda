use envlift_core::ENVLIFT_LOG_VAR;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, trace, warn, Level};

/// Default filter when neither `ENVLIFT_LOG` nor `--debug` is given
const DEFAULT_FILTER: &str = "warn";

/// Initialize the tracing system
///
/// The filter is read from `ENVLIFT_LOG`; `debug` raises the default to `debug`
/// when that variable is unset. Everything goes to stderr so that the child
/// process keeps exclusive use of stdout.
pub fn init(debug: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let default_filter = if debug { "debug" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_env(ENVLIFT_LOG_VAR)
        .or_else(|_| EnvFilter::try_new(default_filter))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Check if stderr is attached to a terminal
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

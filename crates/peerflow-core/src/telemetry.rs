//! Tracing setup for Peerflow binaries.
//!
//! Call [`init_tracing`] once at program start. Workflow services emit
//! `info!` events at state transitions (review recorded, submission
//! completed, experience awarded, sync resolved); binaries default to
//! warnings only unless verbose.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// * `json` - emit newline-delimited JSON log lines instead of the
///   human-readable format.
/// * `verbose` - default to `debug` verbosity instead of `warn`.
///
/// The `RUST_LOG` environment variable, when set, overrides the verbose
/// flag entirely. Safe to call more than once; only the first call takes
/// effect.
pub fn init_tracing(json: bool, verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

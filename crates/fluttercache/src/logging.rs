//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout only ever carries `KEY=value` outputs.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    // A second init (e.g. in tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "fluttercache=debug,fluttercache_sdk=debug,fluttercache_core=debug,warn"
    } else {
        "fluttercache=info,fluttercache_sdk=info,warn"
    }
}

pub mod build_info;
pub mod persistence;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "flow_core=info";

/// Builds the log filter from a `RUST_LOG`-style value. Unset, empty or
/// unparsable values fall back to `flow_core=info`.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => EnvFilter::try_new(value).unwrap_or_else(|err| {
            eprintln!("ignoring invalid {}: {err}", EnvFilter::DEFAULT_ENV);
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        None => EnvFilter::new(DEFAULT_DIRECTIVE),
    }
}

/// Installs the global `fmt` subscriber. `RUST_LOG` replaces the default
/// `flow_core=info` directive when set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        // A host application may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(env_filter(rust_log.as_deref()))
            .with_writer(std::io::stderr)
            .try_init();
    });
}

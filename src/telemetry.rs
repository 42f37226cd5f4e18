//! Telemetry initialization.
//!
//! Diagnostics go to stderr; stdout is reserved for the audit report.
//! Controlled by `RELEASE_DEDUP_LOG` (an `EnvFilter` directive string):
//! - unset → warnings and errors only
//! - e.g. `"release_dedup=debug"` → per-group decision tracing
//!
//! Set `RELEASE_DEDUP_LOG_JSON=1` for JSON-formatted events, useful when
//! the stderr stream is collected by a log shipper.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "RELEASE_DEDUP_LOG";

/// Environment variable toggling JSON event output.
pub const LOG_JSON_ENV: &str = "RELEASE_DEDUP_LOG_JSON";

/// Initialize the tracing subscriber. Call once, before any work.
pub fn init() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let json = std::env::var(LOG_JSON_ENV).is_ok_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

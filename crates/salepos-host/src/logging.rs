//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,salepos=debug";

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: Failures that abort a request
/// - WARN: Recoverable issues (e.g. ticket printed in UTC)
/// - INFO: Significant events
/// - DEBUG: Amount derivations, cache writes, ticket preparation
///
/// Set the `RUST_LOG` environment variable to control log levels:
/// ```bash
/// RUST_LOG=salepos_host=debug,salepos_core=debug
/// ```
///
/// Returns `false` when a global subscriber was already installed, so hosts
/// and tests can call this more than once.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        assert!(!init_tracing());
    }
}

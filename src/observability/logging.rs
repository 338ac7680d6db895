//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Resolve the log filter from the environment or a fallback level
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Logs go to stderr so `check` output on stdout stays machine readable

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(level: &str) -> String {
    format!("reverse_proxy_configurator={level},tower_http={level}")
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = default_filter("debug");
        assert!(filter.contains("reverse_proxy_configurator=debug"));
        assert!(EnvFilter::try_new(filter).is_ok());
    }

    #[test]
    fn test_init_twice() {
        init("info");
        init("debug");
    }
}

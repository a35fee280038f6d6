//! Diagnostic tracing, separate from the progress lines `ui::ConsoleUI` prints.
//!
//! Logs go to stderr so they never interleave with the agent transcript that
//! is streamed to stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "autorun=debug" } else { "warn" }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set, e.g. `RUST_LOG=autorun=info autorun run .`
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "autorun=debug");
    }
}

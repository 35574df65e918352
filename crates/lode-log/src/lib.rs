//! Structured logging via the `tracing` ecosystem, plus the scoped duration
//! timer the generation routines report through.

use std::time::Instant;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Console output carries module paths, severity, and time since start.
/// The filter defaults to `info` and respects `RUST_LOG`. Safe to call at
/// most once per process.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

/// Scoped duration sample.
///
/// Emits one trace event (target `"profile"`) when dropped, regardless of
/// how the scope exits. The per-chunk generation passes wrap their lighting
/// work in one of these.
pub struct ScopeTimer {
    name: &'static str,
    start: Instant,
}

impl ScopeTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopeTimer {
    fn drop(&mut self) {
        let elapsed_us = self.start.elapsed().as_micros() as u64;
        tracing::trace!(target: "profile", name = self.name, elapsed_us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::new("info");
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_scope_timer_survives_early_return() {
        fn inner() -> i32 {
            let _timer = ScopeTimer::new("test scope");
            7
        }
        // The drop must fire without a subscriber installed.
        assert_eq!(inner(), 7);
    }

    #[test]
    fn test_rust_log_style_filters_parse() {
        for filter in ["info", "warn,lode_mapgen=debug", "trace"] {
            assert!(
                EnvFilter::try_new(filter).is_ok(),
                "failed to parse filter: {filter}"
            );
        }
    }
}

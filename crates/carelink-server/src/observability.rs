//! Tracing setup.
//!
//! The subscriber starts before configuration is loaded, so the filter sits
//! behind a reload layer and is swapped once `logging.level` is known. An
//! explicit `RUST_LOG` wins over the configured level for the whole process.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

const FALLBACK_LEVEL: &str = "info";

struct LogControl {
    handle: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

static LOG_CONTROL: OnceLock<LogControl> = OnceLock::new();

pub fn init_tracing() {
    let env_override = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let filter = if env_override {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(FALLBACK_LEVEL))
    } else {
        filter_for(FALLBACK_LEVEL)
    };

    let (reload_layer, handle) = reload::Layer::new(filter);
    let _ = LOG_CONTROL.set(LogControl {
        handle,
        env_override,
    });

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer())
        .try_init();
}

/// Applies the configured level unless `RUST_LOG` was set at startup.
pub fn apply_logging_level(level: &str) {
    let Some(control) = LOG_CONTROL.get() else {
        return;
    };
    if control.env_override {
        tracing::debug!(level, "RUST_LOG set, ignoring configured level");
        return;
    }
    if let Err(e) = control.handle.modify(|f| *f = filter_for(level)) {
        tracing::warn!(error = %e, "failed to apply logging level");
    }
}

/// Builds a filter from a level or directive string, falling back to `info`
/// when it does not parse.
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

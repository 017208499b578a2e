//! Process-wide configuration loaded from the environment.
//!
//! Mirrors `chem_persistence::config::DbConfig::from_env`: a lazily loaded
//! `.env` file plus a handful of `env::var` reads with sane defaults. The
//! activity engine itself takes no configuration beyond how many reactor
//! worker threads to run and what a default timeout looks like for
//! activities that don't set their own.

use std::env;

use once_cell::sync::Lazy;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

/// Forces the lazy `.env` load from an external entry point (a CLI's
/// `main`, a test harness) before any `EngineConfig::from_env()` call.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Worker threads handed to the reactor's tokio runtime builder, when
    /// the caller builds its own runtime rather than reusing an ambient one.
    pub reactor_workers: usize,
    /// Default timeout, in milliseconds, a user activity may consult for
    /// its own `tokio::time::sleep`-based cancellation; the engine itself
    /// never applies this (spec.md §5: timeouts are out of scope for the
    /// core).
    pub default_timeout_ms: u64,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let reactor_workers = env::var("WEBACT_REACTOR_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);
        let default_timeout_ms = env::var("WEBACT_DEFAULT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30_000);
        EngineConfig { reactor_workers, default_timeout_ms }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { reactor_workers: 4, default_timeout_ms: 30_000 }
    }
}

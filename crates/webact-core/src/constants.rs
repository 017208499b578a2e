//! Engine-wide constants.

/// Logical version of the activity engine, surfaced in diagnostics and
/// panic-guard log lines so a stack trace can be correlated to the engine
/// revision that produced it.
pub const ENGINE_VERSION: &str = "A1.0";

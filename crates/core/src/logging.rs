//! Tracing conventions shared by every CLIR crate.
//!
//! Library crates only emit events; installing a subscriber is the binary's
//! job. Targets all live under [`TARGET_PREFIX`], so
//! `CLIR_LOG_LEVEL=debug` (or a `RUST_LOG`-style filter on `clir`) selects
//! the whole harness.

use tracing::Level;

/// Target prefix used by all CLIR tracing events.
pub const TARGET_PREFIX: &str = "clir";

/// Environment variable consulted by [`level_from_env`].
pub const LOG_LEVEL_ENV: &str = "CLIR_LOG_LEVEL";

/// Event targets used across the workspace.
pub mod targets {
    /// Run/qrel file codecs.
    pub const TREC: &str = "clir::trec";
    /// Judgment store construction.
    pub const QRELS: &str = "clir::qrels";
    /// Ranked result set construction.
    pub const RUN: &str = "clir::run";
    /// Normalization and fusion.
    pub const FUSION: &str = "clir::fusion";
    /// Metric evaluation and diagnostics.
    pub const EVAL: &str = "clir::eval";
    /// Collaborator boundary checks.
    pub const COLLAB: &str = "clir::collab";
}

/// Parse a log level string (case-insensitive).
///
/// Recognized values: `trace`, `debug`, `info`, `warn`, `error`.
/// Returns `None` for unrecognized strings.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Level from `CLIR_LOG_LEVEL`, or `default` when unset or unrecognized.
#[must_use]
pub fn level_from_env(default: Level) -> Level {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(default)
}

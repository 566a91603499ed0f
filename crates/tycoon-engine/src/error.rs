//! Error types for the Tycoon engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the scheduled run.

/// Top-level error for the Tycoon engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tycoon_core::config::ConfigError,
    },

    /// The store stopped accepting actions.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: tycoon_core::store::StoreError,
    },

    /// The store task panicked or was cancelled.
    #[error("store task failed: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// Installing the Ctrl-C handler failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario did not complete
    #[error("Scenario '{scenario}' failed at step {step} ({action}): {source}")]
    ScenarioFailed {
        /// Scenario name
        scenario: String,
        /// 1-based number of the failing step
        step: usize,
        /// What the failing step was doing
        action: String,
        /// Underlying failure
        #[source]
        source: formprobe::ProbeError,
    },

    /// Built without browser support
    #[error("Browser support not enabled. Rebuild with --features browser")]
    BrowserUnavailable,

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Formprobe library error
    #[error("Formprobe error: {0}")]
    Probe(#[from] formprobe::ProbeError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

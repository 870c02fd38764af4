//! Result and error types for formprobe.

use std::fmt;

use thiserror::Error;

use crate::strategy::StrategyAttempt;
use crate::variant::VariantKind;

/// Result type for formprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a form
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Label or field name resolution failed
    #[error("Control not found: {target}")]
    NotFound {
        /// The label text or field key that was tried
        target: String,
    },

    /// Structural classification could not assign a variant
    #[error("Unresolved variant for '{label}': {reason}")]
    UnresolvedVariant {
        /// Label text of the control
        label: String,
        /// What the probe saw
        reason: String,
    },

    /// Every strategy in the priority list failed to produce the target value
    #[error("All strategies failed for '{label}' ({variant}): {}", AttemptList(.attempts))]
    StrategyExhausted {
        /// Label text of the control
        label: String,
        /// Variant the strategies were chosen for
        variant: VariantKind,
        /// Each strategy tried, in priority order
        attempts: Vec<StrategyAttempt>,
    },

    /// An expected asynchronous DOM change did not happen in time
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited on
        what: String,
        /// Window in milliseconds
        ms: u64,
    },

    /// Pointer press landed on an element that cannot receive it
    #[error("Element not actionable: {reason}")]
    NotActionable {
        /// Why the press was refused
        reason: String,
    },

    /// Backend failure (script evaluation, stale handle, protocol error)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Invalid configuration or scenario file
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::NotFound {
            target: target.into(),
        }
    }

    /// Create an unresolved-variant error
    #[must_use]
    pub fn unresolved(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvedVariant {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the four scenario-fatal kinds
    #[must_use]
    pub const fn is_interaction_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::UnresolvedVariant { .. }
                | Self::StrategyExhausted { .. }
                | Self::Timeout { .. }
        )
    }
}

struct AttemptList<'a>(&'a [StrategyAttempt]);

impl fmt::Display for AttemptList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no strategy applicable");
        }
        for (i, attempt) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{attempt}")?;
        }
        Ok(())
    }
}

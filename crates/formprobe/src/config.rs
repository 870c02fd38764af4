//! Interaction configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::driver::Point;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;

/// Default window for a strategy's post-action read-back (ms)
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 500;

/// Default polling interval for read-back (ms)
pub const DEFAULT_SETTLE_POLL_MS: u64 = 25;

/// Settings shared by every operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Window for asynchronous DOM changes (option surfaces, alerts)
    pub wait: WaitOptions,
    /// Window for a strategy's effect to become observable
    pub settle: WaitOptions,
    /// Point pressed to dismiss open option surfaces
    pub dismiss_point: Point,
    /// Try exact label text before substring matches
    pub exact_label_first: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            wait: WaitOptions::default(),
            settle: WaitOptions::new()
                .with_timeout(DEFAULT_SETTLE_TIMEOUT_MS)
                .with_poll_interval(DEFAULT_SETTLE_POLL_MS),
            dismiss_point: Point::new(0.0, 0.0),
            exact_label_first: true,
        }
    }
}

impl ProbeConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the asynchronous wait window
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Set the read-back window
    #[must_use]
    pub const fn with_settle(mut self, settle: WaitOptions) -> Self {
        self.settle = settle;
        self
    }

    /// Set the dismissal point
    #[must_use]
    pub const fn with_dismiss_point(mut self, point: Point) -> Self {
        self.dismiss_point = point;
        self
    }

    /// Enable or disable exact-first label matching
    #[must_use]
    pub const fn with_exact_label_first(mut self, exact: bool) -> Self {
        self.exact_label_first = exact;
        self
    }

    /// Parse from YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    fn validate(&self) -> ProbeResult<()> {
        for (name, opts) in [("wait", &self.wait), ("settle", &self.settle)] {
            if opts.poll_interval_ms == 0 {
                return Err(ProbeError::Config {
                    message: format!("{name}.poll_interval_ms must be positive"),
                });
            }
        }
        Ok(())
    }
}

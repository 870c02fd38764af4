//! Bounded polling for asynchronous DOM updates
//!
//! Option surfaces render after a press, filtered lists update after typed
//! input, alerts appear after submission. Every such expectation is a poll
//! with a hard window; running past it is a [`ProbeError::Timeout`], never
//! an unbounded stall.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::result::{ProbeError, ProbeResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (4 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 4_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it yields `Some`, or fail with a timeout naming `what`.
///
/// The probe always runs at least once, so a zero timeout is a single check.
/// Errors from the probe abort the wait immediately.
pub async fn poll_until<T, F, Fut>(options: &WaitOptions, what: &str, mut probe: F) -> ProbeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let started = Instant::now();
    let mut polls: u32 = 0;
    loop {
        polls += 1;
        if let Some(value) = probe().await? {
            if polls > 1 {
                tracing::debug!(what, polls, "wait satisfied");
            }
            return Ok(value);
        }
        if started.elapsed() >= options.timeout() {
            tracing::debug!(what, polls, "wait window exhausted");
            return Err(ProbeError::Timeout {
                what: what.to_string(),
                ms: options.timeout_ms,
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Poll until `condition` holds
pub async fn wait_until<F, Fut>(options: &WaitOptions, what: &str, mut condition: F) -> ProbeResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<bool>>,
{
    poll_until(options, what, || {
        let check = condition();
        async move { Ok(check.await?.then_some(())) }
    })
    .await
}

/// Poll `check` until it accepts, or return its last rejection reason once
/// the window closes
///
/// Used for read-back after an action: a rejection is not an error, it is
/// the reason a strategy failed.
pub async fn settle<T, F, Fut>(options: &WaitOptions, mut check: F) -> ProbeResult<Result<T, String>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Result<T, String>>>,
{
    let started = Instant::now();
    loop {
        let verdict = check().await?;
        if verdict.is_ok() || started.elapsed() >= options.timeout() {
            return Ok(verdict);
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

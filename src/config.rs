//! Externally supplied settings.
//!
//! The surrounding process loads configuration however it likes (file, env,
//! secrets manager) and hands the populated [`Settings`] in; this crate only
//! validates and converts. Durations arrive as milliseconds, matching the
//! flat integer fields such settings sources typically carry.

use crate::policy::{PolicyError, RetryPolicy};
use serde::Deserialize;
use std::time::Duration;

/// Process settings for one deployment of the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Table the client reads from.
    pub table: String,
    /// Target lookup key for the deployment's single read operation.
    pub key: String,
    /// Total attempts per call (initial try + retries).
    pub max_attempts: u32,
    /// Per-attempt deadline, in milliseconds.
    pub call_timeout_ms: u64,
    /// Base backoff delay, in milliseconds.
    pub base_delay_ms: u64,
    /// Backoff cap, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Settings {
    /// Convert the retry fields into a validated [`RetryPolicy`].
    ///
    /// Invalid values surface as [`PolicyError`] so startup can abort.
    pub fn retry_policy(&self) -> Result<RetryPolicy, PolicyError> {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_backoff_ms),
            Duration::from_millis(self.call_timeout_ms),
        )
    }
}

//! Retry policy value, validated at construction.
//!
//! A [`RetryPolicy`] is built once at startup from external settings and
//! shared read-only by every in-flight call; all cross-field invariants are
//! checked in [`RetryPolicy::new`] so the rest of the crate can assume a
//! well-formed policy.

use std::time::Duration;
use thiserror::Error;

/// Rejections produced when constructing a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// `max_attempts` must be at least 1.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    /// `base_delay` must be greater than zero.
    #[error("base_delay must be greater than zero")]
    ZeroBaseDelay,
    /// `max_backoff` must not undercut `base_delay`.
    #[error("max_backoff ({max_backoff:?}) must be >= base_delay ({base_delay:?})")]
    BackoffBelowBase {
        /// Configured base delay.
        base_delay: Duration,
        /// Configured backoff cap.
        max_backoff: Duration,
    },
    /// `call_timeout` must be greater than zero.
    #[error("call_timeout must be greater than zero")]
    ZeroCallTimeout,
}

/// Immutable retry parameters for one logical call.
///
/// `max_attempts` counts total attempts (initial try + retries).
/// `call_timeout` bounds each individual attempt, not the whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_backoff: Duration,
    call_timeout: Duration,
}

impl RetryPolicy {
    /// Validate and construct a policy.
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_backoff: Duration,
        call_timeout: Duration,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if base_delay.is_zero() {
            return Err(PolicyError::ZeroBaseDelay);
        }
        if max_backoff < base_delay {
            return Err(PolicyError::BackoffBelowBase { base_delay, max_backoff });
        }
        if call_timeout.is_zero() {
            return Err(PolicyError::ZeroCallTimeout);
        }
        Ok(Self { max_attempts, base_delay, max_backoff, call_timeout })
    }

    /// Total attempts permitted (initial try + retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Starting point for the exponential backoff curve.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Hard cap on any computed backoff delay.
    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Deadline applied to each individual attempt.
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }
}

//! Retry executor for store round-trips.
//!
//! One logical call walks a small state machine: attempt, classify, back off,
//! attempt again. Attempts are strictly sequential and 1-indexed; each one is
//! bounded by the policy's per-attempt deadline, and a deadline miss is just
//! another retryable failure (category timeout). Fatal failures end the call
//! on the spot. Retryable failures burn the attempt budget and surface as
//! [`RetryError::Exhausted`] once it is gone, carrying the last failure so
//! callers can tell "infrastructure degraded" apart from "never going to
//! work".
//!
//! Cancellation is raced at both suspension points: the in-flight attempt and
//! the backoff sleep. A cancelled call returns [`RetryError::Cancelled`]
//! without starting another attempt.

use crate::backoff;
use crate::cancel::CancelToken;
use crate::classify::{classify, Verdict};
use crate::error::{FailureKind, StoreFailure};
use crate::policy::RetryPolicy;
use crate::sleeper::{Sleeper, TokioSleeper};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result of a single attempt, produced once and never revisited.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// The operation completed.
    Success(T),
    /// The operation failed in a way worth another attempt.
    Retryable(StoreFailure),
    /// The operation failed in a way no retry will cure.
    Fatal(StoreFailure),
}

/// Terminal failures of a retried call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    /// The attempt budget was consumed without success.
    #[error("retries exhausted after {attempts} attempts; last failure: {last}")]
    Exhausted {
        /// Total attempts made.
        attempts: u32,
        /// The failure observed on the final attempt.
        last: StoreFailure,
    },
    /// A non-retryable failure ended the call immediately.
    #[error("fatal store failure: {0}")]
    Fatal(StoreFailure),
    /// The caller cancelled the call.
    #[error("operation cancelled")]
    Cancelled,
}

// Per-call bookkeeping, created fresh for each execute and dropped with it.
#[derive(Debug, Default)]
struct RetryContext {
    attempts_made: u32,
    last_failure: Option<StoreFailure>,
}

impl RetryContext {
    fn record_failure(&mut self, failure: StoreFailure) {
        self.last_failure = Some(failure);
    }

    fn into_exhausted(self) -> RetryError {
        RetryError::Exhausted {
            attempts: self.attempts_made,
            last: self.last_failure.unwrap_or_else(|| {
                StoreFailure::category(FailureKind::Other, "no recorded failure")
            }),
        }
    }
}

/// Drives an async operation to completion under a [`RetryPolicy`].
///
/// The executor holds no cross-call state; the policy is shared read-only and
/// each call owns its own bookkeeping, so one executor serves any number of
/// concurrent calls.
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("policy", &self.policy)
            .field("sleeper", &"<sleeper>")
            .finish()
    }
}

impl RetryExecutor {
    /// Executor sleeping on the tokio timer.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, TokioSleeper)
    }

    /// Executor with an injected suspension seam.
    pub fn with_sleeper<S>(policy: RetryPolicy, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        Self { policy, sleeper: Arc::new(sleeper) }
    }

    /// The policy this executor runs under.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until success, a fatal failure, or budget exhaustion.
    pub async fn execute<T, Op, Fut>(&self, operation: Op) -> Result<T, RetryError>
    where
        T: Send,
        Op: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, StoreFailure>> + Send,
    {
        self.run(operation, None).await
    }

    /// Like [`execute`](Self::execute), additionally racing `token` at every
    /// suspension point.
    pub async fn execute_with_cancel<T, Op, Fut>(
        &self,
        token: &CancelToken,
        operation: Op,
    ) -> Result<T, RetryError>
    where
        T: Send,
        Op: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, StoreFailure>> + Send,
    {
        self.run(operation, Some(token)).await
    }

    async fn run<T, Op, Fut>(
        &self,
        mut operation: Op,
        cancel: Option<&CancelToken>,
    ) -> Result<T, RetryError>
    where
        T: Send,
        Op: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, StoreFailure>> + Send,
    {
        let mut ctx = RetryContext::default();
        loop {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    return Err(RetryError::Cancelled);
                }
            }

            let attempt = ctx.attempts_made + 1;
            let outcome = self.attempt_once(&mut operation, cancel).await?;
            ctx.attempts_made = attempt;

            match outcome {
                AttemptOutcome::Success(value) => return Ok(value),
                AttemptOutcome::Fatal(failure) => {
                    tracing::debug!(attempt, failure = %failure, "fatal failure, not retrying");
                    return Err(RetryError::Fatal(failure));
                }
                AttemptOutcome::Retryable(failure) => {
                    ctx.record_failure(failure);
                    if attempt >= self.policy.max_attempts() {
                        let err = ctx.into_exhausted();
                        tracing::warn!(attempts = attempt, error = %err, "retry budget exhausted");
                        return Err(err);
                    }
                    let delay = backoff::delay_for(attempt + 1, &self.policy);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after backoff"
                    );
                    self.suspend(delay, cancel).await?;
                }
            }
        }
    }

    async fn attempt_once<T, Op, Fut>(
        &self,
        operation: &mut Op,
        cancel: Option<&CancelToken>,
    ) -> Result<AttemptOutcome<T>, RetryError>
    where
        T: Send,
        Op: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, StoreFailure>> + Send,
    {
        let timeout = self.policy.call_timeout();
        let bounded = tokio::time::timeout(timeout, operation());
        let result = match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return Err(RetryError::Cancelled),
                result = bounded => result,
            },
            None => bounded.await,
        };
        let result = result.unwrap_or_else(|_elapsed| Err(StoreFailure::timeout(timeout)));
        Ok(match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(failure) => match classify(&failure) {
                Verdict::Retryable => AttemptOutcome::Retryable(failure),
                Verdict::Fatal => AttemptOutcome::Fatal(failure),
            },
        })
    }

    async fn suspend(&self, delay: Duration, cancel: Option<&CancelToken>) -> Result<(), RetryError> {
        match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(RetryError::Cancelled),
                _ = self.sleeper.sleep(delay) => Ok(()),
            },
            None => {
                self.sleeper.sleep(delay).await;
                Ok(())
            }
        }
    }
}

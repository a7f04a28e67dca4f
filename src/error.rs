//! Failure taxonomy shared across the crate.
//!
//! Failures are modeled at two levels. [`StoreFailure`] is one failed store
//! round-trip as observed at the transport boundary; its [`Signal`] carries
//! either a response status code or a closed error category, and the
//! classifier in [`crate::classify`] operates on nothing else. [`AccessError`]
//! is what a caller of [`crate::client::Retriever`] ultimately sees.

use std::fmt;
use thiserror::Error;

/// Error categories enumerated at the transport boundary.
///
/// The store adapter maps whatever its SDK raises onto this enum; everything
/// downstream (classification, retry, reporting) sees only the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The attempt exceeded its deadline.
    Timeout,
    /// Connection reset, broken pipe, and similar transient I/O faults.
    TransientIo,
    /// The store asked us to slow down.
    Throttled,
    /// Request rejected over client/server clock disagreement.
    ClockSkew,
    /// A conflicting transaction is still in progress.
    TransactionConflict,
    /// Credentials missing, expired, or rejected.
    Unauthorized,
    /// The request is malformed and will never succeed.
    InvalidRequest,
    /// Anything the adapter could not categorize.
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::TransientIo => "transient i/o",
            Self::Throttled => "throttled",
            Self::ClockSkew => "clock skew",
            Self::TransactionConflict => "transaction conflict",
            Self::Unauthorized => "unauthorized",
            Self::InvalidRequest => "invalid request",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// The observable part of a failure: a status code or an error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Response carried a status code.
    Status(u16),
    /// No status; the transport reported a categorized fault instead.
    Category(FailureKind),
}

/// One failed store round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    signal: Signal,
    message: String,
}

impl StoreFailure {
    /// Failure identified by a response status code.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self { signal: Signal::Status(code), message: message.into() }
    }

    /// Failure identified by a transport-boundary category.
    pub fn category(kind: FailureKind, message: impl Into<String>) -> Self {
        Self { signal: Signal::Category(kind), message: message.into() }
    }

    /// Failure for an attempt that missed its deadline.
    pub fn timeout(limit: std::time::Duration) -> Self {
        Self::category(FailureKind::Timeout, format!("attempt exceeded {:?} deadline", limit))
    }

    /// The status-or-category signal this failure carries.
    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Human-readable detail from the transport.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signal {
            Signal::Status(code) => write!(f, "status {}: {}", code, self.message),
            Signal::Category(kind) => write!(f, "{}: {}", kind, self.message),
        }
    }
}

impl std::error::Error for StoreFailure {}

/// Terminal outcome of a fetch, as seen by callers of the facade.
///
/// `RetryExhausted` and `Fatal` both end the call unsuccessfully but carry
/// different meanings: the former says the infrastructure was degraded and a
/// later call may succeed, the latter says this request can never succeed.
/// `NotFound` is a resolution outcome, not a transport failure, and is never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The batch round-trip succeeded but no record matched the key.
    #[error("no record matched key {key:?}")]
    NotFound {
        /// The key that was requested.
        key: String,
    },
    /// The retryable-failure budget was consumed without success.
    #[error("retries exhausted after {attempts} attempts; last failure: {last}")]
    RetryExhausted {
        /// Total attempts made.
        attempts: u32,
        /// The failure observed on the final attempt.
        last: StoreFailure,
    },
    /// A failure that will not be cured by retrying.
    #[error("fatal store failure: {0}")]
    Fatal(StoreFailure),
    /// The caller abandoned the fetch.
    #[error("fetch cancelled by caller")]
    Cancelled,
}

impl AccessError {
    /// Check whether no record matched the requested key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check whether the attempt budget was exhausted.
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }

    /// Check whether the failure was non-retryable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Check whether the caller cancelled the fetch.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<crate::retry::RetryError> for AccessError {
    fn from(err: crate::retry::RetryError) -> Self {
        match err {
            crate::retry::RetryError::Exhausted { attempts, last } => {
                Self::RetryExhausted { attempts, last }
            }
            crate::retry::RetryError::Fatal(failure) => Self::Fatal(failure),
            crate::retry::RetryError::Cancelled => Self::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryError;
    use std::time::Duration;

    #[test]
    fn status_failure_display() {
        let failure = StoreFailure::status(503, "service unavailable");
        assert_eq!(failure.to_string(), "status 503: service unavailable");
        assert_eq!(failure.signal(), Signal::Status(503));
    }

    #[test]
    fn category_failure_display() {
        let failure = StoreFailure::category(FailureKind::Throttled, "slow down");
        assert_eq!(failure.to_string(), "throttled: slow down");
    }

    #[test]
    fn timeout_failure_carries_timeout_category() {
        let failure = StoreFailure::timeout(Duration::from_millis(500));
        assert_eq!(failure.signal(), Signal::Category(FailureKind::Timeout));
        assert!(failure.message().contains("500ms"));
    }

    #[test]
    fn access_error_predicates() {
        let not_found = AccessError::NotFound { key: "abc".into() };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_fatal());

        let fatal = AccessError::Fatal(StoreFailure::status(400, "bad request"));
        assert!(fatal.is_fatal());

        let exhausted = AccessError::RetryExhausted {
            attempts: 3,
            last: StoreFailure::status(503, "still down"),
        };
        assert!(exhausted.is_retry_exhausted());
        assert!(AccessError::Cancelled.is_cancelled());
    }

    #[test]
    fn retry_error_maps_through_unchanged() {
        let exhausted: AccessError =
            RetryError::Exhausted { attempts: 5, last: StoreFailure::status(500, "boom") }.into();
        assert_eq!(
            exhausted,
            AccessError::RetryExhausted { attempts: 5, last: StoreFailure::status(500, "boom") }
        );

        let fatal: AccessError =
            RetryError::Fatal(StoreFailure::category(FailureKind::Unauthorized, "denied")).into();
        assert!(fatal.is_fatal());

        let cancelled: AccessError = RetryError::Cancelled.into();
        assert_eq!(cancelled, AccessError::Cancelled);
    }

    #[test]
    fn exhausted_display_includes_last_failure() {
        let err = AccessError::RetryExhausted {
            attempts: 3,
            last: StoreFailure::status(502, "bad gateway"),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("status 502"));
    }
}

//! Classification of store failures into retryable and fatal.
//!
//! [`classify`] is a pure function of the failure signal and a fixed policy
//! table: a failure is retryable when its status code is one of the transient
//! 5xx responses, or when its category names a transient condition. The two
//! conditions are independent; either alone makes the failure retryable.
//! Unknown statuses and categories fail closed as fatal.

use crate::error::{FailureKind, Signal, StoreFailure};

/// Status codes that signal a transient server-side fault.
pub const RETRYABLE_STATUS: [u16; 4] = [500, 502, 503, 504];

/// Result of classifying a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Transient; worth another attempt.
    Retryable,
    /// Will not be cured by retrying.
    Fatal,
}

impl Verdict {
    /// Check whether this verdict permits another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable)
    }
}

/// Decide whether a failed attempt may be retried.
pub fn classify(failure: &StoreFailure) -> Verdict {
    let retryable = match failure.signal() {
        Signal::Status(code) => RETRYABLE_STATUS.contains(&code),
        Signal::Category(kind) => is_transient(kind),
    };
    if retryable {
        Verdict::Retryable
    } else {
        Verdict::Fatal
    }
}

fn is_transient(kind: FailureKind) -> bool {
    matches!(
        kind,
        FailureKind::Timeout
            | FailureKind::TransientIo
            | FailureKind::Throttled
            | FailureKind::ClockSkew
            | FailureKind::TransactionConflict
    )
}

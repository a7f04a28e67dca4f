//! Full-jitter exponential backoff.
//!
//! The delay before attempt `n` is drawn uniformly from `[0, candidate]`
//! where `candidate = min(max_backoff, base_delay * 2^(n-1))`. Attempts are
//! 1-indexed: the initial try is attempt 1 and gets no delay, the first
//! retry is attempt 2. Drawing from zero spreads concurrent retriers apart
//! instead of synchronizing them on the exponential curve.
//!
//! Arithmetic saturates rather than overflowing, so absurd attempt numbers
//! cap at `max_backoff` instead of panicking.

use crate::policy::RetryPolicy;
use rand::{rng, Rng};
use std::time::Duration;

/// Upper bound of the jitter interval for a given attempt.
///
/// Exposed so tests and callers can assert that an observed delay fits the
/// capped exponential envelope.
pub fn jitter_bound(attempt: u32, policy: &RetryPolicy) -> Duration {
    if attempt <= 1 {
        return Duration::ZERO;
    }
    let multiplier = 2u128.saturating_pow(attempt - 1);
    let nanos = policy.base_delay().as_nanos().saturating_mul(multiplier);
    let capped = nanos.min(policy.max_backoff().as_nanos());
    Duration::from_nanos(capped.try_into().unwrap_or(u64::MAX))
}

/// Jittered delay before attempt `attempt`, using the thread-local RNG.
pub fn delay_for(attempt: u32, policy: &RetryPolicy) -> Duration {
    delay_for_with_rng(attempt, policy, &mut rng())
}

/// Jittered delay with an injected RNG, for deterministic tests.
pub fn delay_for_with_rng<R: Rng>(attempt: u32, policy: &RetryPolicy, rng: &mut R) -> Duration {
    let bound = jitter_bound(attempt, policy);
    if bound.is_zero() {
        return Duration::ZERO;
    }
    let bound_nanos = bound.as_nanos().try_into().unwrap_or(u64::MAX);
    Duration::from_nanos(rng.random_range(0..=bound_nanos))
}

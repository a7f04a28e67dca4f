//! Seam to the remote key-value store.
//!
//! Credential handling, connection pooling, and the wire protocol all live
//! behind this trait; the crate only sees a batch request going out and a
//! complete page set (or a categorized failure) coming back.

use crate::error::StoreFailure;
use crate::lookup::{LookupRequest, ResultPage};
use async_trait::async_trait;

/// Batched point-read access to the remote store.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Execute one batch-read round-trip.
    ///
    /// Implementations must collect the store's page stream completely before
    /// returning: resolution needs the whole set, since no page ordering or
    /// early match is guaranteed. Failures are mapped onto [`StoreFailure`]
    /// at this boundary so classification stays independent of any transport
    /// library's error hierarchy.
    async fn batch_get(&self, request: &LookupRequest) -> Result<Vec<ResultPage>, StoreFailure>;
}

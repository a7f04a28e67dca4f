//! Access facade: fetch one record by key, resiliently.
//!
//! [`Retriever`] is the single operation surrounding components call. It
//! builds the batch request, runs the whole store round-trip through the
//! retry executor, and resolves the returned pages to the target record. The
//! store handle, table identity, and retry policy are all passed in
//! explicitly at construction; nothing is read from ambient globals.

use crate::cancel::CancelToken;
use crate::config::Settings;
use crate::error::AccessError;
use crate::lookup::{self, LookupRequest, Record, ResultPage};
use crate::policy::{PolicyError, RetryPolicy};
use crate::retry::RetryExecutor;
use crate::sleeper::Sleeper;
use crate::store::BatchStore;
use std::sync::Arc;

/// Resilient point-lookup client over a [`BatchStore`].
///
/// Cheap to clone; clones share the store handle and policy. Safe to use
/// from any number of concurrent tasks, each call being fully independent.
#[derive(Debug, Clone)]
pub struct Retriever<S> {
    store: Arc<S>,
    table: String,
    executor: RetryExecutor,
}

impl<S: BatchStore> Retriever<S> {
    /// Client over `store` and `table`, retrying per `policy`.
    pub fn new(store: Arc<S>, table: impl Into<String>, policy: RetryPolicy) -> Self {
        Self { store, table: table.into(), executor: RetryExecutor::new(policy) }
    }

    /// Like [`new`](Self::new), with an injected suspension seam for tests.
    pub fn with_sleeper<Sl>(
        store: Arc<S>,
        table: impl Into<String>,
        policy: RetryPolicy,
        sleeper: Sl,
    ) -> Self
    where
        Sl: Sleeper + 'static,
    {
        Self { store, table: table.into(), executor: RetryExecutor::with_sleeper(policy, sleeper) }
    }

    /// Client configured from an externally supplied settings object.
    ///
    /// Fails when the settings violate the retry policy invariants, so
    /// startup can abort instead of running misconfigured.
    pub fn from_settings(store: Arc<S>, settings: &Settings) -> Result<Self, PolicyError> {
        let policy = settings.retry_policy()?;
        Ok(Self::new(store, settings.table.clone(), policy))
    }

    /// The table this client reads from.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fetch the record identified by `key`.
    ///
    /// The whole batch round-trip is the retried operation; resolution over
    /// the returned pages happens once, after a successful round-trip. A
    /// missing record is [`AccessError::NotFound`], never a retry.
    pub async fn fetch_by_key(&self, key: &str) -> Result<Record, AccessError> {
        tracing::info!(table = %self.table, key, "fetching record");
        let request = LookupRequest::single(&self.table, key);
        let pages = self
            .executor
            .execute(|| {
                let store = Arc::clone(&self.store);
                let request = request.clone();
                async move { store.batch_get(&request).await }
            })
            .await?;
        self.resolve_pages(pages, key)
    }

    /// Like [`fetch_by_key`](Self::fetch_by_key), abandoning the call as soon
    /// as `token` is cancelled.
    pub async fn fetch_by_key_with_cancel(
        &self,
        key: &str,
        token: &CancelToken,
    ) -> Result<Record, AccessError> {
        tracing::info!(table = %self.table, key, "fetching record (cancellable)");
        let request = LookupRequest::single(&self.table, key);
        let pages = self
            .executor
            .execute_with_cancel(token, || {
                let store = Arc::clone(&self.store);
                let request = request.clone();
                async move { store.batch_get(&request).await }
            })
            .await?;
        self.resolve_pages(pages, key)
    }

    fn resolve_pages(&self, pages: Vec<ResultPage>, key: &str) -> Result<Record, AccessError> {
        match lookup::resolve(pages, key) {
            Ok(record) => {
                tracing::debug!(table = %self.table, key, "record resolved");
                Ok(record)
            }
            Err(lookup::LookupError::NotFound { key }) => Err(AccessError::NotFound { key }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreFailure;
    use crate::lookup::ResultPage;
    use crate::sleeper::NoopSleeper;
    use async_trait::async_trait;
    use std::time::Duration;

    struct EmptyStore;

    #[async_trait]
    impl BatchStore for EmptyStore {
        async fn batch_get(
            &self,
            _request: &LookupRequest,
        ) -> Result<Vec<ResultPage>, StoreFailure> {
            Ok(vec![ResultPage::default()])
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(
            3,
            Duration::from_millis(100),
            Duration::from_millis(1000),
            Duration::from_millis(500),
        )
        .expect("policy")
    }

    #[tokio::test]
    async fn missing_record_maps_to_not_found() {
        let client = Retriever::with_sleeper(Arc::new(EmptyStore), "profiles", policy(), NoopSleeper);
        let err = client.fetch_by_key("missing").await.unwrap_err();
        assert_eq!(err, AccessError::NotFound { key: "missing".into() });
    }

    #[tokio::test]
    async fn from_settings_builds_a_working_client() {
        let settings = Settings {
            table: "profiles".into(),
            key: "abc".into(),
            max_attempts: 3,
            call_timeout_ms: 500,
            base_delay_ms: 100,
            max_backoff_ms: 1000,
        };
        let client = Retriever::from_settings(Arc::new(EmptyStore), &settings).expect("client");
        assert_eq!(client.table(), "profiles");
    }

    #[tokio::test]
    async fn from_settings_rejects_invalid_policy() {
        let settings = Settings {
            table: "profiles".into(),
            key: "abc".into(),
            max_attempts: 0,
            call_timeout_ms: 500,
            base_delay_ms: 100,
            max_backoff_ms: 1000,
        };
        assert!(Retriever::from_settings(Arc::new(EmptyStore), &settings).is_err());
    }
}

#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Retriever
//!
//! Resilient batched point-reads for remote key-value stores: a retry engine
//! with full-jitter exponential backoff and per-attempt deadlines, in front
//! of batch-read resolution that reassembles multi-page results and locates
//! the record for a target key.
//!
//! ## What it does
//!
//! - **Classification**: status codes and transport-boundary error
//!   categories are sorted into retryable and fatal; unknowns fail closed.
//! - **Backoff**: full jitter, exponentially growing and capped, with an
//!   injectable RNG for deterministic tests.
//! - **Execution**: strictly sequential attempts under an attempt budget,
//!   each bounded by a per-attempt deadline; cancellation is raced at every
//!   suspension point.
//! - **Resolution**: all result pages are flattened into one logical result
//!   and the target record is located by key; a miss is a typed `NotFound`,
//!   never a retry.
//!
//! The remote store sits behind the [`BatchStore`] trait; HTTP routing,
//! configuration loading, and credentials are the surrounding process's
//! business.
//!
//! ## Quick start
//!
//! ```rust
//! use retriever::{
//!     BatchStore, LookupRequest, Record, ResultPage, Retriever, RetryPolicy, StoreFailure,
//! };
//! use async_trait::async_trait;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct StaticStore;
//!
//! #[async_trait]
//! impl BatchStore for StaticStore {
//!     async fn batch_get(
//!         &self,
//!         request: &LookupRequest,
//!     ) -> Result<Vec<ResultPage>, StoreFailure> {
//!         let records = request.keys().iter().map(|k| Record::new(k.as_str())).collect();
//!         Ok(vec![ResultPage::new(records)])
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let policy = RetryPolicy::new(
//!         3,
//!         Duration::from_millis(100),
//!         Duration::from_secs(1),
//!         Duration::from_millis(500),
//!     )
//!     .unwrap();
//!     let client = Retriever::new(Arc::new(StaticStore), "profiles", policy);
//!     let record = client.fetch_by_key("abc").await.unwrap();
//!     assert_eq!(record.key, "abc");
//! }
//! ```

pub mod backoff;
pub mod cancel;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod lookup;
pub mod policy;
pub mod retry;
pub mod sleeper;
pub mod store;

// Re-exports
pub use cancel::CancelToken;
pub use classify::{classify, Verdict};
pub use client::Retriever;
pub use config::Settings;
pub use error::{AccessError, FailureKind, Signal, StoreFailure};
pub use lookup::{resolve, LookupError, LookupRequest, Record, ResultPage};
pub use policy::{PolicyError, RetryPolicy};
pub use retry::{AttemptOutcome, RetryError, RetryExecutor};
pub use sleeper::{NoopSleeper, RecordingSleeper, Sleeper, TokioSleeper};
pub use store::BatchStore;

//! Batched lookup requests and multi-page resolution.
//!
//! A logical "get by key" becomes one batch-read request; the store may
//! answer across any number of pages. Resolution treats the full page set as
//! one result: flatten every record across every page, take the first whose
//! key matches. Neither page order nor intra-page order carries meaning, so
//! resolution must not depend on either.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// A record retrieved from the store: partition key plus attributes.
///
/// Lookup matching compares keys only; attribute contents never influence
/// which record is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Partition key identifying the record.
    pub key: String,
    /// Remaining attributes, keyed by attribute name.
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl Record {
    /// Record with the given key and no attributes.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), attributes: BTreeMap::new() }
    }

    /// Add one attribute, consuming and returning the record.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// One batch-read request: a target table and an ordered set of keys.
///
/// Keys are de-duplicated preserving first-occurrence order. The current
/// deployment always requests exactly one key, but the request generalizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    table: String,
    keys: Vec<String>,
}

impl LookupRequest {
    /// Request for an arbitrary set of keys.
    pub fn new<I, K>(table: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if !deduped.contains(&key) {
                deduped.push(key);
            }
        }
        Self { table: table.into(), keys: deduped }
    }

    /// Request for a single key.
    pub fn single(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(table, [key.into()])
    }

    /// Target table identity.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Requested keys, in first-occurrence order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// One page of records returned by the store for a batch request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    records: Vec<Record>,
}

impl ResultPage {
    /// Page wrapping the given records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Records on this page.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the page, yielding its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for ResultPage {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

/// Resolution failures. Distinct from transport failures; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No page contained a record with the requested key.
    #[error("no record matched key {key:?}")]
    NotFound {
        /// The key that was requested.
        key: String,
    },
}

/// Locate the record for `target_key` in a complete page set.
///
/// Flattens all pages in the order given and returns the first record whose
/// key matches. Should the store ever return duplicate keys, the first in
/// flattening order wins; that tie-break is deliberate, since key uniqueness
/// is the store's invariant to keep, not ours to police.
pub fn resolve(pages: Vec<ResultPage>, target_key: &str) -> Result<Record, LookupError> {
    pages
        .into_iter()
        .flat_map(ResultPage::into_records)
        .find(|record| record.key == target_key)
        .ok_or_else(|| LookupError::NotFound { key: target_key.to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(records: Vec<Record>) -> ResultPage {
        ResultPage::new(records)
    }

    #[test]
    fn finds_record_in_a_later_page() {
        let pages = vec![
            page(vec![Record::new("xyz")]),
            page(vec![Record::new("abc").with_attribute("name", "Ann")]),
        ];
        let record = resolve(pages, "abc").expect("present");
        assert_eq!(record.key, "abc");
        assert_eq!(record.attributes.get("name"), Some(&Value::from("Ann")));
    }

    #[test]
    fn page_order_does_not_matter() {
        let target = Record::new("abc").with_attribute("name", "Ann");
        let forward = vec![page(vec![Record::new("xyz")]), page(vec![target.clone()])];
        let backward = vec![page(vec![target.clone()]), page(vec![Record::new("xyz")])];
        assert_eq!(resolve(forward, "abc"), resolve(backward, "abc"));
    }

    #[test]
    fn missing_key_is_not_found() {
        let pages = vec![page(vec![Record::new("xyz"), Record::new("uvw")])];
        let err = resolve(pages, "missing").unwrap_err();
        assert_eq!(err, LookupError::NotFound { key: "missing".into() });
    }

    #[test]
    fn empty_page_set_is_not_found() {
        assert!(resolve(Vec::new(), "abc").is_err());
        assert!(resolve(vec![page(Vec::new())], "abc").is_err());
    }

    #[test]
    fn duplicate_keys_resolve_to_first_in_flattening_order() {
        let pages = vec![
            page(vec![Record::new("abc").with_attribute("name", "first")]),
            page(vec![Record::new("abc").with_attribute("name", "second")]),
        ];
        let record = resolve(pages, "abc").expect("present");
        assert_eq!(record.attributes.get("name"), Some(&Value::from("first")));
    }

    #[test]
    fn resolution_is_idempotent() {
        let pages = vec![page(vec![Record::new("abc").with_attribute("n", 1)])];
        let first = resolve(pages.clone(), "abc");
        let second = resolve(pages, "abc");
        assert_eq!(first, second);
    }

    #[test]
    fn request_deduplicates_keys_preserving_order() {
        let request = LookupRequest::new("profiles", ["b", "a", "b", "c", "a"]);
        assert_eq!(request.keys(), ["b", "a", "c"]);
        assert_eq!(request.table(), "profiles");
    }

    #[test]
    fn single_key_request() {
        let request = LookupRequest::single("profiles", "abc");
        assert_eq!(request.keys(), ["abc"]);
    }

    #[test]
    fn record_serializes_round_trip() {
        let record = Record::new("abc").with_attribute("name", "Ann");
        let json = serde_json::to_string(&record).expect("serialize");
        let back: Record = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
    }
}

//! Network response records and the URL index built from them.
//!
//! The index only admits exchanges that finished with a successful status,
//! so a lookup by `src` answers "was this image actually delivered".

use crate::error::GatherError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// One observed network exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponseRecord {
    pub url: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub finished: bool,
    /// Only present once the exchange has finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Range of HTTP status codes treated as a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessStatus {
    pub min: u16,
    pub max: u16,
}

impl Default for SuccessStatus {
    fn default() -> Self {
        Self { min: 200, max: 299 }
    }
}

impl SuccessStatus {
    pub fn contains(&self, status: u16) -> bool {
        (self.min..=self.max).contains(&status)
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl From<RangeInclusive<u16>> for SuccessStatus {
    fn from(range: RangeInclusive<u16>) -> Self {
        Self {
            min: *range.start(),
            max: *range.end(),
        }
    }
}

/// Successful, finished responses keyed by exact URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseIndex {
    by_url: HashMap<String, NetworkResponseRecord>,
}

impl ResponseIndex {
    pub fn get(&self, url: &str) -> Option<&NetworkResponseRecord> {
        self.by_url.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.by_url.keys().map(String::as_str)
    }
}

impl FromIterator<NetworkResponseRecord> for ResponseIndex {
    fn from_iter<I: IntoIterator<Item = NetworkResponseRecord>>(iter: I) -> Self {
        index_responses(iter, SuccessStatus::default())
    }
}

/// Build a [`ResponseIndex`] from `records`.
///
/// A record qualifies when it finished and its status falls in `success`.
/// Unfinished records and records without a status are dropped silently.
/// When several qualifying records share a URL, the last one wins.
pub fn index_responses<I>(records: I, success: SuccessStatus) -> ResponseIndex
where
    I: IntoIterator<Item = NetworkResponseRecord>,
{
    let mut by_url = HashMap::new();
    for record in records {
        let ok = record.finished && record.status_code.is_some_and(|s| success.contains(s));
        if ok {
            by_url.insert(record.url.clone(), record);
        }
    }
    ResponseIndex { by_url }
}

/// Source of the response records captured during a page load.
pub trait NetworkLog: Send + Sync {
    fn records(&self) -> Result<Vec<NetworkResponseRecord>, GatherError>;
}

impl NetworkLog for Vec<NetworkResponseRecord> {
    fn records(&self) -> Result<Vec<NetworkResponseRecord>, GatherError> {
        Ok(self.clone())
    }
}

/// A network log stored as a JSON array of response records.
#[derive(Debug, Clone)]
pub struct JsonNetworkLog {
    path: PathBuf,
}

impl JsonNetworkLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NetworkLog for JsonNetworkLog {
    fn records(&self) -> Result<Vec<NetworkResponseRecord>, GatherError> {
        let data = std::fs::read_to_string(&self.path).map_err(|e| {
            GatherError::NetworkLog(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let records: Vec<NetworkResponseRecord> = serde_json::from_str(&data)?;
        tracing::debug!(
            "loaded {} network records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

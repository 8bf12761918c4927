//! Resumption token types

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Selection criteria of a list request
///
/// These are the only token fields that ever reach the repository query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCriteria {
    /// metadataPrefix (absent for `ListSets`)
    #[serde(rename = "metadataPrefix", skip_serializing_if = "Option::is_none")]
    pub metadata_prefix: Option<String>,
    /// Set spec filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    /// Lower datestamp bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Timestamp>,
    /// Upper datestamp bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<Timestamp>,
}

impl ListCriteria {
    /// Criteria with only a metadata prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            metadata_prefix: Some(prefix.into()),
            ..Default::default()
        }
    }

    /// Set the set filter
    #[must_use]
    pub fn set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    /// Set the date range
    #[must_use]
    pub fn range(mut self, from: Option<Timestamp>, until: Option<Timestamp>) -> Self {
        self.from = from;
        self.until = until;
        self
    }
}

/// Decoded resumption token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumptionToken {
    /// Criteria of the originating request
    #[serde(flatten)]
    pub criteria: ListCriteria,
    /// Position of the first item of the next page
    pub cursor: usize,
    /// Size of the whole result set when the token was issued
    #[serde(rename = "completeListSize", skip_serializing_if = "Option::is_none")]
    pub complete_list_size: Option<usize>,
    /// Instant after which the token is rejected
    #[serde(rename = "expirationDate", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,
}

impl ResumptionToken {
    /// Create a token for the given criteria and cursor
    pub fn new(criteria: ListCriteria, cursor: usize) -> Self {
        Self {
            criteria,
            cursor,
            complete_list_size: None,
            expiration_date: None,
        }
    }

    /// Attach the result set size
    #[must_use]
    pub fn with_complete_list_size(mut self, size: usize) -> Self {
        self.complete_list_size = Some(size);
        self
    }

    /// Attach an expiration instant
    #[must_use]
    pub fn with_expiration(mut self, at: Timestamp) -> Self {
        self.expiration_date = Some(at);
        self
    }
}

/// A validated token, ready to drive the next page
///
/// `complete_list_size` is informative only; it is carried next to the
/// criteria so the next response can report the size computed on the first
/// page, but it is never used for filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    /// Criteria of the originating request
    pub criteria: ListCriteria,
    /// Position of the first item to serve
    pub cursor: usize,
    /// Size reported on earlier pages
    pub complete_list_size: Option<usize>,
}

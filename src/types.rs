//! Common types used throughout the OAI-PMH server
//!
//! This module contains the verb vocabulary, datestamp handling,
//! and small shared type aliases.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// UTC timestamp used for datestamps, date filters and token expiry
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// Verbs
// ============================================================================

/// The six OAI-PMH verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    Identify,
    GetRecord,
    ListIdentifiers,
    ListRecords,
    ListSets,
    ListMetadataFormats,
}

impl Verb {
    /// All verbs, in protocol order
    pub const ALL: [Verb; 6] = [
        Verb::Identify,
        Verb::GetRecord,
        Verb::ListIdentifiers,
        Verb::ListRecords,
        Verb::ListSets,
        Verb::ListMetadataFormats,
    ];

    /// Protocol name of the verb
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Identify => "Identify",
            Verb::GetRecord => "GetRecord",
            Verb::ListIdentifiers => "ListIdentifiers",
            Verb::ListRecords => "ListRecords",
            Verb::ListSets => "ListSets",
            Verb::ListMetadataFormats => "ListMetadataFormats",
        }
    }

    /// Arguments that must be present (outside of a resumption request)
    pub fn required_args(&self) -> &'static [&'static str] {
        match self {
            Verb::GetRecord => &["identifier", "metadataPrefix"],
            Verb::ListIdentifiers | Verb::ListRecords => &["metadataPrefix"],
            Verb::Identify | Verb::ListSets | Verb::ListMetadataFormats => &[],
        }
    }

    /// Arguments that may be present in addition to the required ones
    pub fn optional_args(&self) -> &'static [&'static str] {
        match self {
            Verb::ListIdentifiers | Verb::ListRecords => {
                &["from", "until", "set", "resumptionToken"]
            }
            Verb::ListSets => &["resumptionToken"],
            Verb::ListMetadataFormats => &["identifier"],
            Verb::Identify | Verb::GetRecord => &[],
        }
    }

    /// Whether a resumption token is accepted for this verb
    pub fn accepts_resumption(&self) -> bool {
        self.optional_args().contains(&"resumptionToken")
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Verb::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::bad_verb(format!("Illegal verb: {s}")))
    }
}

// ============================================================================
// Datestamps
// ============================================================================

/// Granularity of a datestamp supplied by a harvester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// `YYYY-MM-DD`
    Day,
    /// `YYYY-MM-DDThh:mm:ssZ`
    Seconds,
}

impl Granularity {
    /// Protocol representation used in `Identify`
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "YYYY-MM-DD",
            Granularity::Seconds => "YYYY-MM-DDThh:mm:ssZ",
        }
    }
}

/// Parse an OAI-PMH datestamp in either supported granularity
///
/// Day granularity resolves to midnight UTC.
pub fn parse_datestamp(value: &str) -> Result<(Timestamp, Granularity)> {
    let value = value.trim();
    if value.len() == 10 {
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| Error::bad_argument(format!("Invalid date: {value}")))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::bad_argument(format!("Invalid date: {value}")))?;
        return Ok((Utc.from_utc_datetime(&midnight), Granularity::Day));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ")
        .map_err(|_| Error::bad_argument(format!("Invalid datestamp: {value}")))?;
    Ok((Utc.from_utc_datetime(&naive), Granularity::Seconds))
}

/// Format a timestamp with seconds granularity
pub fn format_datestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a timestamp with day granularity
pub fn format_day(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Current wall-clock time truncated to whole seconds
pub fn now_seconds() -> Timestamp {
    truncate_seconds(Utc::now())
}

/// Drop sub-second precision
pub fn truncate_seconds(ts: Timestamp) -> Timestamp {
    Utc.timestamp_opt(ts.timestamp(), 0).single().unwrap_or(ts)
}

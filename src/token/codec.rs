//! Resumption token codec
//!
//! Encoding is a plain `application/x-www-form-urlencoded` mapping with a
//! fixed key order. Decoding takes the first value of repeated keys and
//! tolerates tokens that were percent-encoded twice by an intermediary.

use super::types::{Continuation, ListCriteria, ResumptionToken};
use crate::error::{Error, Result};
use crate::types::{format_datestamp, parse_datestamp, Timestamp};
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use url::form_urlencoded;

const KEY_METADATA_PREFIX: &str = "metadataPrefix";
const KEY_SET: &str = "set";
const KEY_FROM: &str = "from";
const KEY_UNTIL: &str = "until";
const KEY_CURSOR: &str = "cursor";
const KEY_COMPLETE_LIST_SIZE: &str = "completeListSize";
const KEY_EXPIRATION_DATE: &str = "expirationDate";

/// Encodes, decodes and validates resumption tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCodec {
    /// Lifetime of issued tokens; `None` disables expiry enforcement
    validity: Option<Duration>,
}

impl TokenCodec {
    /// Create a codec with the given validity window
    pub fn new(validity: Option<Duration>) -> Self {
        Self { validity }
    }

    /// Validity window of issued tokens
    pub fn validity(&self) -> Option<Duration> {
        self.validity
    }

    /// Serialize a token to its wire form
    pub fn encode(&self, token: &ResumptionToken) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        let criteria = &token.criteria;

        if let Some(prefix) = &criteria.metadata_prefix {
            out.append_pair(KEY_METADATA_PREFIX, prefix);
        }
        if let Some(set) = &criteria.set {
            out.append_pair(KEY_SET, set);
        }
        if let Some(from) = &criteria.from {
            out.append_pair(KEY_FROM, &format_datestamp(from));
        }
        if let Some(until) = &criteria.until {
            out.append_pair(KEY_UNTIL, &format_datestamp(until));
        }
        out.append_pair(KEY_CURSOR, &token.cursor.to_string());
        if let Some(size) = token.complete_list_size {
            out.append_pair(KEY_COMPLETE_LIST_SIZE, &size.to_string());
        }
        if let Some(expiration) = &token.expiration_date {
            out.append_pair(KEY_EXPIRATION_DATE, &expiration.timestamp().to_string());
        }

        out.finish()
    }

    /// Parse a token from its wire form
    pub fn decode(&self, raw: &str) -> Result<ResumptionToken> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::bad_token("The resumption token is empty"));
        }

        let fields = first_values(raw);

        let cursor = match fields.get(KEY_CURSOR) {
            Some(value) => parse_count(KEY_CURSOR, value)?,
            None => return Err(Error::bad_token("The resumption token has no cursor")),
        };

        let complete_list_size = fields
            .get(KEY_COMPLETE_LIST_SIZE)
            .map(|v| parse_count(KEY_COMPLETE_LIST_SIZE, v))
            .transpose()?;

        let expiration_date = fields
            .get(KEY_EXPIRATION_DATE)
            .map(|v| parse_unix_timestamp(v))
            .transpose()?;

        let criteria = ListCriteria {
            metadata_prefix: fields.get(KEY_METADATA_PREFIX).cloned(),
            set: fields.get(KEY_SET).cloned(),
            from: fields.get(KEY_FROM).map(|v| parse_bound(v)).transpose()?,
            until: fields.get(KEY_UNTIL).map(|v| parse_bound(v)).transpose()?,
        };

        Ok(ResumptionToken {
            criteria,
            cursor,
            complete_list_size,
            expiration_date,
        })
    }

    /// Check a decoded token against `now` and reduce it to what drives the
    /// next query
    pub fn validate(&self, token: ResumptionToken, now: Timestamp) -> Result<Continuation> {
        if self.validity.is_some() {
            let expiration = token
                .expiration_date
                .ok_or_else(|| Error::bad_token("expirationDate is missing"))?;
            if expiration < now {
                return Err(Error::bad_token("expirationDate is in the past"));
            }
        }

        if let Some(size) = token.complete_list_size {
            if token.cursor > size {
                return Err(Error::bad_token(format!(
                    "cursor {} is beyond completeListSize {size}",
                    token.cursor
                )));
            }
        }

        Ok(Continuation {
            criteria: token.criteria,
            cursor: token.cursor,
            complete_list_size: token.complete_list_size,
        })
    }

    /// Decode and validate in one step
    pub fn resume(&self, raw: &str, now: Timestamp) -> Result<Continuation> {
        let token = self.decode(raw)?;
        self.validate(token, now)
    }

    /// Build the token for the page starting at `cursor`, stamping an
    /// expiration when the validity window is enabled
    pub fn issue(
        &self,
        criteria: ListCriteria,
        cursor: usize,
        complete_list_size: usize,
        now: Timestamp,
    ) -> ResumptionToken {
        let token =
            ResumptionToken::new(criteria, cursor).with_complete_list_size(complete_list_size);
        match self.validity {
            Some(validity) => token.with_expiration(now + validity),
            None => token,
        }
    }
}

/// Parse the mapping keeping the first value of each key
fn first_values(raw: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        fields
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }

    // "cursor%3D3%26set%3Dx" parses to one valueless key holding the real mapping
    if fields.len() == 1 {
        if let Some((key, value)) = fields.iter().next() {
            if value.is_empty() && key.contains('=') {
                let inner = key.clone();
                return first_values(&inner);
            }
        }
    }

    fields
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::bad_token(format!("{key} is not a valid count: {value}")))
}

fn parse_unix_timestamp(value: &str) -> Result<Timestamp> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| Error::bad_token("expirationDate is not in a valid format"))
}

fn parse_bound(value: &str) -> Result<Timestamp> {
    parse_datestamp(value)
        .map(|(ts, _)| ts)
        .map_err(|_| Error::bad_token(format!("Invalid datestamp in resumption token: {value}")))
}

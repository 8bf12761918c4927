//! Inbound request normalization
//!
//! HTTP arguments arrive as a multi-valued mapping. They are flattened to
//! their first value, and a request carrying a `resumptionToken` is reduced
//! to the verb and the token before anything else is looked at.

use crate::error::{Error, Result};
use crate::protocol::{ListRequest, OaiRequest};
use crate::token::{ListCriteria, TokenCodec};
use crate::types::{parse_datestamp, Timestamp, Verb};
use url::form_urlencoded;

const ARG_VERB: &str = "verb";
const ARG_RESUMPTION_TOKEN: &str = "resumptionToken";
const ARG_METADATA_PREFIX: &str = "metadataPrefix";
const ARG_IDENTIFIER: &str = "identifier";
const ARG_SET: &str = "set";
const ARG_FROM: &str = "from";
const ARG_UNTIL: &str = "until";

/// Request arguments flattened to one value per key, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestArgs {
    pairs: Vec<(String, String)>,
}

impl RequestArgs {
    /// Flatten key/value pairs, keeping the first value of repeated keys
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut args = Self::default();
        for (key, value) in pairs {
            let key = key.into();
            if args.get(&key).is_none() {
                args.pairs.push((key, value.into()));
            }
        }
        args
    }

    /// Parse a query string or form body
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(form_urlencoded::parse(query.trim_start_matches('?').as_bytes()))
    }

    /// Value of an argument
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Arguments in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no arguments were given
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Arguments echoed in the `<request>` element
    ///
    /// A resumption request echoes only the verb and the token.
    pub fn echo(&self) -> Vec<(&str, &str)> {
        if self.get(ARG_RESUMPTION_TOKEN).is_some() {
            self.iter()
                .filter(|(k, _)| *k == ARG_VERB || *k == ARG_RESUMPTION_TOKEN)
                .collect()
        } else {
            self.iter().collect()
        }
    }
}

/// Turns request arguments into a validated `OaiRequest`
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestParser {
    codec: TokenCodec,
}

impl RequestParser {
    /// Create a parser validating tokens with `codec`
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// Validate the arguments of one request
    pub fn parse(&self, args: &RequestArgs, now: Timestamp) -> Result<OaiRequest> {
        let verb: Verb = args
            .get(ARG_VERB)
            .ok_or_else(|| Error::bad_verb("Missing verb"))?
            .parse()?;

        if let Some(token) = args.get(ARG_RESUMPTION_TOKEN) {
            return self.parse_resumption(verb, token, now);
        }

        check_arguments(verb, args)?;

        let required = |key: &str| -> Result<String> {
            args.get(key)
                .map(str::to_string)
                .ok_or_else(|| Error::bad_argument(format!("Missing argument: {key}")))
        };

        let request = match verb {
            Verb::Identify => OaiRequest::Identify,
            Verb::GetRecord => OaiRequest::GetRecord {
                identifier: required(ARG_IDENTIFIER)?,
                metadata_prefix: required(ARG_METADATA_PREFIX)?,
            },
            Verb::ListIdentifiers => OaiRequest::ListIdentifiers(ListRequest::Fresh(
                list_criteria(args, required(ARG_METADATA_PREFIX)?)?,
            )),
            Verb::ListRecords => OaiRequest::ListRecords(ListRequest::Fresh(list_criteria(
                args,
                required(ARG_METADATA_PREFIX)?,
            )?)),
            Verb::ListSets => OaiRequest::ListSets(None),
            Verb::ListMetadataFormats => OaiRequest::ListMetadataFormats {
                identifier: args.get(ARG_IDENTIFIER).map(str::to_string),
            },
        };

        tracing::debug!(?request, "Parsed request");
        Ok(request)
    }

    /// Collapse a resumption request to the verb and the decoded token
    fn parse_resumption(&self, verb: Verb, token: &str, now: Timestamp) -> Result<OaiRequest> {
        if !verb.accepts_resumption() {
            return Err(Error::bad_argument(format!(
                "Illegal argument for {verb}: {ARG_RESUMPTION_TOKEN}"
            )));
        }

        let continuation = self.codec.resume(token, now).inspect_err(|e| {
            tracing::warn!(%verb, token, error = %e, "Rejected resumption token");
        })?;
        tracing::debug!(%verb, cursor = continuation.cursor, "Resuming list request");

        Ok(match verb {
            Verb::ListIdentifiers => OaiRequest::ListIdentifiers(ListRequest::Resume(continuation)),
            Verb::ListRecords => OaiRequest::ListRecords(ListRequest::Resume(continuation)),
            _ => OaiRequest::ListSets(Some(continuation)),
        })
    }
}

/// Reject arguments the verb does not know
fn check_arguments(verb: Verb, args: &RequestArgs) -> Result<()> {
    for (key, _) in args.iter() {
        if key == ARG_VERB {
            continue;
        }
        let known = verb.required_args().contains(&key) || verb.optional_args().contains(&key);
        if !known {
            return Err(Error::bad_argument(format!("Illegal argument for {verb}: {key}")));
        }
    }
    Ok(())
}

/// Criteria of a fresh list request, with validated date bounds
fn list_criteria(args: &RequestArgs, metadata_prefix: String) -> Result<ListCriteria> {
    let from = args.get(ARG_FROM).map(parse_datestamp).transpose()?;
    let until = args.get(ARG_UNTIL).map(parse_datestamp).transpose()?;

    if let (Some((from, from_granularity)), Some((until, until_granularity))) = (from, until) {
        if from_granularity != until_granularity {
            return Err(Error::bad_argument(
                "from and until must have the same granularity",
            ));
        }
        if from > until {
            return Err(Error::bad_argument("from must not be later than until"));
        }
    }

    let mut criteria = ListCriteria::with_prefix(metadata_prefix)
        .range(from.map(|(ts, _)| ts), until.map(|(ts, _)| ts));
    if let Some(set) = args.get(ARG_SET) {
        criteria = criteria.set(set);
    }
    Ok(criteria)
}

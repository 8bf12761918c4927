//! Protocol request and response types

use crate::metadata::{DublinCoreRecord, MetadataFormat};
use crate::token::{Continuation, ListCriteria};
use crate::types::{Timestamp, Verb};

// ============================================================================
// Requests
// ============================================================================

/// First page or continuation of a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    /// First page, criteria taken from the request arguments
    Fresh(ListCriteria),
    /// Later page, criteria taken from a validated resumption token
    Resume(Continuation),
}

/// A validated OAI-PMH request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OaiRequest {
    Identify,
    GetRecord {
        identifier: String,
        metadata_prefix: String,
    },
    ListIdentifiers(ListRequest),
    ListRecords(ListRequest),
    ListSets(Option<Continuation>),
    ListMetadataFormats {
        identifier: Option<String>,
    },
}

impl OaiRequest {
    /// Verb of the request
    pub fn verb(&self) -> Verb {
        match self {
            Self::Identify => Verb::Identify,
            Self::GetRecord { .. } => Verb::GetRecord,
            Self::ListIdentifiers(_) => Verb::ListIdentifiers,
            Self::ListRecords(_) => Verb::ListRecords,
            Self::ListSets(_) => Verb::ListSets,
            Self::ListMetadataFormats { .. } => Verb::ListMetadataFormats,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Record header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub identifier: String,
    pub datestamp: Timestamp,
    pub set_specs: Vec<String>,
}

/// Rendered record metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordMetadata {
    /// Dublin Core elements, written by the envelope writer
    DublinCore(DublinCoreRecord),
    /// Pre-serialized XML (RDF) spliced verbatim
    Serialized(String),
}

/// Header plus metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub header: Header,
    pub metadata: RecordMetadata,
}

/// A set as listed by `ListSets`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetEntry {
    pub spec: String,
    pub name: String,
    pub description: Option<String>,
}

/// Repository description returned by `Identify`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identify {
    pub repository_name: String,
    pub base_url: String,
    pub protocol_version: String,
    pub admin_emails: Vec<String>,
    pub earliest_datestamp: Timestamp,
    pub deleted_record: String,
    pub granularity: String,
    pub compression: Vec<String>,
}

/// One page of a list response together with its bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage<T> {
    /// Visible items of this page
    pub items: Vec<T>,
    /// Criteria the next token is built from
    pub criteria: ListCriteria,
    /// Position of the first item of this page
    pub cursor: usize,
    /// Size of the whole result set, as reported on the first page
    pub complete_list_size: usize,
    /// Position of the first item of the next page; `None` on the last page
    pub next_cursor: Option<usize>,
}

impl<T> ListPage<T> {
    /// Whether a resumption token must be issued
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// A successful protocol response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OaiResponse {
    Identify(Identify),
    GetRecord(Record),
    ListIdentifiers(ListPage<Header>),
    ListRecords(ListPage<Record>),
    ListSets(ListPage<SetEntry>),
    ListMetadataFormats(Vec<MetadataFormat>),
}

impl OaiResponse {
    /// Verb the response answers
    pub fn verb(&self) -> Verb {
        match self {
            Self::Identify(_) => Verb::Identify,
            Self::GetRecord(_) => Verb::GetRecord,
            Self::ListIdentifiers(_) => Verb::ListIdentifiers,
            Self::ListRecords(_) => Verb::ListRecords,
            Self::ListSets(_) => Verb::ListSets,
            Self::ListMetadataFormats(_) => Verb::ListMetadataFormats,
        }
    }
}

//! Metadata module
//!
//! Supported formats and record rendering.
//!
//! # Overview
//!
//! - `FormatRegistry` - immutable table of metadata prefixes
//! - `DublinCoreRecord` - `oai_dc` mapping and writer
//! - `MetadataRenderer` - RDF serialization for DCAT-family prefixes

mod dublin_core;
mod formats;
mod rdf;

pub use dublin_core::DublinCoreRecord;
pub use formats::{FormatRegistry, MetadataFormat};
pub use rdf::{DcatRdfRenderer, MetadataRenderer};

/// Prefix of the mandatory Dublin Core format
pub const OAI_DC_PREFIX: &str = "oai_dc";

/// Schema of the Dublin Core format
pub const OAI_DC_SCHEMA: &str = "http://www.openarchives.org/OAI/2.0/oai_dc.xsd";

/// Namespace of the Dublin Core format
pub const OAI_DC_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";

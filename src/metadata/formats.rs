//! Metadata format table
//!
//! Built once at start-up from configuration and shared read-only.

use super::{OAI_DC_NAMESPACE, OAI_DC_PREFIX, OAI_DC_SCHEMA};
use crate::config::MetadataFormatConfig;
use crate::error::{Error, Result};
use serde::Serialize;

/// A metadata format offered to harvesters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataFormat {
    pub prefix: String,
    pub schema: String,
    pub namespace: String,
    /// RDF serializer profiles; empty for Dublin Core
    pub profiles: Vec<String>,
}

impl MetadataFormat {
    /// The built-in `oai_dc` format
    pub fn oai_dc() -> Self {
        Self {
            prefix: OAI_DC_PREFIX.to_string(),
            schema: OAI_DC_SCHEMA.to_string(),
            namespace: OAI_DC_NAMESPACE.to_string(),
            profiles: Vec::new(),
        }
    }

    /// Whether records in this format are rendered by an RDF serializer
    pub fn is_rdf(&self) -> bool {
        !self.profiles.is_empty()
    }
}

impl From<&MetadataFormatConfig> for MetadataFormat {
    fn from(config: &MetadataFormatConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            schema: config.schema.clone(),
            namespace: config.namespace.clone(),
            profiles: config.profiles.clone(),
        }
    }
}

/// Immutable table of supported formats, `oai_dc` first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRegistry {
    formats: Vec<MetadataFormat>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self {
            formats: vec![MetadataFormat::oai_dc()],
        }
    }
}

impl FormatRegistry {
    /// Build the table from configured formats
    pub fn from_config(configured: &[MetadataFormatConfig]) -> Self {
        let mut formats = vec![MetadataFormat::oai_dc()];
        formats.extend(
            configured
                .iter()
                .filter(|f| f.prefix != OAI_DC_PREFIX)
                .map(MetadataFormat::from),
        );
        Self { formats }
    }

    /// Look up a format by prefix
    pub fn get(&self, prefix: &str) -> Option<&MetadataFormat> {
        self.formats.iter().find(|f| f.prefix == prefix)
    }

    /// Look up a format, failing with `cannotDisseminateFormat`
    pub fn require(&self, prefix: &str) -> Result<&MetadataFormat> {
        self.get(prefix)
            .ok_or_else(|| Error::cannot_disseminate(prefix))
    }

    /// All formats in table order
    pub fn iter(&self) -> impl Iterator<Item = &MetadataFormat> {
        self.formats.iter()
    }

    /// Number of formats
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Always false; `oai_dc` is always present
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

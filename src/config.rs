//! Server configuration
//!
//! The configuration is a YAML document where every field has a default, so
//! an empty file (or no file at all) yields a working server.
//!
//! ```yaml
//! repository_name: Open Data Portal
//! site_url: https://data.example.org
//! admin_emails: [support@example.org]
//! batch_size: 4
//! token_validity_secs: 60
//! unknown_set: empty
//! metadata_formats:
//!   - prefix: dcat
//!     schema: http://www.openarchives.org/OAI/2.0/rdf.xsd
//!     namespace: http://www.openarchives.org/OAI/2.0/rdf/
//!     profiles: [dcat_ap_edp_mqa]
//! ```

use crate::error::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// Top-Level Server Config
// ============================================================================

/// Complete server configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Repository name reported by `Identify`
    #[serde(default = "default_repository_name")]
    pub repository_name: String,

    /// Public site URL; the OAI endpoint and record URLs hang off it
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Route of the OAI-PMH endpoint
    #[serde(default = "default_oai_path")]
    pub oai_path: String,

    /// Administrator contacts reported by `Identify`
    #[serde(default)]
    pub admin_emails: Vec<String>,

    /// Slots per list response. One slot is reserved, so each page
    /// carries `batch_size - 1` items (never fewer than one).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Lifetime of an issued resumption token; 0 disables expiry
    #[serde(default = "default_token_validity")]
    pub token_validity_secs: u64,

    /// Behavior when a list request names a set that does not exist
    #[serde(default)]
    pub unknown_set: UnknownSetPolicy,

    /// Metadata formats offered in addition to `oai_dc`
    #[serde(default = "default_metadata_formats")]
    pub metadata_formats: Vec<MetadataFormatConfig>,
}

fn default_repository_name() -> String {
    "repository".to_string()
}

fn default_site_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_oai_path() -> String {
    "/oai".to_string()
}

fn default_batch_size() -> usize {
    4
}

fn default_token_validity() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            repository_name: default_repository_name(),
            site_url: default_site_url(),
            oai_path: default_oai_path(),
            admin_emails: Vec::new(),
            batch_size: default_batch_size(),
            token_validity_secs: default_token_validity(),
            unknown_set: UnknownSetPolicy::default(),
            metadata_formats: default_metadata_formats(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ServerConfig = if yaml.trim().is_empty() {
            ServerConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::invalid_config("batch_size", "must be at least 1"));
        }
        if self.site_url.trim().is_empty() {
            return Err(Error::invalid_config("site_url", "cannot be empty"));
        }
        if !self.oai_path.starts_with('/') {
            return Err(Error::invalid_config("oai_path", "must start with '/'"));
        }

        let mut seen = HashSet::new();
        for format in &self.metadata_formats {
            if format.prefix.is_empty() {
                return Err(Error::invalid_config(
                    "metadata_formats",
                    "prefix cannot be empty",
                ));
            }
            if format.prefix == crate::metadata::OAI_DC_PREFIX {
                return Err(Error::invalid_config(
                    "metadata_formats",
                    "oai_dc is built in and cannot be redefined",
                ));
            }
            if !seen.insert(format.prefix.as_str()) {
                return Err(Error::invalid_config(
                    "metadata_formats",
                    format!("duplicate prefix '{}'", format.prefix),
                ));
            }
        }
        Ok(())
    }

    /// Number of items served per page
    pub fn page_size(&self) -> usize {
        self.batch_size.saturating_sub(1).max(1)
    }

    /// Token validity window, `None` when expiry is disabled
    pub fn token_validity(&self) -> Option<Duration> {
        if self.token_validity_secs == 0 {
            None
        } else {
            i64::try_from(self.token_validity_secs)
                .ok()
                .map(Duration::seconds)
        }
    }

    /// Absolute URL of the OAI-PMH endpoint
    pub fn base_url(&self) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), self.oai_path)
    }

    /// Canonical landing page of a record
    pub fn record_url(&self, name: &str) -> String {
        format!("{}/dataset/{name}", self.site_url.trim_end_matches('/'))
    }
}

// ============================================================================
// Unknown Set Policy
// ============================================================================

/// What a list request naming an unknown set returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownSetPolicy {
    /// Treat the set as empty (historical behavior)
    #[default]
    Empty,
    /// Report `noSetHierarchy`
    NoSetHierarchy,
}

// ============================================================================
// Metadata Formats
// ============================================================================

/// A metadata format offered by the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFormatConfig {
    /// metadataPrefix used by harvesters
    pub prefix: String,

    /// XML schema URL
    pub schema: String,

    /// XML namespace URI
    pub namespace: String,

    /// RDF serializer profiles; formats with profiles are rendered as RDF
    #[serde(default)]
    pub profiles: Vec<String>,
}

impl MetadataFormatConfig {
    /// Create a format entry
    pub fn new(
        prefix: impl Into<String>,
        schema: impl Into<String>,
        namespace: impl Into<String>,
        profiles: &[&str],
    ) -> Self {
        Self {
            prefix: prefix.into(),
            schema: schema.into(),
            namespace: namespace.into(),
            profiles: profiles.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

fn default_metadata_formats() -> Vec<MetadataFormatConfig> {
    const OAI_DC_XSD: &str = "http://www.openarchives.org/OAI/2.0/oai_dc.xsd";
    const OAI_DC_NS: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";

    vec![
        MetadataFormatConfig::new("rdf", OAI_DC_XSD, OAI_DC_NS, &["euro_dcat_ap"]),
        MetadataFormatConfig::new(
            "dcat",
            "http://www.openarchives.org/OAI/2.0/rdf.xsd",
            "http://www.openarchives.org/OAI/2.0/rdf/",
            &["dcat_ap_edp_mqa"],
        ),
        MetadataFormatConfig::new("dcat_2.1.0", OAI_DC_XSD, OAI_DC_NS, &["euro_dcat_ap_2"]),
        MetadataFormatConfig::new("dcat_1.1.1", OAI_DC_XSD, OAI_DC_NS, &["euro_dcat_ap"]),
    ]
}

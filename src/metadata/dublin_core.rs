//! Dublin Core mapping of datasets
//!
//! Builds the unqualified Dublin Core element set from a dataset and writes
//! it as an `oai_dc:dc` container. Every element is a list of strings; scalar
//! dataset fields become singleton lists and empty values are dropped.

use super::{OAI_DC_NAMESPACE, OAI_DC_SCHEMA};
use crate::config::ServerConfig;
use crate::error::Result;
use crate::repository::Dataset;
use crate::types::format_day;
use crate::xml::{self, XmlWriter};

const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Dublin Core metadata record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DublinCoreRecord {
    pub title: Vec<String>,
    pub creator: Vec<String>,
    pub subject: Vec<String>,
    pub description: Vec<String>,
    pub publisher: Vec<String>,
    pub contributor: Vec<String>,
    pub date: Vec<String>,
    pub dc_type: Vec<String>,
    pub format: Vec<String>,
    pub identifier: Vec<String>,
    pub source: Vec<String>,
    pub language: Vec<String>,
    pub relation: Vec<String>,
    pub coverage: Vec<String>,
    pub rights: Vec<String>,
}

impl DublinCoreRecord {
    /// Map a dataset to Dublin Core
    pub fn from_dataset(dataset: &Dataset, config: &ServerConfig) -> Self {
        let title_source = dataset
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&dataset.name);

        let mut identifier: Vec<String> = dataset
            .pids
            .iter()
            .filter_map(|p| p.id.clone())
            .filter(|id| !id.is_empty())
            .collect();
        identifier.push(dataset.id.clone());
        identifier.push(config.record_url(&dataset.name));

        Self {
            title: translations(title_source),
            creator: agent_names(dataset.agents_with_role("author")),
            publisher: agent_names(
                dataset
                    .agents_with_role("distributor")
                    .chain(dataset.contacts.iter()),
            ),
            contributor: agent_names(dataset.agents_with_role("contributor")),
            identifier,
            dc_type: vec!["dataset".to_string()],
            language: dataset.language.as_deref().map(split_list).unwrap_or_default(),
            description: dataset
                .notes
                .as_deref()
                .filter(|n| !n.is_empty())
                .map(translations)
                .unwrap_or_default(),
            subject: dataset.tags.iter().map(|t| t.label().to_string()).collect(),
            date: vec![format_day(&dataset.metadata_created)],
            rights: dataset
                .license_title
                .iter()
                .filter(|l| !l.is_empty())
                .cloned()
                .collect(),
            coverage: coverage(dataset),
            ..Default::default()
        }
    }

    /// Elements in canonical order with their qualified names
    pub fn elements(&self) -> [(&'static str, &[String]); 15] {
        [
            ("dc:title", self.title.as_slice()),
            ("dc:creator", self.creator.as_slice()),
            ("dc:subject", self.subject.as_slice()),
            ("dc:description", self.description.as_slice()),
            ("dc:publisher", self.publisher.as_slice()),
            ("dc:contributor", self.contributor.as_slice()),
            ("dc:date", self.date.as_slice()),
            ("dc:type", self.dc_type.as_slice()),
            ("dc:format", self.format.as_slice()),
            ("dc:identifier", self.identifier.as_slice()),
            ("dc:source", self.source.as_slice()),
            ("dc:language", self.language.as_slice()),
            ("dc:relation", self.relation.as_slice()),
            ("dc:coverage", self.coverage.as_slice()),
            ("dc:rights", self.rights.as_slice()),
        ]
    }

    /// Write the `oai_dc:dc` container
    pub fn write_xml(&self, writer: &mut XmlWriter) -> Result<()> {
        let schema_location = format!("{OAI_DC_NAMESPACE} {OAI_DC_SCHEMA}");
        xml::start(
            writer,
            "oai_dc:dc",
            &[
                ("xmlns:oai_dc", OAI_DC_NAMESPACE),
                ("xmlns:dc", DC_NAMESPACE),
                ("xmlns:xsi", XSI_NAMESPACE),
                ("xsi:schemaLocation", schema_location.as_str()),
            ],
        )?;
        for (name, values) in self.elements() {
            for value in values {
                xml::text_element(writer, name, value)?;
            }
        }
        xml::end(writer, "oai_dc:dc")
    }

}

/// Values of a multilingual JSON object, or the text itself
fn translations(text: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => map
            .values()
            .filter_map(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect(),
        _ => vec![text.to_string()],
    }
}

fn agent_names<'a>(agents: impl Iterator<Item = &'a crate::repository::Agent>) -> Vec<String> {
    agents.filter_map(|a| a.name.clone()).collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

fn coverage(dataset: &Dataset) -> Vec<String> {
    let mut coverage = dataset
        .geographic_coverage
        .as_deref()
        .map(split_list)
        .unwrap_or_default();

    let begin = dataset.temporal_coverage_begin.as_deref().unwrap_or("");
    let end = dataset.temporal_coverage_end.as_deref().unwrap_or("");
    if !begin.is_empty() || !end.is_empty() {
        coverage.push(format!("{begin}/{end}"));
    }
    coverage
}

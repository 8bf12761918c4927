//! In-memory repository
//!
//! Holds a catalogue dump (datasets and groups) loaded from JSON or YAML.

use super::types::{DateRange, Dataset, Group};
use super::Repository;
use crate::error::{Error, Result};
use crate::types::Timestamp;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serialized catalogue dump
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogueData {
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// Repository backed by vectors in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    datasets: Vec<Dataset>,
    groups: Vec<Group>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository from datasets and groups
    pub fn with_data(datasets: Vec<Dataset>, groups: Vec<Group>) -> Self {
        Self { datasets, groups }
    }

    /// Load a catalogue dump; `.yaml`/`.yml` files are read as YAML,
    /// everything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::repository(format!(
                    "Failed to read catalogue '{}': {e}",
                    path.display()
                ))
            }
        })?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let data: CatalogueData = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        tracing::info!(
            datasets = data.datasets.len(),
            groups = data.groups.len(),
            "Loaded catalogue from {}",
            path.display()
        );
        Ok(Self::with_data(data.datasets, data.groups))
    }

    /// Add a dataset
    pub fn add_dataset(&mut self, dataset: Dataset) {
        self.datasets.push(dataset);
    }

    /// Add a group
    pub fn add_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// Number of datasets, in any state
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Whether no datasets are stored
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn query_active_records(
        &self,
        group: Option<&Group>,
        range: &DateRange,
    ) -> Result<Vec<Dataset>> {
        let mut matches: Vec<Dataset> = self
            .datasets
            .iter()
            .filter(|d| d.is_harvestable())
            .filter(|d| group.map_or(true, |g| d.belongs_to(g)))
            .filter(|d| range.contains(&d.metadata_modified))
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            a.metadata_modified
                .cmp(&b.metadata_modified)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matches)
    }

    async fn resolve_group(&self, name: &str) -> Result<Option<Group>> {
        Ok(self
            .groups
            .iter()
            .find(|g| g.is_active() && (g.name == name || g.id == name))
            .cloned())
    }

    async fn get_record(&self, id: &str) -> Result<Option<Dataset>> {
        Ok(self
            .datasets
            .iter()
            .find(|d| d.id == id || d.name == id)
            .cloned())
    }

    async fn earliest_timestamp(&self) -> Result<Option<Timestamp>> {
        Ok(self
            .datasets
            .iter()
            .filter(|d| d.is_harvestable())
            .map(|d| d.metadata_created)
            .min())
    }

    async fn active_groups(&self) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self.groups.iter().filter(|g| g.is_active()).cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }
}

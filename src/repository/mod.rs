//! Repository module
//!
//! The record store the OAI-PMH verbs are served from.
//!
//! # Overview
//!
//! - `Repository` - the query interface the protocol layer consumes
//! - `InMemoryRepository` - catalogue dump held in memory (JSON/YAML)
//! - `Dataset`, `Group` - the record model; groups are exposed as sets

mod memory;
mod types;

pub use memory::{CatalogueData, InMemoryRepository};
pub use types::{Agent, DateRange, Dataset, Group, Pid, RecordState, Tag};

use crate::error::Result;
use crate::types::Timestamp;
use async_trait::async_trait;

/// Query interface over the record store
///
/// Implementations are shared across concurrent requests and must not
/// keep per-request state.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Harvestable records, optionally restricted to a group, bounded by
    /// `metadata_modified`, in a stable order
    async fn query_active_records(
        &self,
        group: Option<&Group>,
        range: &DateRange,
    ) -> Result<Vec<Dataset>>;

    /// Resolve an active group by name or id
    async fn resolve_group(&self, name: &str) -> Result<Option<Group>>;

    /// Look up a record by id or name, in any state
    async fn get_record(&self, id: &str) -> Result<Option<Dataset>>;

    /// Creation time of the oldest harvestable record
    async fn earliest_timestamp(&self) -> Result<Option<Timestamp>>;

    /// Active groups, in a stable order
    async fn active_groups(&self) -> Result<Vec<Group>>;
}

#[cfg(test)]
mod tests;

//! Batch selector
//!
//! Composes the repository query for a list verb and returns one page.

use super::types::{BatchFilter, RecordBatch};
use crate::config::UnknownSetPolicy;
use crate::error::{Error, Result};
use crate::repository::{DateRange, Dataset, Group, Repository};
use std::sync::Arc;

/// Runs list queries against the repository and slices them into pages
#[derive(Clone)]
pub struct BatchSelector {
    repository: Arc<dyn Repository>,
    unknown_set: UnknownSetPolicy,
}

impl BatchSelector {
    /// Create a selector
    pub fn new(repository: Arc<dyn Repository>, unknown_set: UnknownSetPolicy) -> Self {
        Self {
            repository,
            unknown_set,
        }
    }

    /// Select the page of records starting at `cursor`
    ///
    /// Without a set, all harvestable records are considered. With a set,
    /// the set is resolved as a group; an unknown group yields an empty
    /// result unless the selector reports `noSetHierarchy`.
    pub async fn select_batch(
        &self,
        filter: &BatchFilter,
        cursor: Option<usize>,
        page_size: usize,
    ) -> Result<RecordBatch<Dataset>> {
        let range = DateRange::from_bounds(filter.from, filter.until);

        let (records, group) = match &filter.set {
            None => (
                self.repository.query_active_records(None, &range).await?,
                None,
            ),
            Some(set) => match self.repository.resolve_group(set).await? {
                Some(group) => {
                    let records = self
                        .repository
                        .query_active_records(Some(&group), &range)
                        .await?;
                    (records, Some(group))
                }
                None => match self.unknown_set {
                    UnknownSetPolicy::Empty => {
                        tracing::debug!(set = %set, "Unknown set, returning an empty result");
                        (Vec::new(), None)
                    }
                    UnknownSetPolicy::NoSetHierarchy => {
                        return Err(Error::NoSetHierarchy { set: set.clone() });
                    }
                },
            },
        };

        let batch = RecordBatch::slice(records, group, cursor, page_size);
        tracing::debug!(
            total = batch.total,
            cursor = batch.cursor,
            returned = batch.items.len(),
            next = ?batch.next_cursor,
            "Selected record batch"
        );
        Ok(batch)
    }

    /// Select the page of sets starting at `cursor`
    pub async fn select_sets(
        &self,
        cursor: Option<usize>,
        page_size: usize,
    ) -> Result<RecordBatch<Group>> {
        let groups = self.repository.active_groups().await?;
        Ok(RecordBatch::slice(groups, None, cursor, page_size))
    }
}

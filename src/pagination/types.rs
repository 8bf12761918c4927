//! Pagination types
//!
//! Defines the filter, window and batch structures shared by the selector
//! and the protocol layer.

use crate::repository::Group;
use crate::token::ListCriteria;
use crate::types::Timestamp;

/// Filter applied to a list query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFilter {
    /// Set spec (group name or id)
    pub set: Option<String>,
    /// Lower bound on `metadata_modified`
    pub from: Option<Timestamp>,
    /// Upper bound on `metadata_modified`
    pub until: Option<Timestamp>,
}

impl BatchFilter {
    /// Filter without any restriction
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a set
    #[must_use]
    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    /// Restrict to a date range
    #[must_use]
    pub fn with_range(mut self, from: Option<Timestamp>, until: Option<Timestamp>) -> Self {
        self.from = from;
        self.until = until;
        self
    }
}

impl From<&ListCriteria> for BatchFilter {
    fn from(criteria: &ListCriteria) -> Self {
        Self {
            set: criteria.set.clone(),
            from: criteria.from,
            until: criteria.until,
        }
    }
}

/// Half-open window `[start, end)` into an ordered result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    /// Compute the window for a cursor over `total` items
    ///
    /// A missing cursor means the first page. A cursor past the end yields
    /// an empty window at `total`.
    pub fn new(cursor: Option<usize>, page_size: usize, total: usize) -> Self {
        let start = cursor.unwrap_or(0).min(total);
        let end = start.saturating_add(page_size.max(1)).min(total);
        Self { start, end }
    }

    /// Number of items in the window
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Cursor of the following page, `None` on the last page
    pub fn next_cursor(&self, total: usize) -> Option<usize> {
        (self.end < total).then_some(self.end)
    }
}

/// One page of a list query
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch<T> {
    /// Items of this page, in query order
    pub items: Vec<T>,
    /// Group the query was restricted to
    pub group: Option<Group>,
    /// Number of items matching the query across all pages
    pub total: usize,
    /// Position of the first item of this page
    pub cursor: usize,
    /// Position of the first item of the next page
    pub next_cursor: Option<usize>,
}

impl<T> RecordBatch<T> {
    /// Cut a page out of the full ordered result
    pub fn slice(
        all: Vec<T>,
        group: Option<Group>,
        cursor: Option<usize>,
        page_size: usize,
    ) -> Self {
        let total = all.len();
        let window = PageWindow::new(cursor, page_size, total);
        let items = all
            .into_iter()
            .skip(window.start)
            .take(window.len())
            .collect();

        Self {
            items,
            group,
            total,
            cursor: window.start,
            next_cursor: window.next_cursor(total),
        }
    }

    /// Transform the items, keeping the page bookkeeping
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> RecordBatch<U> {
        RecordBatch {
            items: self.items.into_iter().map(f).collect(),
            group: self.group,
            total: self.total,
            cursor: self.cursor,
            next_cursor: self.next_cursor,
        }
    }
}

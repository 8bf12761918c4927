//! Pagination module
//!
//! Slices a list query into bounded pages.
//!
//! # Overview
//!
//! The `BatchSelector` runs the query for a list verb and cuts the ordered
//! result into a half-open window `[cursor, cursor + page_size)`, clamped to
//! the total. The returned `RecordBatch` carries the slice, the total match
//! count and the cursor of the next page, so callers never have to infer
//! the size of the result set from the slice itself.

mod selector;
mod types;

pub use selector::BatchSelector;
pub use types::{BatchFilter, PageWindow, RecordBatch};

//! Resumption token module
//!
//! Encodes, decodes and validates the opaque continuation token handed to
//! harvesters between pages of a list response.
//!
//! # Overview
//!
//! The token is self-describing: it carries the list criteria (set, date
//! range, metadata prefix) together with the cursor, so the server keeps no
//! session state between requests. On the wire it is a form-urlencoded
//! mapping:
//!
//! ```text
//! metadataPrefix=oai_dc&set=energy&cursor=3&completeListSize=10&expirationDate=1699999999
//! ```

mod codec;
mod types;

pub use codec::TokenCodec;
pub use types::{Continuation, ListCriteria, ResumptionToken};

#[cfg(test)]
mod tests;

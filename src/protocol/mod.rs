//! Protocol module
//!
//! The verb handlers of the OAI-PMH server.
//!
//! # Overview
//!
//! The adapter turns HTTP arguments into an `OaiRequest`, the `Dispatcher`
//! serves it from the repository, and the adapter writes the resulting
//! `OaiResponse` into the XML envelope. List responses come back as a
//! `ListPage` that carries its own bookkeeping (cursor, complete list size,
//! next cursor); no out-of-band marker travels inside the items.

mod dispatcher;
mod types;

pub use dispatcher::Dispatcher;
pub use types::{
    Header, Identify, ListPage, ListRequest, OaiRequest, OaiResponse, Record, RecordMetadata,
    SetEntry,
};

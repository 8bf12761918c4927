// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # OAI-PMH Server
//!
//! A stateless OAI-PMH 2.0 repository server over a catalogue of datasets.
//!
//! ## Features
//!
//! - **All six verbs**: Identify, GetRecord, ListIdentifiers, ListRecords,
//!   ListSets, ListMetadataFormats
//! - **Stateless pagination**: resumption tokens carry the whole query, so any
//!   server instance can serve the next page
//! - **Metadata formats**: built-in `oai_dc`, plus RDF/DCAT formats through a
//!   pluggable renderer
//! - **Sets**: organizations and groups are exposed as sets
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use oai_pmh_server::adapter::{OaiService, RequestArgs};
//! use oai_pmh_server::repository::InMemoryRepository;
//! use oai_pmh_server::config::ServerConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> oai_pmh_server::Result<()> {
//!     let repository = InMemoryRepository::from_file("catalogue.json")?;
//!     let service = OaiService::new(ServerConfig::default(), Arc::new(repository));
//!
//!     let args = RequestArgs::from_query("verb=ListRecords&metadataPrefix=oai_dc");
//!     let xml = service.handle(&args, oai_pmh_server::now_seconds()).await?;
//!     println!("{xml}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     HTTP  (GET/POST /oai)                       │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Adapter: RequestParser → Dispatcher → EnvelopeWriter           │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────┬──────────────┬───────────┐
//! │    Token     │      Pagination       │   Metadata   │ Repository│
//! ├──────────────┼───────────────────────┼──────────────┼───────────┤
//! │ Encode       │ BatchSelector         │ oai_dc       │ Datasets  │
//! │ Decode       │ Half-open windows     │ DCAT / RDF   │ Groups    │
//! │ Expiry       │ Set / date filters    │ Registry     │ In-memory │
//! └──────────────┴───────────────────────┴──────────────┴───────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the server
pub mod error;

/// Common types and type aliases
pub mod types;

/// Server configuration
pub mod config;

/// XML writing helpers
pub mod xml;

/// Resumption token codec
pub mod token;

/// Record store interface and in-memory implementation
pub mod repository;

/// Page selection over list queries
pub mod pagination;

/// Metadata formats and record rendering
pub mod metadata;

/// Verb handlers
pub mod protocol;

/// HTTP argument parsing and XML envelope
pub mod adapter;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use adapter::{OaiService, RequestArgs};
pub use config::ServerConfig;
pub use repository::{InMemoryRepository, Repository};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! CLI module
//!
//! Command-line interface for serving and inspecting the repository.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `request` - Run one OAI-PMH request and print the XML
//! - `decode-token` - Decode (and validate) a resumption token
//! - `formats` - List the configured metadata formats
//! - `validate` - Validate the configuration file

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve};

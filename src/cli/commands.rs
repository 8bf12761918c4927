//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OAI-PMH repository server
#[derive(Parser, Debug)]
#[command(name = "oai-pmh-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalogue dump to serve (JSON or YAML)
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Output format for JSON-producing commands
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Run one OAI-PMH request and print the XML response
    Request {
        /// Query string, e.g. "verb=ListRecords&metadataPrefix=oai_dc"
        query: String,
    },

    /// Decode a resumption token
    DecodeToken {
        /// Token as it appears in a response
        token: String,

        /// Also check expiry and cursor bounds
        #[arg(long)]
        validate: bool,
    },

    /// List the configured metadata formats
    Formats,

    /// Validate the configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

//! CLI runner - executes commands

use crate::adapter::{OaiService, RequestArgs};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ServerConfig;
use crate::error::{Result, ResultExt};
use crate::metadata::FormatRegistry;
use crate::repository::InMemoryRepository;
use crate::token::TokenCodec;
use crate::types::now_seconds;
use serde_json::{json, Value};
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Serve { port } => {
                let service = self.build_service()?;
                crate::cli::serve(service, *port).await
            }
            Commands::Request { query } => self.request(query).await,
            Commands::DecodeToken { token, validate } => self.decode_token(token, *validate),
            Commands::Formats => self.formats(),
            Commands::Validate => self.validate(),
        }
    }

    /// Load and validate the configuration, falling back to defaults
    fn load_config(&self) -> Result<ServerConfig> {
        let config = match &self.cli.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the catalogue dump, or start empty
    fn load_repository(&self) -> Result<InMemoryRepository> {
        match &self.cli.data {
            Some(path) => InMemoryRepository::from_file(path)
                .with_context(|| format!("Failed to load catalogue {}", path.display())),
            None => {
                tracing::warn!("No catalogue given (use --data), serving an empty repository");
                Ok(InMemoryRepository::new())
            }
        }
    }

    fn build_service(&self) -> Result<OaiService> {
        let config = self.load_config()?;
        let repository = self.load_repository()?;
        Ok(OaiService::new(config, Arc::new(repository)))
    }

    /// Run one request and print the response document
    async fn request(&self, query: &str) -> Result<()> {
        let service = self.build_service()?;
        let args = RequestArgs::from_query(query);
        let xml = service.handle(&args, now_seconds()).await?;
        println!("{xml}");
        Ok(())
    }

    /// Decode (and optionally validate) a resumption token
    fn decode_token(&self, raw: &str, validate: bool) -> Result<()> {
        let config = self.load_config()?;
        let codec = TokenCodec::new(config.token_validity());
        let token = codec.decode(raw)?;

        if validate {
            codec.validate(token.clone(), now_seconds())?;
        }

        self.output_message(&json!({
            "type": "TOKEN",
            "token": token,
            "validated": validate,
            "validity_secs": codec.validity().map(|v| v.num_seconds())
        }));
        Ok(())
    }

    /// Print the metadata format table
    fn formats(&self) -> Result<()> {
        let config = self.load_config()?;
        let registry = FormatRegistry::from_config(&config.metadata_formats);
        let formats: Vec<Value> = registry
            .iter()
            .map(|f| {
                json!({
                    "metadataPrefix": f.prefix,
                    "schema": f.schema,
                    "metadataNamespace": f.namespace,
                    "profiles": f.profiles
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "FORMATS",
            "formats": formats
        }));
        Ok(())
    }

    /// Validate the configuration file
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Configuration for '{}' is valid: {} records per page, {} metadata formats",
                    config.repository_name,
                    config.page_size(),
                    FormatRegistry::from_config(&config.metadata_formats).len()
                )
            }
        }));
        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

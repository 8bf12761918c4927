//! Error types for the OAI-PMH server
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Protocol errors (bad arguments, unknown identifiers, ...) are rendered
//! in-band as `<error code="...">` elements; everything else is fatal for
//! the request.

use thiserror::Error;

/// The main error type for the OAI-PMH server
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // OAI-PMH Protocol Errors
    // ============================================================================
    #[error("{message}")]
    BadArgument { message: String },

    #[error("{message}")]
    BadResumptionToken { message: String },

    #[error("{message}")]
    BadVerb { message: String },

    #[error("The metadata format '{prefix}' is not supported by this repository")]
    CannotDisseminateFormat { prefix: String },

    #[error("No matching identifier: {identifier}")]
    IdDoesNotExist { identifier: String },

    #[error("Set '{set}' does not exist in this repository")]
    NoSetHierarchy { set: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Repository / Rendering Errors
    // ============================================================================
    #[error("Repository error: {message}")]
    Repository { message: String },

    #[error("Metadata rendering failed: {message}")]
    Render { message: String },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a bad argument error
    pub fn bad_argument(message: impl Into<String>) -> Self {
        Self::BadArgument {
            message: message.into(),
        }
    }

    /// Create a bad resumption token error
    pub fn bad_token(message: impl Into<String>) -> Self {
        Self::BadResumptionToken {
            message: message.into(),
        }
    }

    /// Create a bad verb error
    pub fn bad_verb(message: impl Into<String>) -> Self {
        Self::BadVerb {
            message: message.into(),
        }
    }

    /// Create a cannot-disseminate-format error
    pub fn cannot_disseminate(prefix: impl Into<String>) -> Self {
        Self::CannotDisseminateFormat {
            prefix: prefix.into(),
        }
    }

    /// Create an id-does-not-exist error
    pub fn id_does_not_exist(identifier: impl Into<String>) -> Self {
        Self::IdDoesNotExist {
            identifier: identifier.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a repository error
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// OAI-PMH error code for protocol errors, `None` for fatal ones
    pub fn oai_code(&self) -> Option<&'static str> {
        match self {
            Error::BadArgument { .. } => Some("badArgument"),
            Error::BadResumptionToken { .. } => Some("badResumptionToken"),
            Error::BadVerb { .. } => Some("badVerb"),
            Error::CannotDisseminateFormat { .. } => Some("cannotDisseminateFormat"),
            Error::IdDoesNotExist { .. } => Some("idDoesNotExist"),
            Error::NoSetHierarchy { .. } => Some("noSetHierarchy"),
            _ => None,
        }
    }

    /// Check if this error is reported in-band to the harvester
    pub fn is_protocol_error(&self) -> bool {
        self.oai_code().is_some()
    }
}

/// Result type alias for the OAI-PMH server
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::id_does_not_exist("abc");
        assert_eq!(err.to_string(), "No matching identifier: abc");

        let err = Error::bad_token("expirationDate is in the past");
        assert_eq!(err.to_string(), "expirationDate is in the past");
    }

    #[test]
    fn test_oai_codes() {
        assert_eq!(Error::bad_argument("x").oai_code(), Some("badArgument"));
        assert_eq!(Error::bad_token("x").oai_code(), Some("badResumptionToken"));
        assert_eq!(Error::bad_verb("x").oai_code(), Some("badVerb"));
        assert_eq!(
            Error::cannot_disseminate("marc").oai_code(),
            Some("cannotDisseminateFormat")
        );
        assert_eq!(
            Error::id_does_not_exist("x").oai_code(),
            Some("idDoesNotExist")
        );
        assert_eq!(
            Error::NoSetHierarchy { set: "x".into() }.oai_code(),
            Some("noSetHierarchy")
        );
    }

    #[test]
    fn test_fatal_errors_are_not_protocol_errors() {
        assert!(!Error::repository("down").is_protocol_error());
        assert!(!Error::config("bad").is_protocol_error());
        assert!(Error::bad_argument("x").is_protocol_error());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}

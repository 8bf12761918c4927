//! Adapter module
//!
//! Translates between HTTP arguments and the protocol layer.
//!
//! # Overview
//!
//! - `RequestArgs` / `RequestParser` - flatten and validate inbound arguments
//! - `EnvelopeWriter` - the OAI-PMH XML envelope, including token issuing
//! - `OaiService` - one request end to end
//!
//! Protocol errors become `<error>` elements in an otherwise normal
//! response; any other error is returned to the caller as fatal.

mod request;
mod response;

pub use request::{RequestArgs, RequestParser};
pub use response::EnvelopeWriter;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::protocol::Dispatcher;
use crate::repository::Repository;
use crate::token::TokenCodec;
use crate::types::Timestamp;
use std::sync::Arc;

/// Serves complete OAI-PMH requests
pub struct OaiService {
    dispatcher: Dispatcher,
    parser: RequestParser,
    writer: EnvelopeWriter,
}

impl OaiService {
    /// Create a service over a repository
    pub fn new(config: ServerConfig, repository: Arc<dyn Repository>) -> Self {
        Self::from_dispatcher(Dispatcher::new(config, repository))
    }

    /// Create a service around an existing dispatcher
    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        let codec = TokenCodec::new(dispatcher.config().token_validity());
        let writer = EnvelopeWriter::new(dispatcher.config().base_url(), codec);
        Self {
            dispatcher,
            parser: RequestParser::new(codec),
            writer,
        }
    }

    /// The underlying dispatcher
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one request and return the XML document
    ///
    /// `now` drives token expiry checks, the expiration of issued tokens
    /// and the `responseDate`.
    pub async fn handle(&self, args: &RequestArgs, now: Timestamp) -> Result<String> {
        let result = match self.parser.parse(args, now) {
            Ok(request) => self.dispatcher.dispatch(request).await,
            Err(e) => Err(e),
        };

        let echo = args.echo();
        match result {
            Ok(response) => self.writer.write_response(&echo, &response, now),
            Err(e) if e.is_protocol_error() => {
                tracing::debug!(code = e.oai_code(), error = %e, "Protocol error");
                // badVerb and badArgument responses must not echo the arguments
                let echo = match e {
                    Error::BadVerb { .. } | Error::BadArgument { .. } => &[][..],
                    _ => echo.as_slice(),
                };
                self.writer.write_error(echo, &e, now)
            }
            Err(e) => Err(e),
        }
    }
}

//! HTTP server mode for OAI-PMH harvesting

use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use quick_xml::escape::escape;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapter::{OaiService, RequestArgs};
use crate::error::{Error, Result};
use crate::types::now_seconds;

const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    service: Arc<OaiService>,
}

/// Build the router: the OAI-PMH endpoint (GET and POST) and `/health`
pub fn router(service: Arc<OaiService>) -> Router {
    let oai_path = service.dispatcher().config().oai_path.clone();
    let state = AppState { service };

    // Build CORS layer - allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(&oai_path, get(oai_get).post(oai_post))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve(service: OaiService, port: u16) -> Result<()> {
    let app = router(Arc::new(service));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting OAI-PMH server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `GET` with arguments in the query string; without a `verb` the endpoint
/// serves a landing page for browsers
async fn oai_get(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let args = RequestArgs::from_query(query.as_deref().unwrap_or_default());
    if args.get("verb").is_none() {
        return landing(&state);
    }
    respond(&state, &args).await
}

fn landing(state: &AppState) -> Response {
    let config = state.service.dispatcher().config();
    let name = escape(config.repository_name.as_str());
    let base_url = config.base_url();
    let base_url = escape(&base_url);
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{name} OAI-PMH</title></head>\n<body>\n\
         <h1>{name}</h1>\n\
         <p>This is an OAI-PMH 2.0 endpoint. Start with \
         <a href=\"{base_url}?verb=Identify\">Identify</a> or \
         <a href=\"{base_url}?verb=ListMetadataFormats\">ListMetadataFormats</a>.</p>\n\
         </body>\n</html>\n"
    );
    (StatusCode::OK, [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], body).into_response()
}

/// `POST` with an `application/x-www-form-urlencoded` body
async fn oai_post(State(state): State<AppState>, body: String) -> Response {
    let args = RequestArgs::from_query(&body);
    respond(&state, &args).await
}

async fn respond(state: &AppState, args: &RequestArgs) -> Response {
    match state.service.handle(args, now_seconds()).await {
        Ok(xml) => (StatusCode::OK, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "OAI-PMH request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {e}"),
            )
                .into_response()
        }
    }
}

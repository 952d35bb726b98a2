//! AgriSakha HTTP server.
//!
//! Exposes the advisory pipeline, image upload, and query history as a
//! small JSON API for the web frontend.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Service name, version, and endpoint list |
//! | `GET`  | `/health` | Liveness check with current timestamp |
//! | `POST` | `/advisory` | Answer a farmer query (logged) |
//! | `POST` | `/upload-image` | Store a crop image and return a placeholder analysis |
//! | `GET`  | `/queries` | Full dump of the query log |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "File must be an image" } }
//! ```
//!
//! Error codes: `bad_request` (4xx client input), `internal` (500). An
//! internal error carries the underlying error text.
//!
//! # CORS
//!
//! Origins come from `[server].allowed_origins`. `"*"` permits any origin
//! without credentials. An explicit origin list allows credentials and
//! mirrors the requested methods and headers.

use std::sync::Arc;

use agrisakha_core::advisory::AdvisoryService;
use agrisakha_core::analysis::{ImageAnalysis, ImageAnalyzer, PlaceholderAnalyzer};
use agrisakha_core::models::{AdvisoryRequest, AdvisoryResponse, QueryLogEntry};
use anyhow::{Context, Result};
use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::knowledge::build_service;
use crate::uploads::{is_image, UploadStore};

/// Paths advertised by `GET /`.
const ENDPOINTS: &[&str] = &["/advisory", "/upload-image", "/health", "/queries"];

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    service: AdvisoryService,
    uploads: Arc<UploadStore>,
    analyzer: Arc<dyn ImageAnalyzer>,
}

/// Starts the server with the placeholder image analyzer.
///
/// This is the entry point used by `agrisakha serve`.
pub async fn run_server(config: &Config) -> Result<()> {
    run_server_with_analyzer(config, Arc::new(PlaceholderAnalyzer)).await
}

/// Starts the server with a caller-supplied [`ImageAnalyzer`].
///
/// Binds to `[server].bind` and runs until Ctrl-C.
pub async fn run_server_with_analyzer(
    config: &Config,
    analyzer: Arc<dyn ImageAnalyzer>,
) -> Result<()> {
    let service = build_service(config)?;
    run_server_with_service(config, service, analyzer).await
}

/// Starts the server over an already-built [`AdvisoryService`].
///
/// The CI binary uses this so its analyzer shares the service's classifier
/// instead of loading the rules a second time.
pub async fn run_server_with_service(
    config: &Config,
    service: AdvisoryService,
    analyzer: Arc<dyn ImageAnalyzer>,
) -> Result<()> {
    let analyzer_name = analyzer.name().to_string();
    let app = router(config, service, analyzer)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!(
        bind = %config.server.bind,
        analyzer = %analyzer_name,
        query_log = %config.storage.query_log.display(),
        "AgriSakha API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Builds the application router without binding a socket.
pub fn router(
    config: &Config,
    service: AdvisoryService,
    analyzer: Arc<dyn ImageAnalyzer>,
) -> Result<Router> {
    let state = AppState {
        service,
        uploads: Arc::new(UploadStore::new(&config.storage.uploads_dir)),
        analyzer,
    };

    Ok(Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/advisory", post(handle_advisory))
        .route("/upload-image", post(handle_upload_image))
        .route("/queries", get(handle_queries))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(cors_layer(&config.server)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer> {
    if server.allows_any_origin() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }
    let origins = server
        .allowed_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", o))
        })
        .collect::<Result<Vec<_>>>()?;
    // Credentials cannot be combined with wildcards, so methods and headers
    // are mirrored from the preflight instead.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (`"bad_request"` or `"internal"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    client_error(StatusCode::BAD_REQUEST, message)
}

fn client_error(status: StatusCode, message: impl Into<String>) -> AppError {
    AppError {
        status,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        client_error(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        client_error(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        client_error(err.status(), err.body_text())
    }
}

// ============ GET / ============

#[derive(Serialize)]
struct RootResponse {
    message: String,
    version: String,
    endpoints: Vec<String>,
}

async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to AgriSakha API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    /// Always `"healthy"` when the server is running.
    status: String,
    /// Current server time, RFC 3339.
    timestamp: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Local::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /advisory ============

/// Classifies, optionally translates, logs, and answers the query.
///
/// Malformed JSON is a client error; any failure after that (including a
/// failed log write) is a 500.
async fn handle_advisory(
    State(state): State<AppState>,
    payload: Result<Json<AdvisoryRequest>, JsonRejection>,
) -> Result<Json<AdvisoryResponse>, AppError> {
    let Json(request) = payload?;
    let response = state
        .service
        .advise(&request)
        .await
        .map_err(|e| internal(format!("Error processing advisory: {:#}", e)))?;
    Ok(Json(response))
}

// ============ POST /upload-image ============

/// Accepts a multipart form with a `file` field holding an image.
///
/// The part's content type must start with `image/`; anything else is
/// rejected before a byte is written.
async fn handle_upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageAnalysis>, AppError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_image(&content_type) {
            return Err(bad_request("File must be an image"));
        }
        let original = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;

        let stored = state
            .uploads
            .save(original.as_deref(), &content_type, &bytes)
            .await
            .map_err(|e| internal(format!("Error uploading image: {:#}", e)))?;

        return Ok(Json(state.analyzer.analyze(&stored)));
    }

    Err(bad_request("Missing form field 'file'"))
}

// ============ GET /queries ============

#[derive(Serialize)]
struct QueriesResponse {
    queries: Vec<QueryLogEntry>,
    total: usize,
}

async fn handle_queries(State(state): State<AppState>) -> Json<QueriesResponse> {
    let queries = state.service.log().read_all().await;
    Json(QueriesResponse {
        total: queries.len(),
        queries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_any_origin() {
        assert!(cors_layer(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_cors_origin_list() {
        let server = ServerConfig {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://agrisakha.vercel.app".to_string(),
            ],
            ..ServerConfig::default()
        };
        assert!(cors_layer(&server).is_ok());
    }

    #[test]
    fn test_cors_invalid_origin_rejected() {
        let server = ServerConfig {
            allowed_origins: vec!["bad\norigin".to_string()],
            ..ServerConfig::default()
        };
        assert!(cors_layer(&server).is_err());
    }

    #[test]
    fn test_error_status_and_code() {
        let resp = bad_request("File must be an image").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = internal("boom").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

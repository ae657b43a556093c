//! # keyplan-api
//!
//! HTTP boundary for the keyplan schema advisor. Exposes the router used by
//! the `keyplan-api` server binary (and by in-process tests), the server
//! configuration, and the request loading and CQL script rendering used by
//! the `keyplan` command-line tool.

pub mod handlers;
pub mod input;
pub mod script;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use keyplan_core::{defaults, ModelerConfig};
use keyplan_modeler::Modeler;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

// =============================================================================
// STATE
// =============================================================================

/// Shared handler state. The modeler is immutable, so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    pub modeler: Arc<Modeler>,
}

impl AppState {
    pub fn new(config: ModelerConfig) -> Self {
        Self {
            modeler: Arc::new(Modeler::new(config)),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors returned to HTTP clients as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl From<keyplan_core::Error> for ApiError {
    fn from(err: keyplan_core::Error) -> Self {
        match err {
            keyplan_core::Error::Validation(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Listener and middleware settings for the HTTP server.
///
/// | Variable | Default |
/// |----------|---------|
/// | `HOST` | `0.0.0.0` |
/// | `PORT` | `3000` |
/// | `ALLOWED_ORIGINS` | `http://localhost:3000` |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<HeaderValue>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            allowed_origins: parse_allowed_origins(defaults::ALLOWED_ORIGINS),
            max_body_bytes: defaults::MAX_BODY_SIZE_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("HOST") {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => config.port = p,
                Err(e) => warn!(value = %port, error = %e, "Invalid PORT, using {}", defaults::SERVER_PORT),
            }
        }

        if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
            config.allowed_origins = parse_allowed_origins(&origins);
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a comma-separated CORS origin whitelist.
///
/// Blank input yields the default whitelist; unparsable entries are logged
/// and dropped.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    let raw = if raw.trim().is_empty() {
        defaults::ALLOWED_ORIGINS
    } else {
        raw
    };

    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// OPENAPI
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "keyplan",
        description = "Access-pattern-driven key design and DDL for wide-column tables"
    ),
    paths(handlers::health::health_check, handlers::modeler::generate_models),
    components(schemas(
        handlers::health::HealthResponse,
        keyplan_core::ModelingRequest,
        keyplan_core::EntityModelRequest,
        keyplan_core::FieldMetadata,
        keyplan_core::AccessPattern,
        keyplan_core::PatternField,
        keyplan_core::SortField,
        keyplan_core::ConstraintSettings,
        keyplan_core::Cardinality,
        keyplan_core::FilterType,
        keyplan_core::PartitionSizeExpectation,
        keyplan_core::QueryVolume,
        keyplan_core::ModelingResponse,
        keyplan_core::EntityModelResponse,
        keyplan_core::ClusteringKeyRecommendation,
        keyplan_core::ClusteringKeyType,
        keyplan_core::IndexRecommendation,
        keyplan_core::EntityError,
    )),
    tags(
        (name = "System", description = "Service health"),
        (name = "Modeler", description = "Key layout recommendations")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router with tracing, request IDs, CORS and the
/// body size limit applied.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/openapi.json", get(openapi_json))
        .route(
            "/api/modeler/generate",
            post(handlers::modeler::generate_models),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(Duration::from_secs(defaults::CORS_MAX_AGE_SECS)),
        )
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins() {
        let origins = parse_allowed_origins("https://a.example, ,http://localhost:8080");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0].to_str().unwrap(), "https://a.example");
        assert_eq!(origins[1].to_str().unwrap(), "http://localhost:8080");
    }

    #[test]
    fn test_blank_origins_fall_back_to_default() {
        let origins = parse_allowed_origins("   ");
        assert_eq!(origins.len(), 1);
        assert_eq!(origins[0].to_str().unwrap(), "http://localhost:3000");
    }

    #[test]
    fn test_invalid_origin_is_dropped() {
        let origins = parse_allowed_origins("https://ok.example,bad\norigin");
        assert_eq!(origins.len(), 1);
    }

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let err: ApiError = keyplan_core::Error::Validation("Entity name is required.".into()).into();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Entity name is required."));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err: ApiError = keyplan_core::Error::Config("broken".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
    }
}

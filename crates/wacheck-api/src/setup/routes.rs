//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use wacheck_core::Config;

const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api_routes = Router::new()
        // Session
        .route("/api/status", get(handlers::session::get_status))
        .route("/api/qr", get(handlers::session::get_qr))
        .route("/api/restart", post(handlers::session::restart))
        .route("/api/disconnect", post(handlers::session::disconnect))
        // Checks
        .route("/api/check-whatsapp", post(handlers::check::check_number))
        .route("/api/check-whatsapp-bulk", post(handlers::check::check_bulk))
        .route("/api/image-proxy", get(handlers::image_proxy::image_proxy))
        // Dashboard tools
        .route("/api/carrier", post(handlers::carrier::lookup_carrier))
        .route("/api/carrier-bulk", post(handlers::carrier::lookup_carrier_bulk))
        .route("/api/lists/parse", post(handlers::lists::parse_list_file))
        .route("/api/export", post(handlers::export::export_results))
        .route("/api/files/split", post(handlers::files::split_file))
        .route("/api/files/prefix", post(handlers::files::prefix_lines))
        // Operational
        .route("/health", get(handlers::health::health_check))
        .route("/live", get(handlers::health::liveness_check))
        .with_state(state);

    let http_concurrency_limit = config
        .server
        .http_concurrency_limit
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = api_routes
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.server.max_upload_size_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

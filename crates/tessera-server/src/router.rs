use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tessera_runtime::{LogLevelHandle, StorageClient};

use crate::error::{ServerError, ServerResult};
use crate::handler;

/// Shared state for admin handlers.
#[derive(Clone, Debug)]
pub struct AdminState {
    pub storage: StorageClient,
    pub log_level: LogLevelHandle,
}

/// CORS layer for `origin`, or `None` when `origin` is empty.
pub fn cors_layer(origin: &str) -> ServerResult<Option<CorsLayer>> {
    let origin = origin.trim();
    if origin.is_empty() {
        return Ok(None);
    }
    let allow = if origin == "*" {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(origin)
            .map_err(|_| ServerError::Config(format!("invalid CORS origin: {origin:?}")))?;
        AllowOrigin::exact(value)
    };
    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any),
    ))
}

/// Build the admin router.
pub fn build_router(state: AdminState, cors: Option<CorsLayer>) -> Router {
    let router = Router::new()
        .route("/admin", get(handler::health_handler))
        .route(
            "/v1/admin/loglevel",
            get(handler::get_log_level).post(handler::set_log_level),
        )
        .route("/v1/store", get(handler::list_indexes))
        .route("/v1/store/:index", get(handler::list_databases))
        .route("/v1/store/:index/:database", get(handler::list_entries))
        .fallback(handler::fallback_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

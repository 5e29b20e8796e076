use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use tessera_runtime::{Response as StorageResponse, RuntimeResult};

use crate::router::AdminState;

/// Envelope for every JSON reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub error: bool,
    pub message: String,
    pub result: Value,
}

impl ApiResponse {
    fn ok(result: Value) -> Response {
        Json(Self {
            error: false,
            message: String::new(),
            result,
        })
        .into_response()
    }

    fn fail(status: StatusCode, message: &str) -> Response {
        (
            status,
            Json(Self {
                error: true,
                message: message.to_string(),
                result: json!({}),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogLevelResponse {
    pub error: bool,
    pub message: String,
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetLogLevel {
    pub level: String,
}

/// GET /admin
pub async fn health_handler() -> &'static str {
    "GOOD"
}

/// GET /v1/admin/loglevel
pub async fn get_log_level(State(state): State<AdminState>) -> Json<LogLevelResponse> {
    Json(LogLevelResponse {
        error: false,
        message: String::new(),
        level: state.log_level.level().to_string(),
    })
}

/// POST /v1/admin/loglevel
pub async fn set_log_level(
    State(state): State<AdminState>,
    body: Result<Json<SetLogLevel>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return ApiResponse::fail(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };
    match state.log_level.set_level(&body.level) {
        Ok(level) => Json(LogLevelResponse {
            error: false,
            message: String::new(),
            level: level.to_string(),
        })
        .into_response(),
        Err(_) => ApiResponse::fail(StatusCode::NOT_FOUND, "unknown log level"),
    }
}

/// GET /v1/store
pub async fn list_indexes(State(state): State<AdminState>) -> Response {
    names_response(Ok(state.storage.fetch_indexes().await), "no indexes")
}

/// GET /v1/store/:index
pub async fn list_databases(
    State(state): State<AdminState>,
    Path(index): Path<String>,
) -> Response {
    names_response(state.storage.fetch_databases(&index).await, "unknown index")
}

/// GET /v1/store/:index/:database
pub async fn list_entries(
    State(state): State<AdminState>,
    Path((index, database)): Path<(String, String)>,
) -> Response {
    names_response(
        state.storage.fetch_entries(&index, &database).await,
        "unknown index or database",
    )
}

/// Any unrouted path.
pub async fn fallback_handler() -> Response {
    ApiResponse::fail(StatusCode::NOT_FOUND, "invalid request type")
}

fn names_response(response: RuntimeResult<StorageResponse>, missing: &str) -> Response {
    let response = match response {
        Ok(response) => response,
        Err(e) => return ApiResponse::fail(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    if response.failure {
        return ApiResponse::fail(StatusCode::SERVICE_UNAVAILABLE, "storage unavailable");
    }
    match response.into_names() {
        Some(names) => ApiResponse::ok(json!(names)),
        None => ApiResponse::fail(StatusCode::NOT_FOUND, missing),
    }
}

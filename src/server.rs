use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::logging::SharedLogger;
use crate::proxy::{self, ProxyOutcome};
use crate::translate::openai_types::{ChatRequest, ErrorBody};

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: ProxyConfig,
    /// Backend credential, resolved once at startup. `None` fails each chat
    /// request with a 500 instead of failing startup.
    pub api_key: Option<String>,
    pub client: reqwest::Client,
    pub logger: SharedLogger,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(handle_chat))
        .route("/api/chat", any(handle_chat))
        .route("/v1/chat/completions", any(handle_chat))
        .route("/health", get(handle_health))
        .route("/v1/models", get(handle_models))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::map_response(cors_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive CORS on every response, including errors and streams.
async fn cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

async fn handle_chat(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    let mut response = chat(state, method, body).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

async fn chat(state: Arc<AppState>, method: Method, body: Bytes) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(ErrorBody::method_not_allowed()),
        )
            .into_response();
    }

    let Some(api_key) = state.api_key.as_deref() else {
        state.logger.error(
            "server",
            format!("{} is not set; rejecting request", state.config.api_key_env()),
        );
        let err = ErrorBody::missing_api_key(&state.config.backend_label());
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response();
    };

    let req = match ChatRequest::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return internal_error(&state, e),
    };

    state.logger.info(
        "server",
        format!(
            "Request: model={} stream={}",
            req.model_label(),
            req.get("stream").map_or_else(|| "<default>".to_string(), ToString::to_string)
        ),
    );

    match proxy::forward(&req, &state.config, api_key, &state.client, &state.logger).await {
        Ok(ProxyOutcome::Buffered(completion)) => Json(completion).into_response(),
        Ok(ProxyOutcome::Stream(stream)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::CONNECTION, "keep-alive")
            .body(Body::from_stream(stream))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Ok(ProxyOutcome::Rejected { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let err = ErrorBody::backend_rejected(&state.config.backend_label(), body);
            (status, Json(err)).into_response()
        }
        Err(e) => internal_error(&state, e),
    }
}

fn internal_error(state: &AppState, err: ProxyError) -> Response {
    state.logger.error("server", format!("Error: {}", err));
    let body = ErrorBody::internal(err.to_string());
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.config.backend.name,
        "credential_configured": state.api_key.is_some(),
    }))
}

async fn handle_models(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let models: Vec<serde_json::Value> = state
        .config
        .models
        .aliases_sorted()
        .into_iter()
        .map(|name| {
            serde_json::json!({
                "id": name,
                "object": "model",
                "owned_by": state.config.backend.name,
            })
        })
        .collect();

    Json(serde_json::json!({ "data": models, "object": "list" }))
}

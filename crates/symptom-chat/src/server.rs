use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::timeout::TimeoutLayer;

use crate::handlers;
use crate::models::{GenerationSettings, ModelRegistry};
use crate::relay::CompletionRelay;
use crate::session::SessionStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: CompletionRelay,
    pub sessions: SessionStore,
    pub models: ModelRegistry,
    pub default_settings: GenerationSettings,
}

pub fn build_app(state: AppState, request_timeout_secs: u64) -> Router {
    let api_v1 = Router::new()
        .route("/models", get(handlers::v1::list_models))
        .route("/sessions", post(handlers::v1::create_session))
        .route(
            "/sessions/{session_id}",
            get(handlers::v1::get_session).delete(handlers::v1::delete_session),
        )
        .route(
            "/sessions/{session_id}/messages",
            post(handlers::v1::send_message),
        )
        .route(
            "/sessions/{session_id}/clear",
            post(handlers::v1::clear_session),
        )
        .route(
            "/sessions/{session_id}/settings",
            get(handlers::v1::get_settings).put(handlers::v1::update_settings),
        );

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .nest("/api/v1", api_v1)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_secs),
        ))
}

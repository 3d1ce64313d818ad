//! Session management HTTP handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::models::{GenerationParams, GenerationSettings, ModelConfig, ParamError};
use crate::response;
use crate::server::AppState;
use crate::session::{ChatSession, Conversation, Render, SessionHandle};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    model: Option<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    session_id: String,
    model: ModelConfig,
    params: GenerationParams,
    messages: Conversation,
    created_at: String,
    updated_at: String,
}

impl From<&ChatSession> for SessionResponse {
    fn from(session: &ChatSession) -> Self {
        Self {
            session_id: session.id.clone(),
            model: session.settings.model,
            params: session.settings.params,
            messages: session.conversation.clone(),
            created_at: session.created_at.to_rfc3339(),
            updated_at: session.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    content: String,
}

#[derive(Serialize)]
pub struct SendMessageResponse {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    turns: usize,
}

#[derive(Serialize)]
pub struct ClearSessionResponse {
    session_id: String,
    render: Render,
    messages: Conversation,
}

#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    top_p: Option<f32>,
    #[serde(default)]
    max_tokens: Option<i64>,
}

#[derive(Serialize)]
pub struct SettingsResponse {
    model: ModelConfig,
    params: GenerationParams,
}

impl From<GenerationSettings> for SettingsResponse {
    fn from(settings: GenerationSettings) -> Self {
        Self {
            model: settings.model,
            params: settings.params,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    let mut settings = state.default_settings;
    if let Some(label) = req.model {
        match state.models.resolve(&label) {
            Ok(model) => settings.model = model,
            Err(e) => return response::bad_request(e.to_string()).into_response(),
        }
    }

    let (_, handle) = state.sessions.create(settings);
    let session = handle.lock().await;

    (StatusCode::OK, Json(SessionResponse::from(&*session))).into_response()
}

/// GET /api/v1/sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let handle = match lookup(&state, &session_id) {
        Ok(handle) => handle,
        Err(resp) => return resp,
    };
    let session = handle.lock().await;

    (StatusCode::OK, Json(SessionResponse::from(&*session))).into_response()
}

/// DELETE /api/v1/sessions/{session_id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    if state.sessions.remove(&session_id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        response::not_found("Session not found").into_response()
    }
}

/// POST /api/v1/sessions/{session_id}/messages
///
/// Relay failures are not HTTP errors: the reply carries the fallback content
/// and an `error` notification, and the session stays usable.
///
/// The submission runs on its own task, so a request timeout or a client
/// disconnect does not cut it short: the exchange is still recorded.
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    if req.content.trim().is_empty() {
        return response::bad_request("Message content must not be empty").into_response();
    }

    let handle = match lookup(&state, &session_id) {
        Ok(handle) => handle,
        Err(resp) => return resp,
    };
    let relay = state.relay.clone();
    let task = tokio::spawn(async move {
        let mut session = handle.lock_owned().await;
        let reply = session.submit(&relay, req.content).await;
        (reply, session.conversation.len())
    });

    let (reply, turns) = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Submission task failed");
            return response::internal_error("Failed to submit message").into_response();
        }
    };

    let error = reply.notification();
    if let Some(ref notice) = error {
        warn!(session_id = %session_id, notice = %notice, "Replying with fallback");
    }

    let response = SendMessageResponse {
        role: "assistant",
        content: reply.content().to_string(),
        error,
        turns,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /api/v1/sessions/{session_id}/clear
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let handle = match lookup(&state, &session_id) {
        Ok(handle) => handle,
        Err(resp) => return resp,
    };
    let mut session = handle.lock().await;
    let render = session.clear();

    let response = ClearSessionResponse {
        session_id,
        render,
        messages: session.conversation.clone(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/v1/sessions/{session_id}/settings
pub async fn get_settings(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let handle = match lookup(&state, &session_id) {
        Ok(handle) => handle,
        Err(resp) => return resp,
    };
    let settings = handle.lock().await.settings;

    (StatusCode::OK, Json(SettingsResponse::from(settings))).into_response()
}

/// PUT /api/v1/sessions/{session_id}/settings
///
/// Numeric values are clamped into range. Nothing is applied if any field is
/// rejected.
pub async fn update_settings(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Response {
    let handle = match lookup(&state, &session_id) {
        Ok(handle) => handle,
        Err(resp) => return resp,
    };
    let mut session = handle.lock().await;

    let settings = match apply_settings(&state, session.settings, req) {
        Ok(settings) => settings,
        Err(e) => return response::bad_request(e.to_string()).into_response(),
    };
    session.settings = settings;

    (StatusCode::OK, Json(SettingsResponse::from(settings))).into_response()
}

// ============================================================================
// Helpers
// ============================================================================

fn lookup(state: &AppState, session_id: &str) -> Result<SessionHandle, Response> {
    state
        .sessions
        .get(session_id)
        .ok_or_else(|| response::not_found("Session not found").into_response())
}

fn apply_settings(
    state: &AppState,
    mut settings: GenerationSettings,
    req: UpdateSettingsRequest,
) -> Result<GenerationSettings, ParamError> {
    if let Some(label) = req.model {
        settings.model = state.models.resolve(&label)?;
    }
    if let Some(temperature) = req.temperature {
        settings.params.set_temperature(temperature)?;
    }
    if let Some(top_p) = req.top_p {
        settings.params.set_top_p(top_p)?;
    }
    if let Some(max_tokens) = req.max_tokens {
        settings.params.set_max_tokens(max_tokens);
    }
    Ok(settings)
}

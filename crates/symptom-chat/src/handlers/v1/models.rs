//! Model registry and parameter range handlers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::models::{MAX_TOKENS, ModelConfig, ParamRange, TEMPERATURE, TOP_P};
use crate::server::AppState;

#[derive(Serialize)]
pub struct ListModelsResponse {
    models: &'static [ModelConfig],
    default: &'static str,
    params: ParamRanges,
}

#[derive(Serialize)]
pub struct ParamRanges {
    temperature: ParamRange<f32>,
    top_p: ParamRange<f32>,
    max_tokens: ParamRange<u32>,
}

/// GET /api/v1/models
pub async fn list_models(State(state): State<AppState>) -> Json<ListModelsResponse> {
    Json(ListModelsResponse {
        models: state.models.all(),
        default: state.default_settings.model.label,
        params: ParamRanges {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_tokens: MAX_TOKENS,
        },
    })
}

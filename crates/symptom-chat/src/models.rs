//! Model registry and generation parameters.

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Models
// ============================================================================

/// A selectable model: display label and provider-specific identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelConfig {
    pub label: &'static str,
    pub provider_id: &'static str,
}

const BUILTIN_MODELS: [ModelConfig; 4] = [
    ModelConfig {
        label: "Meta-Llama",
        provider_id: "meta-llama/Meta-Llama-3.1-8B-Instruct",
    },
    ModelConfig {
        label: "Google-Gemma",
        provider_id: "google/gemma-2-9b-it",
    },
    ModelConfig {
        label: "Mistral",
        provider_id: "mistralai/Mistral-7B-Instruct-v0.2",
    },
    ModelConfig {
        label: "Microsoft-Phi",
        provider_id: "microsoft/Phi-3-mini-4k-instruct",
    },
];

/// Fixed set of models offered to the user. The first entry is the default.
#[derive(Debug, Clone, Copy)]
pub struct ModelRegistry {
    models: &'static [ModelConfig],
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self {
            models: &BUILTIN_MODELS,
        }
    }
}

impl ModelRegistry {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &'static [ModelConfig] {
        self.models
    }

    pub fn default_model(&self) -> ModelConfig {
        self.models[0]
    }

    /// Look up a model by label, ignoring ASCII case.
    pub fn get(&self, label: &str) -> Option<ModelConfig> {
        self.models
            .iter()
            .find(|m| m.label.eq_ignore_ascii_case(label.trim()))
            .copied()
    }

    pub fn resolve(&self, label: &str) -> Result<ModelConfig, ParamError> {
        self.get(label)
            .ok_or_else(|| ParamError::UnknownModel(label.to_string()))
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.label).collect()
    }
}

// ============================================================================
// Generation parameters
// ============================================================================

/// Closed range, default and step of a numeric control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamRange<T> {
    pub min: T,
    pub max: T,
    pub default: T,
    pub step: T,
}

pub const TEMPERATURE: ParamRange<f32> = ParamRange {
    min: 0.01,
    max: 2.0,
    default: 0.7,
    step: 0.01,
};

pub const TOP_P: ParamRange<f32> = ParamRange {
    min: 0.01,
    max: 1.0,
    default: 0.9,
    step: 0.01,
};

pub const MAX_TOKENS: ParamRange<u32> = ParamRange {
    min: 64,
    max: 148,
    default: 120,
    step: 8,
};

/// Sampling controls sent with every completion request.
///
/// Values are always inside their [`ParamRange`]; setters clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE.default,
            top_p: TOP_P.default,
            max_tokens: MAX_TOKENS.default,
        }
    }
}

impl GenerationParams {
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Set the temperature, clamped into range. Returns the stored value.
    pub fn set_temperature(&mut self, value: f32) -> Result<f32, ParamError> {
        self.temperature = clamp_float("temperature", value, TEMPERATURE)?;
        Ok(self.temperature)
    }

    /// Set top-p, clamped into range. Returns the stored value.
    pub fn set_top_p(&mut self, value: f32) -> Result<f32, ParamError> {
        self.top_p = clamp_float("top_p", value, TOP_P)?;
        Ok(self.top_p)
    }

    /// Set max tokens, clamped into range. Returns the stored value.
    pub fn set_max_tokens(&mut self, value: i64) -> u32 {
        let clamped = value.clamp(i64::from(MAX_TOKENS.min), i64::from(MAX_TOKENS.max));
        // In range of u32 after the clamp above.
        self.max_tokens = clamped as u32;
        self.max_tokens
    }
}

fn clamp_float(
    name: &'static str,
    value: f32,
    range: ParamRange<f32>,
) -> Result<f32, ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotFinite(name));
    }
    Ok(value.clamp(range.min, range.max))
}

/// Model selection plus sampling controls for one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationSettings {
    pub model: ModelConfig,
    pub params: GenerationParams,
}

impl GenerationSettings {
    pub fn new(model: ModelConfig) -> Self {
        Self {
            model,
            params: GenerationParams::default(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::new(ModelRegistry::builtin().default_model())
    }
}

// ============================================================================
// ParamError
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("unknown model '{0}'")]
    UnknownModel(String),
}

// ============================================================================
// Tests
// ============================================================================

//! LLM configurations
//!
//! All types belong to the [`LLM_CONFIG`] family. Credentials are
//! sensitive: they are never written to documents and are absent after a
//! round-trip.

use agentspec_core::{
    validating_factory, Component, ComponentBuilder, ComponentError, ComponentShape,
    FieldDescriptor, FieldKind, FieldValue, ModelObject, ObjectShape, TypeRegistry,
};

/// Family of every LLM configuration
pub const LLM_CONFIG: &str = "LlmConfig";
/// Any OpenAI-compatible endpoint
pub const OPENAI_COMPATIBLE_CONFIG: &str = "OpenAiCompatibleConfig";
/// OpenAI hosted models
pub const OPENAI_CONFIG: &str = "OpenAiConfig";
/// vLLM server
pub const VLLM_CONFIG: &str = "VllmConfig";
/// Ollama server
pub const OLLAMA_CONFIG: &str = "OllamaConfig";

/// Default sampling parameters of an LLM configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenerationParameters {
    /// Maximum number of generated tokens
    pub max_tokens: Option<i64>,
    /// Sampling temperature
    pub temperature: Option<f64>,
    /// Nucleus sampling mass
    pub top_p: Option<f64>,
}

impl GenerationParameters {
    /// Read parameters back from a field value
    #[must_use]
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            max_tokens: object.get("max_tokens").and_then(FieldValue::as_i64),
            temperature: object.get("temperature").and_then(FieldValue::as_f64),
            top_p: object.get("top_p").and_then(FieldValue::as_f64),
        })
    }
}

// Unset parameters are left out, matching what a document round-trip yields.
impl From<GenerationParameters> for FieldValue {
    fn from(params: GenerationParameters) -> Self {
        let mut object = ModelObject::new();
        if let Some(max_tokens) = params.max_tokens {
            object.insert("max_tokens", max_tokens);
        }
        if let Some(temperature) = params.temperature {
            object.insert("temperature", temperature);
        }
        if let Some(top_p) = params.top_p {
            object.insert("top_p", top_p);
        }
        FieldValue::Object(object)
    }
}

fn generation_parameters() -> FieldDescriptor {
    FieldDescriptor::new(
        "default_generation_parameters",
        FieldKind::optional(FieldKind::Object(
            ObjectShape::new()
                .with_field("max_tokens", FieldKind::optional(FieldKind::Integer))
                .with_field("temperature", FieldKind::optional(FieldKind::Float))
                .with_field("top_p", FieldKind::optional(FieldKind::Float)),
        )),
    )
}

fn api_key() -> FieldDescriptor {
    FieldDescriptor::new("api_key", FieldKind::optional(FieldKind::String)).sensitive()
}

pub(crate) fn register(registry: &mut TypeRegistry) -> Result<(), ComponentError> {
    registry.register(
        OPENAI_COMPATIBLE_CONFIG,
        ComponentShape::new()
            .in_family(LLM_CONFIG)
            .with_field(FieldDescriptor::new("url", FieldKind::String))
            .with_field(FieldDescriptor::new("model_id", FieldKind::String))
            .with_field(api_key())
            .with_field(generation_parameters()),
        validating_factory,
    )?;
    registry.register(
        OPENAI_CONFIG,
        ComponentShape::new()
            .in_family(LLM_CONFIG)
            .with_field(FieldDescriptor::new("model_id", FieldKind::String))
            .with_field(api_key())
            .with_field(generation_parameters()),
        validating_factory,
    )?;
    for server in [VLLM_CONFIG, OLLAMA_CONFIG] {
        registry.register(
            server,
            ComponentShape::new()
                .in_family(LLM_CONFIG)
                .with_field(FieldDescriptor::new("url", FieldKind::String))
                .with_field(FieldDescriptor::new("model_id", FieldKind::String))
                .with_field(generation_parameters()),
            validating_factory,
        )?;
    }
    Ok(())
}

/// Builder for an OpenAI-compatible endpoint
#[must_use]
pub fn openai_compatible_config(
    name: impl Into<String>,
    url: impl Into<String>,
    model_id: impl Into<String>,
) -> ComponentBuilder {
    Component::builder(OPENAI_COMPATIBLE_CONFIG, name)
        .field("url", FieldValue::String(url.into()))
        .field("model_id", FieldValue::String(model_id.into()))
}

/// Builder for an OpenAI hosted model
#[must_use]
pub fn openai_config(name: impl Into<String>, model_id: impl Into<String>) -> ComponentBuilder {
    Component::builder(OPENAI_CONFIG, name).field("model_id", FieldValue::String(model_id.into()))
}

/// Builder for a vLLM server
#[must_use]
pub fn vllm_config(
    name: impl Into<String>,
    url: impl Into<String>,
    model_id: impl Into<String>,
) -> ComponentBuilder {
    Component::builder(VLLM_CONFIG, name)
        .field("url", FieldValue::String(url.into()))
        .field("model_id", FieldValue::String(model_id.into()))
}

/// Builder for an Ollama server
#[must_use]
pub fn ollama_config(
    name: impl Into<String>,
    url: impl Into<String>,
    model_id: impl Into<String>,
) -> ComponentBuilder {
    Component::builder(OLLAMA_CONFIG, name)
        .field("url", FieldValue::String(url.into()))
        .field("model_id", FieldValue::String(model_id.into()))
}

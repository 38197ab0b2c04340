//! Error types for the serialization layer
//!
//! Provides error handling for:
//! - Configuration (plugin collisions, invalid per-call options)
//! - Serialization (component graph → document)
//! - Deserialization (document → component graph)

use agentspec_core::{AgentSpecVersion, ComponentError, ValidationError};

/// Misconfiguration detected before any data flows
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Two plugins claim the same component type
    #[error("component type '{component_type}' is claimed by both '{first}' and '{second}'")]
    PluginCollision {
        /// Contested type
        component_type: String,
        /// Plugin registered first
        first: String,
        /// Plugin registered later
        second: String,
    },

    /// Option value rejected
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl ConfigurationError {
    /// Create plugin collision error
    pub fn collision(
        component_type: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::PluginCollision {
            component_type: component_type.into(),
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Errors while writing a component graph
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// Invalid serializer configuration or options
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The root component was listed for disaggregation
    #[error("cannot disaggregate the root component '{0}'")]
    RootDisaggregation(String),

    /// No plugin handles the component type
    #[error("no plugin supports component type '{0}'")]
    UnsupportedComponentType(String),

    /// Component type is newer than the target version
    #[error("component type '{component_type}' requires version {min_version}, target is {target}")]
    UnsupportedVersion {
        /// Offending type
        component_type: String,
        /// First version that knows the type
        min_version: AgentSpecVersion,
        /// Requested target
        target: AgentSpecVersion,
    },

    /// Two different components requested the same reference id
    #[error("reference id '{0}' is used by more than one disaggregated component")]
    DuplicateDisaggregatedId(String),

    /// Value cannot be represented in a document
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// JSON encoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding failed
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors while reading a document
#[derive(Debug, thiserror::Error)]
pub enum DeserializationError {
    /// Invalid deserializer configuration
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Discriminator names no registered type
    #[error("unknown component type: '{0}'")]
    UnknownComponentType(String),

    /// Reference id not found in any table
    #[error("dangling reference: '{0}'")]
    DanglingReference(String),

    /// Declared version is not recognized
    #[error("unrecognized document version: '{0}'")]
    VersionMismatch(String),

    /// Reference chain loops back on itself
    #[error("cyclic reference: {}", .0.join(" -> "))]
    CyclicReference(Vec<String>),

    /// Document structure is not a component graph
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Field value does not conform to its shape
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// JSON decoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding failed
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DeserializationError {
    /// Create malformed document error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }
}

impl From<ComponentError> for DeserializationError {
    fn from(err: ComponentError) -> Self {
        match err {
            ComponentError::UnknownComponentType(t) => Self::UnknownComponentType(t),
            ComponentError::Validation(v) => Self::Validation(v),
            other => Self::MalformedDocument(other.to_string()),
        }
    }
}

/// Result type alias for serialization
pub type SerializationResult<T> = Result<T, SerializationError>;

/// Result type alias for deserialization
pub type DeserializationResult<T> = Result<T, DeserializationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_display_names_both_plugins() {
        let err = ConfigurationError::collision("Agent", "first", "second");
        assert_eq!(
            err.to_string(),
            "component type 'Agent' is claimed by both 'first' and 'second'"
        );
    }

    #[test]
    fn cyclic_reference_display() {
        let err = DeserializationError::CyclicReference(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "cyclic reference: a -> b -> a");
    }

    #[test]
    fn component_error_conversion() {
        let err: DeserializationError = ComponentError::UnknownComponentType("X".into()).into();
        assert!(matches!(err, DeserializationError::UnknownComponentType(t) if t == "X"));

        let err: DeserializationError =
            ComponentError::Validation(ValidationError::new("c", "f", "bad")).into();
        assert!(matches!(err, DeserializationError::Validation(v) if v.field.as_deref() == Some("f")));
    }
}

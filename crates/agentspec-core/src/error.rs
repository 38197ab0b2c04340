//! Error types for the component model
//!
//! Provides error handling for:
//! - Type registration (configuration errors, raised at startup)
//! - Component construction (validation errors naming the component and field)

/// A field value does not conform to its declared shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid component '{component_id}'{}: {reason}", field_suffix(.field))]
pub struct ValidationError {
    /// Id of the offending component
    pub component_id: String,
    /// Offending field, if the problem is field-specific
    pub field: Option<String>,
    /// What is wrong
    pub reason: String,
}

fn field_suffix(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|f| format!(", field '{f}'"))
        .unwrap_or_default()
}

impl ValidationError {
    /// Create field-specific validation error
    pub fn new(
        component_id: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    /// Create validation error about the component as a whole
    pub fn component(component_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            field: None,
            reason: reason.into(),
        }
    }
}

/// Errors from the type registry and component construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    /// Type registered twice
    #[error("component type '{0}' is already registered")]
    DuplicateRegistration(String),

    /// Type not registered
    #[error("unknown component type: '{0}'")]
    UnknownComponentType(String),

    /// Field declared with a name every component already carries
    #[error("field '{field}' of '{component_type}' uses a reserved name")]
    ReservedFieldName {
        /// Declaring type
        component_type: String,
        /// Offending field
        field: String,
    },

    /// Field name does not survive a camelCase round-trip
    #[error("field '{field}' of '{component_type}' cannot be converted to camelCase and back")]
    IrreversibleFieldName {
        /// Declaring type
        component_type: String,
        /// Offending field
        field: String,
    },

    /// Sensitive field without a default cannot be loaded from a document
    #[error("sensitive field '{field}' of '{component_type}' must be optional or have a default")]
    SensitiveFieldRequired {
        /// Declaring type
        component_type: String,
        /// Offending field
        field: String,
    },

    /// Field validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ComponentError {
    /// Check if error is a configuration problem (raised at registration)
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRegistration(_)
                | Self::ReservedFieldName { .. }
                | Self::IrreversibleFieldName { .. }
                | Self::SensitiveFieldRequired { .. }
        )
    }
}

/// Result type alias for component operations
pub type ComponentResult<T> = Result<T, ComponentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::new("agent-1", "llm_config", "missing required field");
        assert_eq!(
            err.to_string(),
            "invalid component 'agent-1', field 'llm_config': missing required field"
        );

        let err = ValidationError::component("agent-1", "bad");
        assert_eq!(err.to_string(), "invalid component 'agent-1': bad");
    }

    #[test]
    fn component_error_classification() {
        assert!(ComponentError::DuplicateRegistration("A".into()).is_configuration());
        assert!(!ComponentError::UnknownComponentType("A".into()).is_configuration());

        let err: ComponentError = ValidationError::component("x", "y").into();
        assert!(matches!(err, ComponentError::Validation(_)));
    }
}

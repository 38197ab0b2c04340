//! Component type registry
//!
//! Maps a component-type discriminator to its [`ComponentShape`] and the
//! [`ComponentFactory`] that builds instances. Populated once by the
//! schema-definition layer, then only read.

use crate::casing::is_reversible;
use crate::component::{Component, ComponentBuilder};
use crate::error::ComponentError;
use crate::shape::ComponentShape;
use indexmap::IndexMap;

/// Field names every component carries outside its field table
pub const RESERVED_FIELD_NAMES: &[&str] = &["id", "name", "description", "metadata", "component_type"];

/// Constructor for a registered component type
///
/// Factories may derive fields from others before delegating to
/// [`ComponentBuilder::finish`] for shape validation.
pub type ComponentFactory = fn(ComponentBuilder, &TypeRegistry) -> Result<Component, ComponentError>;

/// Factory that only validates against the registered shape
///
/// # Errors
/// Returns error for unknown, missing or ill-typed fields
pub fn validating_factory(
    builder: ComponentBuilder,
    registry: &TypeRegistry,
) -> Result<Component, ComponentError> {
    builder.finish(registry)
}

/// Registered component type
#[derive(Clone)]
pub struct RegisteredType {
    name: String,
    shape: ComponentShape,
    factory: ComponentFactory,
}

impl std::fmt::Debug for RegisteredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredType")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl RegisteredType {
    /// Type discriminator
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field table
    #[inline]
    #[must_use]
    pub fn shape(&self) -> &ComponentShape {
        &self.shape
    }

    /// Constructor
    #[inline]
    #[must_use]
    pub fn factory(&self) -> ComponentFactory {
        self.factory
    }
}

/// Registry of component types
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, RegisteredType>,
}

impl TypeRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type
    ///
    /// # Errors
    /// - [`ComponentError::DuplicateRegistration`] if the type already exists
    /// - [`ComponentError::ReservedFieldName`] if a field shadows a common field
    /// - [`ComponentError::IrreversibleFieldName`] if a field name does not
    ///   survive a camelCase round-trip
    /// - [`ComponentError::SensitiveFieldRequired`] if a sensitive field has
    ///   no fallback value, which would make documents unloadable
    pub fn register(
        &mut self,
        component_type: impl Into<String>,
        shape: ComponentShape,
        factory: ComponentFactory,
    ) -> Result<(), ComponentError> {
        let component_type = component_type.into();
        if self.types.contains_key(&component_type) {
            return Err(ComponentError::DuplicateRegistration(component_type));
        }

        for descriptor in shape.fields() {
            let field = descriptor.name();
            if RESERVED_FIELD_NAMES.contains(&field) || field.starts_with('$') {
                return Err(ComponentError::ReservedFieldName {
                    component_type,
                    field: field.to_string(),
                });
            }
            if !is_reversible(field) {
                return Err(ComponentError::IrreversibleFieldName {
                    component_type,
                    field: field.to_string(),
                });
            }
            if descriptor.is_sensitive() && descriptor.default_value().is_none() {
                return Err(ComponentError::SensitiveFieldRequired {
                    component_type,
                    field: field.to_string(),
                });
            }
        }

        self.types.insert(
            component_type.clone(),
            RegisteredType {
                name: component_type,
                shape,
                factory,
            },
        );
        Ok(())
    }

    /// Look up a type
    #[inline]
    #[must_use]
    pub fn lookup(&self, component_type: &str) -> Option<&RegisteredType> {
        self.types.get(component_type)
    }

    /// Check if a type is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, component_type: &str) -> bool {
        self.types.contains_key(component_type)
    }

    /// Check if `component_type` is `family` or declares it
    #[must_use]
    pub fn is_instance_of(&self, component_type: &str, family: &str) -> bool {
        component_type == family
            || self
                .lookup(component_type)
                .is_some_and(|t| t.shape.families().iter().any(|f| f == family))
    }

    /// Registered type names in registration order
    #[inline]
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Iterate over registered types
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredType> {
        self.types.values()
    }

    /// Number of registered types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{FieldDescriptor, FieldKind};

    #[test]
    fn register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry
            .register("Agent", ComponentShape::new().in_family("Agentic"), validating_factory)
            .unwrap();

        assert!(registry.contains("Agent"));
        assert!(registry.lookup("Flow").is_none());
        assert!(registry.is_instance_of("Agent", "Agentic"));
        assert!(registry.is_instance_of("Agent", "Agent"));
        assert!(!registry.is_instance_of("Agent", "Tool"));
        assert_eq!(registry.type_names().collect::<Vec<_>>(), vec!["Agent"]);
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = TypeRegistry::new();
        registry
            .register("Agent", ComponentShape::new(), validating_factory)
            .unwrap();
        let err = registry
            .register("Agent", ComponentShape::new(), validating_factory)
            .unwrap_err();
        assert!(matches!(err, ComponentError::DuplicateRegistration(t) if t == "Agent"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reserved_and_irreversible_names_fail() {
        let mut registry = TypeRegistry::new();
        let reserved = ComponentShape::new().with_field(FieldDescriptor::new("name", FieldKind::String));
        assert!(matches!(
            registry.register("A", reserved, validating_factory),
            Err(ComponentError::ReservedFieldName { .. })
        ));

        let irreversible =
            ComponentShape::new().with_field(FieldDescriptor::new("max_tokens_2", FieldKind::Integer));
        assert!(matches!(
            registry.register("B", irreversible, validating_factory),
            Err(ComponentError::IrreversibleFieldName { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn required_sensitive_field_fails() {
        let mut registry = TypeRegistry::new();
        let shape = ComponentShape::new()
            .with_field(FieldDescriptor::new("api_key", FieldKind::String).sensitive());
        assert!(matches!(
            registry.register("Llm", shape, validating_factory),
            Err(ComponentError::SensitiveFieldRequired { .. })
        ));

        let optional = ComponentShape::new().with_field(
            FieldDescriptor::new("api_key", FieldKind::optional(FieldKind::String)).sensitive(),
        );
        assert!(registry.register("Llm", optional, validating_factory).is_ok());
    }
}

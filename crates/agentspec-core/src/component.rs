//! Immutable component records
//!
//! A [`Component`] is a typed, identified node of an Agent Spec graph. It is
//! created once through a [`ComponentBuilder`] (which runs the factory
//! registered for its type) and never mutated afterwards. Graphs share
//! sub-components through [`ComponentRef`].

use crate::error::ComponentError;
use crate::registry::TypeRegistry;
use crate::value::FieldValue;
use indexmap::IndexMap;
use std::sync::Arc;

/// Shared handle to an immutable component
pub type ComponentRef = Arc<Component>;

/// Immutable, typed configuration node
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    id: String,
    name: String,
    component_type: String,
    description: Option<String>,
    metadata: IndexMap<String, FieldValue>,
    fields: IndexMap<String, FieldValue>,
}

impl Component {
    /// Start building a component of the given type
    #[inline]
    #[must_use]
    pub fn builder(component_type: impl Into<String>, name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder::new(component_type, name)
    }

    /// Stable unique identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type discriminator
    #[inline]
    #[must_use]
    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    /// Optional description
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Opaque metadata
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &IndexMap<String, FieldValue> {
        &self.metadata
    }

    /// Type-specific field value
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// All type-specific fields in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &IndexMap<String, FieldValue> {
        &self.fields
    }

    /// Visit components directly referenced by this one
    pub fn for_each_child<'a>(&'a self, mut visit: impl FnMut(&'a ComponentRef)) {
        for value in self.fields.values().chain(self.metadata.values()) {
            value.for_each_component(&mut visit);
        }
    }
}

/// Builder for [`Component`]
///
/// Fields are validated against the registered shape when the component is
/// built, so a builder may hold incomplete or ill-typed data.
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    id: Option<String>,
    name: String,
    component_type: String,
    description: Option<String>,
    metadata: IndexMap<String, FieldValue>,
    fields: IndexMap<String, FieldValue>,
}

impl ComponentBuilder {
    /// Create builder
    #[must_use]
    pub fn new(component_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            component_type: component_type.into(),
            description: None,
            metadata: IndexMap::new(),
            fields: IndexMap::new(),
        }
    }

    /// Set explicit id
    #[inline]
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set description
    #[inline]
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add metadata entry
    #[inline]
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set a type-specific field
    #[inline]
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set a type-specific field in place
    #[inline]
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Explicit id, if any
    #[inline]
    #[must_use]
    pub fn id_ref(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Component type being built
    #[inline]
    #[must_use]
    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    /// Field value set so far
    #[inline]
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check whether a field was set
    #[inline]
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Build through the factory registered for this type
    ///
    /// # Errors
    /// Returns error if the type is not registered or the factory rejects the fields
    pub fn build(self, registry: &TypeRegistry) -> Result<ComponentRef, ComponentError> {
        let entry = registry
            .lookup(&self.component_type)
            .ok_or_else(|| ComponentError::UnknownComponentType(self.component_type.clone()))?;
        let factory = entry.factory();
        factory(self, registry).map(Arc::new)
    }

    /// Validate against the registered shape and freeze
    ///
    /// This is the default factory behavior. Missing fields take their
    /// declared default, then `null` for optional fields.
    ///
    /// # Errors
    /// Returns error for unknown, missing or ill-typed fields
    pub fn finish(self, registry: &TypeRegistry) -> Result<Component, ComponentError> {
        let entry = registry
            .lookup(&self.component_type)
            .ok_or_else(|| ComponentError::UnknownComponentType(self.component_type.clone()))?;
        let shape = entry.shape();

        let id = self
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        for name in self.fields.keys() {
            if shape.field(name).is_none() {
                return Err(ComponentError::Validation(crate::ValidationError::new(
                    &id,
                    name,
                    format!("unknown field for component type '{}'", self.component_type),
                )));
            }
        }

        let mut provided = self.fields;
        let mut fields = IndexMap::with_capacity(shape.fields().len());
        for descriptor in shape.fields() {
            let value = match provided.swap_remove(descriptor.name()) {
                Some(value) => value,
                None => descriptor.default_value().ok_or_else(|| {
                    crate::ValidationError::new(&id, descriptor.name(), "missing required field")
                })?,
            };
            descriptor
                .kind()
                .check(&value, registry)
                .map_err(|reason| crate::ValidationError::new(&id, descriptor.name(), reason))?;
            fields.insert(
                descriptor.name().to_string(),
                value.without_null_object_entries(),
            );
        }

        for (key, value) in &self.metadata {
            if value.contains_object() {
                return Err(ComponentError::Validation(crate::ValidationError::new(
                    &id,
                    "metadata",
                    format!("entry '{key}' holds a model object"),
                )));
            }
        }

        Ok(Component {
            id,
            name: self.name,
            component_type: self.component_type,
            description: self.description,
            metadata: self.metadata,
            fields,
        })
    }
}

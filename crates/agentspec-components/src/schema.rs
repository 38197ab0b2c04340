//! Builtin schema
//!
//! [`builtin_schema`] is built once and shared. Applications with their own
//! component types start from [`schema_builder`], which already holds every
//! builtin type.

use crate::{agent, flow, llm, swarm, tool};
use agentspec_core::{
    AgentSpecSchema, ComponentError, ComponentFactory, ComponentShape, TypeRegistry, VersionSet,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

static BUILTIN_SCHEMA: Lazy<Result<Arc<AgentSpecSchema>, ComponentError>> =
    Lazy::new(|| Ok(schema_builder()?.build()));

/// Registry holding every builtin component type
///
/// # Errors
/// Only fails if the builtin tables are inconsistent
pub fn builtin_registry() -> Result<TypeRegistry, ComponentError> {
    let mut registry = TypeRegistry::new();
    llm::register(&mut registry)?;
    tool::register(&mut registry)?;
    agent::register(&mut registry)?;
    flow::register(&mut registry)?;
    swarm::register(&mut registry)?;
    Ok(registry)
}

/// Shared schema of the builtin component types
///
/// # Errors
/// Only fails if the builtin tables are inconsistent
pub fn builtin_schema() -> Result<Arc<AgentSpecSchema>, ComponentError> {
    BUILTIN_SCHEMA.clone()
}

/// Start a schema from the builtin types
///
/// # Errors
/// Only fails if the builtin tables are inconsistent
pub fn schema_builder() -> Result<SchemaBuilder, ComponentError> {
    SchemaBuilder::new()
}

/// Builder for a schema extending the builtin types
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    registry: TypeRegistry,
    versions: VersionSet,
}

impl SchemaBuilder {
    /// Create builder holding the builtin types
    ///
    /// # Errors
    /// Only fails if the builtin tables are inconsistent
    pub fn new() -> Result<Self, ComponentError> {
        Ok(Self {
            registry: builtin_registry()?,
            versions: VersionSet::default(),
        })
    }

    /// Register an additional component type
    ///
    /// # Errors
    /// Same as [`TypeRegistry::register`]
    pub fn register(
        mut self,
        component_type: impl Into<String>,
        shape: ComponentShape,
        factory: ComponentFactory,
    ) -> Result<Self, ComponentError> {
        self.registry.register(component_type, shape, factory)?;
        Ok(self)
    }

    /// Replace the recognized version set
    #[inline]
    #[must_use]
    pub fn with_versions(mut self, versions: VersionSet) -> Self {
        self.versions = versions;
        self
    }

    /// Registry built so far
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Freeze into a shareable schema
    #[must_use]
    pub fn build(self) -> Arc<AgentSpecSchema> {
        Arc::new(AgentSpecSchema::with_versions(self.registry, self.versions))
    }
}

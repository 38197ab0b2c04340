//! Immutable schema configuration
//!
//! [`AgentSpecSchema`] bundles the type registry, the field catalog derived
//! from it, and the recognized version set. It is built once and shared
//! through `Arc` by every serializer and deserializer that uses it, so
//! several schemas can coexist in one process.

use crate::catalog::FieldCatalog;
use crate::registry::TypeRegistry;
use crate::version::{AgentSpecVersion, VersionSet};

/// Type registry, field catalog and versions used by one codec
#[derive(Debug, Clone)]
pub struct AgentSpecSchema {
    registry: TypeRegistry,
    catalog: FieldCatalog,
    versions: VersionSet,
}

impl AgentSpecSchema {
    /// Create schema with the default version set
    #[must_use]
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_versions(registry, VersionSet::default())
    }

    /// Create schema with an explicit version set
    #[must_use]
    pub fn with_versions(registry: TypeRegistry, versions: VersionSet) -> Self {
        let catalog = FieldCatalog::from_registry(&registry);
        Self {
            registry,
            catalog,
            versions,
        }
    }

    /// Replace the derived catalog
    #[inline]
    #[must_use]
    pub fn with_catalog(mut self, catalog: FieldCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Type registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Field catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Recognized versions
    #[inline]
    #[must_use]
    pub fn versions(&self) -> &VersionSet {
        &self.versions
    }

    /// Latest recognized version
    #[inline]
    #[must_use]
    pub fn latest_version(&self) -> AgentSpecVersion {
        self.versions.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::validating_factory;
    use crate::shape::{ComponentShape, FieldDescriptor, FieldKind};

    #[test]
    fn catalog_is_derived_from_registry() {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                "Secret",
                ComponentShape::new().with_field(
                    FieldDescriptor::new("token", FieldKind::optional(FieldKind::String)).sensitive(),
                ),
                validating_factory,
            )
            .unwrap();

        let schema = AgentSpecSchema::new(registry);
        assert!(schema.catalog().is_field_sensitive("Secret", "token"));
        assert_eq!(schema.latest_version(), AgentSpecVersion::LATEST);
    }

    #[test]
    fn custom_version_set() {
        let versions = VersionSet::new([AgentSpecVersion::new(1, 0, 0)], []);
        let schema = AgentSpecSchema::with_versions(TypeRegistry::new(), versions);
        assert_eq!(schema.latest_version(), AgentSpecVersion::new(1, 0, 0));
        assert!(!schema.versions().is_recognized(AgentSpecVersion::LATEST));
    }
}

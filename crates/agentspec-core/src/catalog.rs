//! Sensitivity and version catalog
//!
//! Read-only table of `(component type, field) → FieldPolicy`. Sensitive
//! fields are omitted from documents at every version; version-gated fields
//! are omitted when the target version predates them.

use crate::registry::TypeRegistry;
use crate::version::AgentSpecVersion;
use std::collections::HashMap;

/// Output policy of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldPolicy {
    /// Never written to documents
    pub sensitive: bool,
    /// First version that knows the field
    pub min_version: Option<AgentSpecVersion>,
}

/// Catalog of field policies
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    policies: HashMap<String, HashMap<String, FieldPolicy>>,
}

impl FieldCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build catalog from the field tables of a registry
    ///
    /// Only fields that are sensitive or gated get an entry.
    #[must_use]
    pub fn from_registry(registry: &TypeRegistry) -> Self {
        let mut catalog = Self::new();
        for registered in registry.iter() {
            for descriptor in registered.shape().fields() {
                if descriptor.is_sensitive() || descriptor.min_version().is_some() {
                    catalog.insert(
                        registered.name(),
                        descriptor.name(),
                        FieldPolicy {
                            sensitive: descriptor.is_sensitive(),
                            min_version: descriptor.min_version(),
                        },
                    );
                }
            }
        }
        catalog
    }

    /// Insert or replace a policy
    pub fn insert(&mut self, component_type: &str, field: &str, policy: FieldPolicy) {
        self.policies
            .entry(component_type.to_string())
            .or_default()
            .insert(field.to_string(), policy);
    }

    /// Policy of a field (default policy when not listed)
    #[must_use]
    pub fn policy(&self, component_type: &str, field: &str) -> FieldPolicy {
        self.policies
            .get(component_type)
            .and_then(|fields| fields.get(field))
            .copied()
            .unwrap_or_default()
    }

    /// Check if a field must never be written
    #[inline]
    #[must_use]
    pub fn is_field_sensitive(&self, component_type: &str, field: &str) -> bool {
        self.policy(component_type, field).sensitive
    }

    /// Check if a field must be hidden when writing `target`
    #[inline]
    #[must_use]
    pub fn is_field_version_gated(
        &self,
        component_type: &str,
        field: &str,
        target: AgentSpecVersion,
    ) -> bool {
        self.policy(component_type, field)
            .min_version
            .is_some_and(|min| target < min)
    }

    /// Check if a field is written when targeting `target`
    #[inline]
    #[must_use]
    pub fn is_field_emitted(&self, component_type: &str, field: &str, target: AgentSpecVersion) -> bool {
        let policy = self.policy(component_type, field);
        !policy.sensitive && policy.min_version.map_or(true, |min| target >= min)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.values().map(HashMap::len).sum()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

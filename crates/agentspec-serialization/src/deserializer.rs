//! Deserializer façade
//!
//! Rebuilds component graphs from documents, JSON text or YAML text, and
//! loads exported side tables so that split documents can be read back.

use crate::builtin::BuiltinDeserializationPlugin;
use crate::context::{DeserializationContext, REFERENCED_COMPONENTS_KEY};
use crate::error::{ConfigurationError, DeserializationError, DeserializationResult};
use crate::plugin::{ComponentDeserializationPlugin, PluginRegistry, SerializedDict};
use agentspec_core::version::{LEGACY_VERSION_FIELD, VERSION_FIELD};
use agentspec_core::{AgentSpecSchema, AgentSpecVersion, ComponentRef};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Per-call deserialization options
#[derive(Debug, Clone, Default)]
pub struct DeserializeOptions {
    /// Reference id → component, consulted before the document's side table
    pub components_registry: IndexMap<String, ComponentRef>,
}

impl DeserializeOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide one component for a reference id
    #[inline]
    #[must_use]
    pub fn with_component(mut self, reference_id: impl Into<String>, component: ComponentRef) -> Self {
        self.components_registry.insert(reference_id.into(), component);
        self
    }

    /// Provide several components
    #[inline]
    #[must_use]
    pub fn with_components(mut self, components: impl IntoIterator<Item = (String, ComponentRef)>) -> Self {
        self.components_registry.extend(components);
        self
    }
}

/// Reads component graphs from documents
pub struct AgentSpecDeserializer {
    schema: Arc<AgentSpecSchema>,
    plugins: PluginRegistry<dyn ComponentDeserializationPlugin>,
}

impl AgentSpecDeserializer {
    /// Create deserializer using only the builtin plugin
    #[must_use]
    pub fn new(schema: Arc<AgentSpecSchema>) -> Self {
        let builtin: Arc<dyn ComponentDeserializationPlugin> =
            Arc::new(BuiltinDeserializationPlugin::new(Arc::clone(&schema)));
        Self {
            plugins: PluginRegistry::builtin_only(builtin),
            schema,
        }
    }

    /// Create deserializer with user plugins ahead of the builtin one
    ///
    /// # Errors
    /// Returns [`ConfigurationError::PluginCollision`] if two plugins claim
    /// the same component type
    pub fn with_plugins(
        schema: Arc<AgentSpecSchema>,
        plugins: Vec<Arc<dyn ComponentDeserializationPlugin>>,
    ) -> Result<Self, ConfigurationError> {
        let builtin: Arc<dyn ComponentDeserializationPlugin> =
            Arc::new(BuiltinDeserializationPlugin::new(Arc::clone(&schema)));
        Ok(Self {
            plugins: PluginRegistry::new(plugins, builtin)?,
            schema,
        })
    }

    /// Schema in use
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &AgentSpecSchema {
        &self.schema
    }

    /// Load a component graph from a document
    ///
    /// # Errors
    /// See [`Self::from_dict_with`]
    pub fn from_dict(&self, dict: &SerializedDict) -> DeserializationResult<ComponentRef> {
        self.from_dict_with(dict, &DeserializeOptions::default())
    }

    /// Load a component graph from a document with options
    ///
    /// # Errors
    /// - [`DeserializationError::VersionMismatch`] for an unrecognized version
    /// - [`DeserializationError::UnknownComponentType`],
    ///   [`DeserializationError::DanglingReference`],
    ///   [`DeserializationError::CyclicReference`] for structural problems
    /// - [`DeserializationError::Validation`] for ill-formed fields
    pub fn from_dict_with(
        &self,
        dict: &SerializedDict,
        options: &DeserializeOptions,
    ) -> DeserializationResult<ComponentRef> {
        let version = self.document_version(dict)?;
        let mut context = DeserializationContext::new(
            &self.schema,
            &self.plugins,
            version,
            &options.components_registry,
        );
        let component = context.load_component_dict(dict)?;
        tracing::debug!(
            "loaded '{}' ({} distinct components) from version {}",
            component.id(),
            context.loaded_components(),
            version
        );
        Ok(component)
    }

    /// Load from JSON text
    ///
    /// # Errors
    /// Decoding errors, then as [`Self::from_dict_with`]
    pub fn from_json(&self, text: &str) -> DeserializationResult<ComponentRef> {
        self.from_json_with(text, &DeserializeOptions::default())
    }

    /// Load from JSON text with options
    ///
    /// # Errors
    /// Decoding errors, then as [`Self::from_dict_with`]
    pub fn from_json_with(&self, text: &str, options: &DeserializeOptions) -> DeserializationResult<ComponentRef> {
        let document = into_document(serde_json::from_str(text)?)?;
        self.from_dict_with(&document, options)
    }

    /// Load from YAML text
    ///
    /// # Errors
    /// Decoding errors, then as [`Self::from_dict_with`]
    pub fn from_yaml(&self, text: &str) -> DeserializationResult<ComponentRef> {
        self.from_yaml_with(text, &DeserializeOptions::default())
    }

    /// Load from YAML text with options
    ///
    /// # Errors
    /// Decoding errors, then as [`Self::from_dict_with`]
    pub fn from_yaml_with(&self, text: &str, options: &DeserializeOptions) -> DeserializationResult<ComponentRef> {
        let document = into_document(serde_yaml::from_str(text)?)?;
        self.from_dict_with(&document, options)
    }

    /// Load every entry of an exported side-table document
    ///
    /// The result maps reference ids to components and can be passed as
    /// [`DeserializeOptions::components_registry`] when loading the main
    /// document.
    ///
    /// # Errors
    /// Returns error if the document has no side table or an entry cannot be
    /// loaded
    pub fn load_referenced_components(
        &self,
        dict: &SerializedDict,
    ) -> DeserializationResult<IndexMap<String, ComponentRef>> {
        let version = self.document_version(dict)?;
        let table = match dict.get(REFERENCED_COMPONENTS_KEY) {
            Some(Value::Object(table)) => table,
            Some(_) => {
                return Err(DeserializationError::malformed(format!(
                    "'{REFERENCED_COMPONENTS_KEY}' must be an object"
                )))
            }
            None => {
                return Err(DeserializationError::malformed(format!(
                    "document has no '{REFERENCED_COMPONENTS_KEY}'"
                )))
            }
        };

        let provided = IndexMap::new();
        let mut context = DeserializationContext::new(&self.schema, &self.plugins, version, &provided);
        context.add_referenced_components(table)?;

        let mut components = IndexMap::with_capacity(table.len());
        for reference in table.keys() {
            let component = context.resolve_reference(reference)?;
            components.insert(reference.clone(), component);
        }
        Ok(components)
    }

    /// Load side-table entries from JSON text
    ///
    /// # Errors
    /// Decoding errors, then as [`Self::load_referenced_components`]
    pub fn load_referenced_components_from_json(
        &self,
        text: &str,
    ) -> DeserializationResult<IndexMap<String, ComponentRef>> {
        let document = into_document(serde_json::from_str(text)?)?;
        self.load_referenced_components(&document)
    }

    /// Load side-table entries from YAML text
    ///
    /// # Errors
    /// Decoding errors, then as [`Self::load_referenced_components`]
    pub fn load_referenced_components_from_yaml(
        &self,
        text: &str,
    ) -> DeserializationResult<IndexMap<String, ComponentRef>> {
        let document = into_document(serde_yaml::from_str(text)?)?;
        self.load_referenced_components(&document)
    }

    /// Version declared by a document
    ///
    /// `air_version` is only accepted for legacy versions. A document
    /// without a version field is read as the latest version.
    ///
    /// # Errors
    /// Returns [`DeserializationError::VersionMismatch`] if the declared
    /// version is malformed or not recognized
    pub fn document_version(&self, dict: &SerializedDict) -> DeserializationResult<AgentSpecVersion> {
        let versions = self.schema.versions();
        let (declared, legacy_field) = match (dict.get(VERSION_FIELD), dict.get(LEGACY_VERSION_FIELD)) {
            (Some(declared), _) => (declared, false),
            (None, Some(declared)) => (declared, true),
            (None, None) => {
                tracing::warn!(
                    "document has no '{}' field, reading it as version {}",
                    VERSION_FIELD,
                    versions.latest()
                );
                return Ok(versions.latest());
            }
        };

        let text = declared
            .as_str()
            .ok_or_else(|| DeserializationError::VersionMismatch(declared.to_string()))?;
        let version: AgentSpecVersion = text
            .parse()
            .map_err(|_| DeserializationError::VersionMismatch(text.to_string()))?;

        if !versions.is_recognized(version) || (legacy_field && !versions.is_legacy(version)) {
            return Err(DeserializationError::VersionMismatch(text.to_string()));
        }
        Ok(version)
    }
}

impl std::fmt::Debug for AgentSpecDeserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSpecDeserializer")
            .field("plugins", &self.plugins)
            .field("component_types", &self.schema.registry().len())
            .finish()
    }
}

fn into_document(value: Value) -> DeserializationResult<SerializedDict> {
    match value {
        Value::Object(dict) => Ok(dict),
        _ => Err(DeserializationError::malformed("document root must be an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentspec_core::TypeRegistry;
    use serde_json::json;

    fn deserializer() -> AgentSpecDeserializer {
        AgentSpecDeserializer::new(Arc::new(AgentSpecSchema::new(TypeRegistry::new())))
    }

    fn dict(value: Value) -> SerializedDict {
        into_document(value).unwrap()
    }

    #[test]
    fn version_detection() {
        let d = deserializer();
        assert_eq!(
            d.document_version(&dict(json!({"agentspec_version": "25.4.1"}))).unwrap(),
            AgentSpecVersion::V25_4_1
        );
        assert_eq!(
            d.document_version(&dict(json!({"air_version": "25.3.1"}))).unwrap(),
            AgentSpecVersion::V25_3_1
        );
        assert_eq!(d.document_version(&dict(json!({}))).unwrap(), AgentSpecVersion::LATEST);
    }

    #[test]
    fn unrecognized_versions_fail() {
        let d = deserializer();
        for document in [
            json!({"agentspec_version": "99.0.0"}),
            json!({"agentspec_version": "not-a-version"}),
            json!({"agentspec_version": 25}),
            json!({"air_version": "26.1.0"}),
        ] {
            assert!(matches!(
                d.document_version(&dict(document)),
                Err(DeserializationError::VersionMismatch(_))
            ));
        }
    }

    #[test]
    fn non_object_root_is_malformed() {
        let d = deserializer();
        assert!(matches!(
            d.from_json("[1, 2]"),
            Err(DeserializationError::MalformedDocument(_))
        ));
        assert!(matches!(d.from_json("{"), Err(DeserializationError::Json(_))));
    }

    #[test]
    fn side_table_document_is_required() {
        let d = deserializer();
        assert!(matches!(
            d.load_referenced_components(&dict(json!({"agentspec_version": "26.1.0"}))),
            Err(DeserializationError::MalformedDocument(_))
        ));
    }
}

//! Serializer façade
//!
//! Turns a component graph into a document (`serde_json` map), JSON text or
//! YAML text. Optionally splits chosen components out into a
//! `$referenced_components` side table.

use crate::builtin::BuiltinSerializationPlugin;
use crate::context::{ComponentsIdMapping, SerializationContext, REFERENCED_COMPONENTS_KEY};
use crate::error::{ConfigurationError, SerializationError, SerializationResult};
use crate::plugin::{ComponentSerializationPlugin, PluginRegistry, SerializedDict};
use crate::referencing::compute_referencing_structure;
use agentspec_core::{AgentSpecSchema, AgentSpecVersion, ComponentRef, FieldCasing};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of a serialize call
///
/// `Disaggregated` is only returned when the caller asked for the side
/// table to be exported.
#[derive(Debug, Clone, PartialEq)]
pub enum Exported<T> {
    /// Main document only
    Single(T),

    /// Main document and the `$referenced_components` document
    Disaggregated {
        /// Main document, with reference markers
        main: T,
        /// Side-table document
        referenced: T,
    },
}

impl<T> Exported<T> {
    /// Main document
    #[inline]
    #[must_use]
    pub fn main(&self) -> &T {
        match self {
            Self::Single(main) | Self::Disaggregated { main, .. } => main,
        }
    }

    /// Side-table document, if exported
    #[inline]
    #[must_use]
    pub fn referenced(&self) -> Option<&T> {
        match self {
            Self::Single(_) => None,
            Self::Disaggregated { referenced, .. } => Some(referenced),
        }
    }

    /// Take the main document
    #[inline]
    #[must_use]
    pub fn into_main(self) -> T {
        match self {
            Self::Single(main) | Self::Disaggregated { main, .. } => main,
        }
    }

    /// Split into main and optional side-table document
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (T, Option<T>) {
        match self {
            Self::Single(main) => (main, None),
            Self::Disaggregated { main, referenced } => (main, Some(referenced)),
        }
    }

    /// Convert both documents
    ///
    /// # Errors
    /// Returns the first conversion error
    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<Exported<U>, E> {
        Ok(match self {
            Self::Single(main) => Exported::Single(f(main)?),
            Self::Disaggregated { main, referenced } => Exported::Disaggregated {
                main: f(main)?,
                referenced: f(referenced)?,
            },
        })
    }
}

/// Component to write into the side table
#[derive(Debug, Clone)]
pub struct DisaggregatedComponent {
    component: ComponentRef,
    reference_id: Option<String>,
}

impl DisaggregatedComponent {
    /// Disaggregate under the component's own id
    #[inline]
    #[must_use]
    pub fn new(component: ComponentRef) -> Self {
        Self {
            component,
            reference_id: None,
        }
    }

    /// Disaggregate under a caller-chosen reference id
    #[inline]
    #[must_use]
    pub fn with_reference_id(component: ComponentRef, reference_id: impl Into<String>) -> Self {
        Self {
            component,
            reference_id: Some(reference_id.into()),
        }
    }

    /// Disaggregated component
    #[inline]
    #[must_use]
    pub fn component(&self) -> &ComponentRef {
        &self.component
    }

    /// Reference id written in markers
    #[inline]
    #[must_use]
    pub fn reference_id(&self) -> &str {
        self.reference_id
            .as_deref()
            .unwrap_or_else(|| self.component.id())
    }
}

/// Per-call serialization options
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Target version; latest recognized when unset
    pub agentspec_version: Option<AgentSpecVersion>,
    /// Components written as references
    pub disaggregated_components: Vec<DisaggregatedComponent>,
    /// Return the side table alongside the main document
    pub export_disaggregated_components: bool,
    /// JSON indentation; compact when unset
    pub indent: Option<usize>,
    /// Field name casing
    pub casing: FieldCasing,
}

impl SerializeOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set target version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: AgentSpecVersion) -> Self {
        self.agentspec_version = Some(version);
        self
    }

    /// Disaggregate a component under its own id
    #[inline]
    #[must_use]
    pub fn disaggregate(mut self, component: &ComponentRef) -> Self {
        self.disaggregated_components
            .push(DisaggregatedComponent::new(Arc::clone(component)));
        self
    }

    /// Disaggregate a component under a chosen reference id
    #[inline]
    #[must_use]
    pub fn disaggregate_as(mut self, component: &ComponentRef, reference_id: impl Into<String>) -> Self {
        self.disaggregated_components
            .push(DisaggregatedComponent::with_reference_id(Arc::clone(component), reference_id));
        self
    }

    /// Request the side table
    #[inline]
    #[must_use]
    pub fn export_disaggregated(mut self, export: bool) -> Self {
        self.export_disaggregated_components = export;
        self
    }

    /// Pretty-print JSON with `indent` spaces
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    /// Set field name casing
    #[inline]
    #[must_use]
    pub fn with_casing(mut self, casing: FieldCasing) -> Self {
        self.casing = casing;
        self
    }

    /// Write field names in camelCase
    #[inline]
    #[must_use]
    pub fn camel_case(self) -> Self {
        self.with_casing(FieldCasing::CamelCase)
    }
}

/// Disaggregation plan of one call
struct Disaggregation {
    mapping: ComponentsIdMapping,
    entries: Vec<(String, ComponentRef)>,
}

/// Writes component graphs as documents
pub struct AgentSpecSerializer {
    schema: Arc<AgentSpecSchema>,
    plugins: PluginRegistry<dyn ComponentSerializationPlugin>,
}

impl AgentSpecSerializer {
    /// Create serializer using only the builtin plugin
    #[must_use]
    pub fn new(schema: Arc<AgentSpecSchema>) -> Self {
        let builtin: Arc<dyn ComponentSerializationPlugin> =
            Arc::new(BuiltinSerializationPlugin::new(Arc::clone(&schema)));
        Self {
            plugins: PluginRegistry::builtin_only(builtin),
            schema,
        }
    }

    /// Create serializer with user plugins ahead of the builtin one
    ///
    /// # Errors
    /// Returns [`ConfigurationError::PluginCollision`] if two plugins claim
    /// the same component type
    pub fn with_plugins(
        schema: Arc<AgentSpecSchema>,
        plugins: Vec<Arc<dyn ComponentSerializationPlugin>>,
    ) -> Result<Self, ConfigurationError> {
        let builtin: Arc<dyn ComponentSerializationPlugin> =
            Arc::new(BuiltinSerializationPlugin::new(Arc::clone(&schema)));
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

    /// Plugin registry in use
    #[inline]
    #[must_use]
    pub fn plugins(&self) -> &PluginRegistry<dyn ComponentSerializationPlugin> {
        &self.plugins
    }

    /// Serialize to a document
    ///
    /// # Errors
    /// - [`SerializationError::Configuration`] for an unrecognized version or
    ///   an export request without disaggregated components
    /// - [`SerializationError::RootDisaggregation`] if `component` itself is
    ///   listed for disaggregation
    /// - [`SerializationError::DuplicateDisaggregatedId`] if two components
    ///   share a reference id
    /// - any error raised while serializing a reachable component
    pub fn to_dict(
        &self,
        component: &ComponentRef,
        options: &SerializeOptions,
    ) -> SerializationResult<Exported<SerializedDict>> {
        let version = self.target_version(options)?;
        if options.export_disaggregated_components && options.disaggregated_components.is_empty() {
            return Err(ConfigurationError::InvalidOption(
                "export_disaggregated_components requires at least one disaggregated component".into(),
            )
            .into());
        }

        let plan = Self::plan_disaggregation(component, options)?;
        if !plan.mapping.is_empty() {
            let structure = compute_referencing_structure(component);
            for orphan in structure.orphans(plan.mapping.keys().map(String::as_str)) {
                tracing::warn!(
                    "disaggregated component '{}' is not reachable from '{}'",
                    orphan,
                    component.id()
                );
            }
        }

        let mut context = SerializationContext::new(
            &self.schema,
            &self.plugins,
            version,
            options.casing,
            &plan.mapping,
        );
        let main = context.save_to_dict(component)?;
        if !options.export_disaggregated_components {
            return Ok(Exported::Single(main));
        }

        let mut table = SerializedDict::new();
        for (reference, disaggregated) in &plan.entries {
            table.insert(reference.clone(), Value::Object(context.component_dict(disaggregated)?));
        }
        tracing::debug!(
            "exported {} disaggregated components, {} distinct components serialized",
            table.len(),
            context.cached_components()
        );

        let mut referenced = SerializedDict::new();
        referenced.insert(REFERENCED_COMPONENTS_KEY.to_string(), Value::Object(table));
        referenced.insert(
            self.schema.versions().version_field_name(version).to_string(),
            Value::String(version.to_string()),
        );

        Ok(Exported::Disaggregated { main, referenced })
    }

    /// Serialize to JSON text
    ///
    /// # Errors
    /// Same as [`Self::to_dict`], plus encoding errors
    pub fn to_json(
        &self,
        component: &ComponentRef,
        options: &SerializeOptions,
    ) -> SerializationResult<Exported<String>> {
        self.to_dict(component, options)?
            .try_map(|dict| encode_json(&dict, options.indent))
    }

    /// Serialize to YAML text (block style, insertion order)
    ///
    /// # Errors
    /// Same as [`Self::to_dict`], plus encoding errors
    pub fn to_yaml(
        &self,
        component: &ComponentRef,
        options: &SerializeOptions,
    ) -> SerializationResult<Exported<String>> {
        self.to_dict(component, options)?
            .try_map(|dict| serde_yaml::to_string(&dict).map_err(SerializationError::from))
    }

    fn target_version(&self, options: &SerializeOptions) -> SerializationResult<AgentSpecVersion> {
        let versions = self.schema.versions();
        match options.agentspec_version {
            None => Ok(versions.latest()),
            Some(version) if versions.is_recognized(version) => Ok(version),
            Some(version) => Err(ConfigurationError::InvalidOption(format!(
                "unrecognized agentspec_version '{version}'"
            ))
            .into()),
        }
    }

    fn plan_disaggregation(
        root: &ComponentRef,
        options: &SerializeOptions,
    ) -> SerializationResult<Disaggregation> {
        let mut mapping = ComponentsIdMapping::new();
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut entries = Vec::new();

        for disaggregated in &options.disaggregated_components {
            let id = disaggregated.component().id();
            if id == root.id() {
                return Err(SerializationError::RootDisaggregation(id.to_string()));
            }

            let reference = disaggregated.reference_id();
            if owners.get(reference).is_some_and(|owner| owner != id) {
                return Err(SerializationError::DuplicateDisaggregatedId(reference.to_string()));
            }
            match mapping.get(id) {
                Some(existing) if existing == reference => continue,
                Some(existing) => {
                    return Err(ConfigurationError::InvalidOption(format!(
                        "component '{id}' is disaggregated as both '{existing}' and '{reference}'"
                    ))
                    .into())
                }
                None => {}
            }

            owners.insert(reference.to_string(), id.to_string());
            mapping.insert(id.to_string(), reference.to_string());
            entries.push((reference.to_string(), Arc::clone(disaggregated.component())));
        }

        Ok(Disaggregation { mapping, entries })
    }
}

impl std::fmt::Debug for AgentSpecSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSpecSerializer")
            .field("plugins", &self.plugins)
            .field("component_types", &self.schema.registry().len())
            .finish()
    }
}

fn encode_json(dict: &SerializedDict, indent: Option<usize>) -> SerializationResult<String> {
    let Some(width) = indent else {
        return Ok(serde_json::to_string(dict)?);
    };

    let indent = " ".repeat(width);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    dict.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| SerializationError::InvalidValue(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_accessors() {
        let single = Exported::Single(1);
        assert_eq!(*single.main(), 1);
        assert!(single.referenced().is_none());

        let split = Exported::Disaggregated { main: 1, referenced: 2 };
        assert_eq!(split.referenced(), Some(&2));
        let doubled: Result<_, ()> = split.try_map(|v| Ok(v * 2));
        assert_eq!(doubled.unwrap().into_parts(), (2, Some(4)));
    }

    #[test]
    fn json_indent() {
        let mut dict = SerializedDict::new();
        dict.insert("a".into(), Value::from(1));
        assert_eq!(encode_json(&dict, None).unwrap(), r#"{"a":1}"#);
        assert_eq!(encode_json(&dict, Some(4)).unwrap(), "{\n    \"a\": 1\n}");
    }
}

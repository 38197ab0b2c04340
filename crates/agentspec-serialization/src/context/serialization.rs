use super::{COMPONENT_REF_KEY, COMPONENT_TYPE_KEY};
use crate::error::SerializationError;
use crate::plugin::{ComponentSerializationPlugin, PluginRegistry, SerializedDict};
use agentspec_core::{
    AgentSpecSchema, AgentSpecVersion, Component, ComponentRef, FieldCasing, FieldValue, ModelObject,
};
use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Component id → reference id of disaggregated components
pub type ComponentsIdMapping = IndexMap<String, String>;

/// State of one serialization call
///
/// Components listed in the id mapping are written as reference markers
/// wherever they are nested; every other component is serialized once per
/// call and reused from the cache on later occurrences.
pub struct SerializationContext<'a> {
    schema: &'a AgentSpecSchema,
    plugins: &'a PluginRegistry<dyn ComponentSerializationPlugin>,
    target_version: AgentSpecVersion,
    casing: FieldCasing,
    disaggregated: &'a ComponentsIdMapping,
    cache: HashMap<String, SerializedDict>,
}

impl<'a> SerializationContext<'a> {
    /// Create context for one call
    #[must_use]
    pub fn new(
        schema: &'a AgentSpecSchema,
        plugins: &'a PluginRegistry<dyn ComponentSerializationPlugin>,
        target_version: AgentSpecVersion,
        casing: FieldCasing,
        disaggregated: &'a ComponentsIdMapping,
    ) -> Self {
        Self {
            schema,
            plugins,
            target_version,
            casing,
            disaggregated,
            cache: HashMap::new(),
        }
    }

    /// Schema in use
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &AgentSpecSchema {
        self.schema
    }

    /// Target document version
    #[inline]
    #[must_use]
    pub fn target_version(&self) -> AgentSpecVersion {
        self.target_version
    }

    /// Casing of written field names
    #[inline]
    #[must_use]
    pub fn casing(&self) -> FieldCasing {
        self.casing
    }

    /// Number of distinct components serialized so far
    #[inline]
    #[must_use]
    pub fn cached_components(&self) -> usize {
        self.cache.len()
    }

    /// Serialize a top-level subject and append the version field
    ///
    /// # Errors
    /// Returns error if any reachable component cannot be serialized
    pub fn save_to_dict(&mut self, component: &Component) -> Result<SerializedDict, SerializationError> {
        let mut dict = self.component_dict(component)?;
        let versions = self.schema.versions();
        dict.insert(
            versions.version_field_name(self.target_version).to_string(),
            Value::String(self.target_version.to_string()),
        );
        Ok(dict)
    }

    /// Full dict of a component, ignoring its disaggregation status
    ///
    /// # Errors
    /// Returns error if no plugin supports the type or the type is newer
    /// than the target version
    pub fn component_dict(&mut self, component: &Component) -> Result<SerializedDict, SerializationError> {
        // Plugins run once per id, but inlined output still copies the
        // cached dict at every occurrence. Disaggregation avoids the copies.
        if let Some(dict) = self.cache.get(component.id()) {
            tracing::debug!(
                "reusing cached dict of '{}' ({} keys copied)",
                component.id(),
                dict.len()
            );
            return Ok(dict.clone());
        }

        let component_type = component.component_type();
        if let Some(min_version) = self
            .schema
            .registry()
            .lookup(component_type)
            .and_then(|t| t.shape().min_version())
        {
            if self.target_version < min_version {
                return Err(SerializationError::UnsupportedVersion {
                    component_type: component_type.to_string(),
                    min_version,
                    target: self.target_version,
                });
            }
        }

        let plugins = self.plugins;
        let plugin = plugins
            .dispatch(component_type)
            .ok_or_else(|| SerializationError::UnsupportedComponentType(component_type.to_string()))?;
        tracing::debug!(
            "serializing {} '{}' with plugin {}",
            component_type,
            component.id(),
            plugin.plugin_name()
        );

        let dict = plugin.serialize(component, self)?;
        self.cache.insert(component.id().to_string(), dict.clone());
        Ok(dict)
    }

    /// Serialize a nested component, or a marker if it is disaggregated
    ///
    /// # Errors
    /// Returns error if the component cannot be serialized
    pub fn dump_component(&mut self, component: &ComponentRef) -> Result<Value, SerializationError> {
        if let Some(reference) = self.disaggregated.get(component.id()) {
            let mut marker = SerializedDict::new();
            marker.insert(COMPONENT_REF_KEY.to_string(), Value::String(reference.clone()));
            return Ok(Value::Object(marker));
        }
        self.component_dict(component).map(Value::Object)
    }

    /// Serialize any field value
    ///
    /// Lists keep their order, map keys are written verbatim, model object
    /// keys follow the casing mode and drop null entries.
    ///
    /// # Errors
    /// Returns error for non-finite floats or unserializable components
    pub fn dump_field(&mut self, value: &FieldValue) -> Result<Value, SerializationError> {
        Ok(match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::Number((*i).into()),
            FieldValue::Float(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
                SerializationError::InvalidValue(format!("non-finite float {f}"))
            })?,
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.dump_field(item))
                    .collect::<Result<_, _>>()?,
            ),
            FieldValue::Map(map) => {
                let mut out = SerializedDict::new();
                for (key, item) in map {
                    out.insert(key.clone(), self.dump_field(item)?);
                }
                Value::Object(out)
            }
            FieldValue::Object(object) => Value::Object(self.dump_model_object(object, true)?),
            FieldValue::Component(component) => self.dump_component(component)?,
        })
    }

    /// Serialize a model object with casing-converted keys
    ///
    /// # Errors
    /// Returns error if a nested value cannot be serialized
    pub fn dump_model_object(
        &mut self,
        object: &ModelObject,
        exclude_nulls: bool,
    ) -> Result<SerializedDict, SerializationError> {
        let mut out = SerializedDict::new();
        for (key, item) in object.iter() {
            if exclude_nulls && item.is_null() {
                continue;
            }
            let name = self.serialized_field_name(key);
            out.insert(name, self.dump_field(item)?);
        }
        Ok(out)
    }

    /// Written name of a canonical field name
    #[must_use]
    pub fn serialized_field_name(&self, canonical: &str) -> String {
        self.casing.apply(canonical).into_owned()
    }

    /// Check if a field of a component type is written at the target version
    #[inline]
    #[must_use]
    pub fn is_field_emitted(&self, component_type: &str, field: &str) -> bool {
        self.schema
            .catalog()
            .is_field_emitted(component_type, field, self.target_version)
    }

    /// Serialize a component from its registered field table
    ///
    /// Writes the discriminator, `id`, `name`, `description` (when set) and
    /// `metadata`, then every declared field that is neither sensitive nor
    /// newer than the target version.
    ///
    /// # Errors
    /// Returns error if the type is not registered or a value cannot be
    /// serialized
    pub fn serialize_component_fields(
        &mut self,
        component: &Component,
    ) -> Result<SerializedDict, SerializationError> {
        let schema = self.schema;
        let component_type = component.component_type();
        let registered = schema
            .registry()
            .lookup(component_type)
            .ok_or_else(|| SerializationError::UnsupportedComponentType(component_type.to_string()))?;

        let mut dict = SerializedDict::new();
        dict.insert(
            COMPONENT_TYPE_KEY.to_string(),
            Value::String(component_type.to_string()),
        );
        dict.insert(self.serialized_field_name("id"), Value::String(component.id().to_string()));
        dict.insert(
            self.serialized_field_name("name"),
            Value::String(component.name().to_string()),
        );
        if let Some(description) = component.description() {
            dict.insert(
                self.serialized_field_name("description"),
                Value::String(description.to_string()),
            );
        }
        let mut metadata = SerializedDict::new();
        for (key, item) in component.metadata() {
            metadata.insert(key.clone(), self.dump_field(item)?);
        }
        dict.insert(self.serialized_field_name("metadata"), Value::Object(metadata));

        for descriptor in registered.shape().fields() {
            let name = descriptor.name();
            if !self.is_field_emitted(component_type, name) {
                continue;
            }
            let value = match component.field(name) {
                Some(value) => self.dump_field(value)?,
                None => Value::Null,
            };
            dict.insert(self.serialized_field_name(name), value);
        }
        Ok(dict)
    }
}

impl std::fmt::Debug for SerializationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializationContext")
            .field("target_version", &self.target_version)
            .field("casing", &self.casing)
            .field("disaggregated", &self.disaggregated.len())
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

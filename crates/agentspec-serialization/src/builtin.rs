//! Builtin plugins
//!
//! Handle every type registered in the schema by walking its field table.
//! Always appended last to a plugin registry.

use crate::context::{DeserializationContext, SerializationContext};
use crate::error::{DeserializationError, SerializationError};
use crate::plugin::{ComponentDeserializationPlugin, ComponentSerializationPlugin, Plugin, SerializedDict};
use agentspec_core::{AgentSpecSchema, Component};
use std::sync::Arc;

/// Name reported by both builtin plugins
pub const BUILTIN_PLUGIN_NAME: &str = "builtin";

/// Serializes any registered type from its field table
#[derive(Debug, Clone)]
pub struct BuiltinSerializationPlugin {
    schema: Arc<AgentSpecSchema>,
}

impl BuiltinSerializationPlugin {
    /// Create plugin for a schema
    #[inline]
    #[must_use]
    pub fn new(schema: Arc<AgentSpecSchema>) -> Self {
        Self { schema }
    }
}

impl Plugin for BuiltinSerializationPlugin {
    fn plugin_name(&self) -> &str {
        BUILTIN_PLUGIN_NAME
    }

    fn supported_component_types(&self) -> Vec<String> {
        self.schema.registry().type_names().map(String::from).collect()
    }

    fn supports(&self, component_type: &str) -> bool {
        self.schema.registry().contains(component_type)
    }
}

impl ComponentSerializationPlugin for BuiltinSerializationPlugin {
    fn serialize(
        &self,
        component: &Component,
        context: &mut SerializationContext<'_>,
    ) -> Result<SerializedDict, SerializationError> {
        context.serialize_component_fields(component)
    }
}

/// Deserializes any registered type from its field table
#[derive(Debug, Clone)]
pub struct BuiltinDeserializationPlugin {
    schema: Arc<AgentSpecSchema>,
}

impl BuiltinDeserializationPlugin {
    /// Create plugin for a schema
    #[inline]
    #[must_use]
    pub fn new(schema: Arc<AgentSpecSchema>) -> Self {
        Self { schema }
    }
}

impl Plugin for BuiltinDeserializationPlugin {
    fn plugin_name(&self) -> &str {
        BUILTIN_PLUGIN_NAME
    }

    fn supported_component_types(&self) -> Vec<String> {
        self.schema.registry().type_names().map(String::from).collect()
    }

    fn supports(&self, component_type: &str) -> bool {
        self.schema.registry().contains(component_type)
    }
}

impl ComponentDeserializationPlugin for BuiltinDeserializationPlugin {
    fn deserialize(
        &self,
        dict: &SerializedDict,
        context: &mut DeserializationContext<'_>,
    ) -> Result<Component, DeserializationError> {
        context.deserialize_component_fields(dict)
    }
}

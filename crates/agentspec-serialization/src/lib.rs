//! Agent Spec serialization
//!
//! Converts component graphs to and from portable, versioned documents.
//!
//! # Core Operations
//!
//! - **Serialize**: component graph → document, with sensitive fields
//!   omitted, version-gated fields hidden and optional disaggregation
//! - **Deserialize**: document → component graph, resolving references
//!   against caller-provided components and the document's side table
//!
//! # Architecture
//!
//! ```text
//! Component ─► SerializationContext ─► PluginRegistry ─► SerializedDict ─► JSON / YAML
//!                     ▲                      │
//!                     └──── nested values ◄──┘
//! JSON / YAML ─► SerializedDict ─► DeserializationContext ─► PluginRegistry ─► Component
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use agentspec_serialization::prelude::*;
//!
//! let serializer = AgentSpecSerializer::new(schema.clone());
//! let json = serializer
//!     .to_json(&agent, &SerializeOptions::new().with_indent(2))?
//!     .into_main();
//!
//! let deserializer = AgentSpecDeserializer::new(schema);
//! let loaded = deserializer.from_json(&json)?;
//! assert_eq!(*loaded, *agent);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builtin;
pub mod context;
pub mod deserializer;
pub mod error;
pub mod plugin;
pub mod referencing;
pub mod serializer;

pub use builtin::{BuiltinDeserializationPlugin, BuiltinSerializationPlugin};
pub use context::{
    ComponentsIdMapping, DeserializationContext, SerializationContext, COMPONENT_REF_KEY,
    COMPONENT_TYPE_KEY, REFERENCED_COMPONENTS_KEY,
};
pub use deserializer::{AgentSpecDeserializer, DeserializeOptions};
pub use error::{
    ConfigurationError, DeserializationError, DeserializationResult, SerializationError,
    SerializationResult,
};
pub use plugin::{
    ComponentDeserializationPlugin, ComponentSerializationPlugin, Plugin, PluginRegistry,
    SerializedDict,
};
pub use referencing::{compute_referencing_structure, direct_children, ReferencingStructure};
pub use serializer::{AgentSpecSerializer, DisaggregatedComponent, Exported, SerializeOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for serializing and deserializing component graphs
    pub use crate::deserializer::{AgentSpecDeserializer, DeserializeOptions};
    pub use crate::error::{ConfigurationError, DeserializationError, SerializationError};
    pub use crate::plugin::{
        ComponentDeserializationPlugin, ComponentSerializationPlugin, Plugin, SerializedDict,
    };
    pub use crate::serializer::{AgentSpecSerializer, Exported, SerializeOptions};
    pub use agentspec_core::{AgentSpecSchema, AgentSpecVersion, Component, ComponentRef, FieldCasing};
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use agentspec_core::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn schema() -> Arc<AgentSpecSchema> {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                "Leaf",
                ComponentShape::new()
                    .with_field(FieldDescriptor::new("value", FieldKind::Integer))
                    .with_field(
                        FieldDescriptor::new("token", FieldKind::optional(FieldKind::String)).sensitive(),
                    ),
                validating_factory,
            )
            .unwrap();
        registry
            .register(
                "Holder",
                ComponentShape::new()
                    .with_field(FieldDescriptor::new("first", FieldKind::any_component()))
                    .with_field(FieldDescriptor::new("second", FieldKind::any_component())),
                validating_factory,
            )
            .unwrap();
        Arc::new(AgentSpecSchema::new(registry))
    }

    fn graph(schema: &AgentSpecSchema) -> (ComponentRef, ComponentRef) {
        let leaf = Component::builder("Leaf", "leaf")
            .id("leaf")
            .field("value", 3)
            .field("token", "hidden")
            .build(schema.registry())
            .unwrap();
        let holder = Component::builder("Holder", "holder")
            .id("holder")
            .field("first", &leaf)
            .field("second", &leaf)
            .build(schema.registry())
            .unwrap();
        (holder, leaf)
    }

    #[test]
    fn round_trip_drops_sensitive_and_shares_children() {
        let schema = schema();
        let (holder, _) = graph(&schema);
        let serializer = AgentSpecSerializer::new(Arc::clone(&schema));
        let deserializer = AgentSpecDeserializer::new(schema);

        let dict = serializer
            .to_dict(&holder, &SerializeOptions::new())
            .unwrap()
            .into_main();
        assert_eq!(
            dict["first"],
            json!({"component_type": "Leaf", "id": "leaf", "name": "leaf", "metadata": {}, "value": 3})
        );

        let loaded = deserializer.from_dict(&dict).unwrap();
        let first = loaded.field("first").and_then(FieldValue::as_component).unwrap();
        let second = loaded.field("second").and_then(FieldValue::as_component).unwrap();
        assert!(Arc::ptr_eq(first, second));
        assert_eq!(first.field("token"), Some(&FieldValue::Null));
    }

    #[test]
    fn split_export_loads_back() {
        let schema = schema();
        let (holder, leaf) = graph(&schema);
        let serializer = AgentSpecSerializer::new(Arc::clone(&schema));
        let deserializer = AgentSpecDeserializer::new(schema);

        let options = SerializeOptions::new()
            .disaggregate_as(&leaf, "shared_leaf")
            .export_disaggregated(true);
        let (main, referenced) = serializer.to_json(&holder, &options).unwrap().into_parts();
        let referenced = referenced.unwrap();
        assert!(main.contains(r#"{"$component_ref":"shared_leaf"}"#));

        let components = deserializer
            .load_referenced_components_from_json(&referenced)
            .unwrap();
        let loaded = deserializer
            .from_json_with(&main, &DeserializeOptions::new().with_components(components))
            .unwrap();
        assert_eq!(
            loaded.field("first").and_then(FieldValue::as_component).unwrap().id(),
            "leaf"
        );
    }
}

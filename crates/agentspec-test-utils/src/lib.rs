//! Testing utilities for the Agent Spec workspace
//!
//! Sample component graphs, a schema with an extra fixture type, and
//! plugins that record how they are used.

#![allow(missing_docs)]

use agentspec_components::prelude::*;
use agentspec_components::{GenerationParameters, AGENT};
use agentspec_core::{AgentSpecSchema, Component, ComponentRef, FieldValue};
use agentspec_serialization::{
    ComponentDeserializationPlugin, ComponentSerializationPlugin, DeserializationContext,
    DeserializationError, Plugin, SerializationContext, SerializationError, SerializedDict,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const SAMPLE_API_KEY: &str = "sk-test-0000";

pub fn schema() -> Arc<AgentSpecSchema> {
    builtin_schema().unwrap()
}

pub fn sample_llm(schema: &AgentSpecSchema) -> ComponentRef {
    openai_compatible_config("local-llm", "http://localhost:8000/v1", "llama-3")
        .id("llm")
        .field("api_key", SAMPLE_API_KEY)
        .field(
            "default_generation_parameters",
            GenerationParameters {
                max_tokens: Some(512),
                temperature: Some(0.5),
                top_p: None,
            },
        )
        .build(schema.registry())
        .unwrap()
}

pub fn sample_tool(schema: &AgentSpecSchema) -> ComponentRef {
    server_tool("search")
        .id("search")
        .description("Search the knowledge base")
        .field("inputs", vec![string_property("query")])
        .field("outputs", vec![string_property("results")])
        .build(schema.registry())
        .unwrap()
}

/// Agent whose prompt has a single `{{x}}` placeholder and whose LLM holds
/// [`SAMPLE_API_KEY`]
pub fn sample_agent(schema: &AgentSpecSchema) -> ComponentRef {
    let llm = sample_llm(schema);
    let tool = sample_tool(schema);
    agent("assistant", &llm, "You are a helpful assistant. Help the user with {{x}}.")
        .id("assistant")
        .metadata("owner", "tests")
        .field("tools", vec![FieldValue::from(&tool)])
        .build(schema.registry())
        .unwrap()
}

/// Start → LLM node → end, with the LLM node's output wired to the end
pub fn sample_flow(schema: &AgentSpecSchema) -> ComponentRef {
    let registry = schema.registry();
    let llm = sample_llm(schema);
    let start = start_node("start")
        .id("start")
        .field("inputs", vec![string_property("topic")])
        .build(registry)
        .unwrap();
    let write = llm_node("write", &llm, "Write a poem about {{topic}}")
        .id("write")
        .field("outputs", vec![string_property("poem")])
        .build(registry)
        .unwrap();
    let end = end_node("end")
        .id("end")
        .field("outputs", vec![string_property("poem")])
        .build(registry)
        .unwrap();

    let control = [
        control_flow_edge("start_to_write", &start, &write)
            .id("start_to_write")
            .build(registry)
            .unwrap(),
        control_flow_edge("write_to_end", &write, &end)
            .id("write_to_end")
            .build(registry)
            .unwrap(),
    ];
    let data = data_flow_edge("poem", (&write, "poem"), (&end, "poem"))
        .id("poem_wire")
        .build(registry)
        .unwrap();

    flow("poet", &start, &[start.clone(), write, end], &control)
        .id("poet")
        .field("data_flow_connections", vec![FieldValue::from(&data)])
        .build(registry)
        .unwrap()
}

/// Two agents sharing one LLM config, linked both ways
pub fn sample_swarm(schema: &AgentSpecSchema) -> ComponentRef {
    let registry = schema.registry();
    let llm = sample_llm(schema);
    let triage = agent("triage", &llm, "Route the request")
        .id("triage")
        .build(registry)
        .unwrap();
    let billing = agent("billing", &llm, "Answer billing questions about {{invoice}}")
        .id("billing")
        .build(registry)
        .unwrap();
    swarm(
        "support",
        &triage,
        &[(triage.clone(), billing.clone()), (billing, triage.clone())],
    )
    .id("support")
    .build(registry)
    .unwrap()
}

pub const CACHE_CONFIG: &str = "CacheConfig";

/// Builtin types plus [`CACHE_CONFIG`], whose fields are declared in camelCase
pub fn schema_with_cache() -> Arc<AgentSpecSchema> {
    schema_builder()
        .unwrap()
        .register(
            CACHE_CONFIG,
            ComponentShape::new()
                .with_field(FieldDescriptor::new("maxCacheSize", FieldKind::Integer))
                .with_field(FieldDescriptor::new("evictionPolicy", FieldKind::String).with_default("lru"))
                .with_field(FieldDescriptor::new("labels", FieldKind::map(FieldKind::String)).with_default(
                    FieldValue::Map(Default::default()),
                )),
            validating_factory,
        )
        .unwrap()
        .build()
}

pub fn sample_cache(schema: &AgentSpecSchema) -> ComponentRef {
    Component::builder(CACHE_CONFIG, "cache")
        .id("cache")
        .field("max_cache_size", 128)
        .field(
            "labels",
            [("teamName", "core")].into_iter().collect::<FieldValue>(),
        )
        .build(schema.registry())
        .unwrap()
}

/// Serialization plugin that counts its calls and writes through the
/// builtin field walk
#[derive(Debug)]
pub struct CountingSerializationPlugin {
    name: String,
    types: Vec<String>,
    calls: AtomicUsize,
}

impl CountingSerializationPlugin {
    pub fn new(name: &str, types: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            types: types.iter().map(|t| (*t).to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Plugin for CountingSerializationPlugin {
    fn plugin_name(&self) -> &str {
        &self.name
    }

    fn supported_component_types(&self) -> Vec<String> {
        self.types.clone()
    }
}

impl ComponentSerializationPlugin for CountingSerializationPlugin {
    fn serialize(
        &self,
        component: &Component,
        context: &mut SerializationContext<'_>,
    ) -> Result<SerializedDict, SerializationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        context.serialize_component_fields(component)
    }
}

/// Deserialization counterpart of [`CountingSerializationPlugin`]
#[derive(Debug)]
pub struct CountingDeserializationPlugin {
    name: String,
    types: Vec<String>,
    calls: AtomicUsize,
}

impl CountingDeserializationPlugin {
    pub fn new(name: &str, types: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            types: types.iter().map(|t| (*t).to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Plugin for CountingDeserializationPlugin {
    fn plugin_name(&self) -> &str {
        &self.name
    }

    fn supported_component_types(&self) -> Vec<String> {
        self.types.clone()
    }
}

impl ComponentDeserializationPlugin for CountingDeserializationPlugin {
    fn deserialize(
        &self,
        dict: &SerializedDict,
        context: &mut DeserializationContext<'_>,
    ) -> Result<Component, DeserializationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        context.deserialize_component_fields(dict)
    }
}

/// Serialization plugin for `"Agent"` that stamps its name into the
/// metadata it writes
#[derive(Debug)]
pub struct StampingAgentPlugin {
    name: String,
}

impl StampingAgentPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Plugin for StampingAgentPlugin {
    fn plugin_name(&self) -> &str {
        &self.name
    }

    fn supported_component_types(&self) -> Vec<String> {
        vec![AGENT.to_string()]
    }
}

impl ComponentSerializationPlugin for StampingAgentPlugin {
    fn serialize(
        &self,
        component: &Component,
        context: &mut SerializationContext<'_>,
    ) -> Result<SerializedDict, SerializationError> {
        let mut dict = context.serialize_component_fields(component)?;
        if let Some(serde_json::Value::Object(metadata)) = dict.get_mut("metadata") {
            metadata.insert(
                "serialized_by".to_string(),
                serde_json::Value::String(self.name.clone()),
            );
        }
        Ok(dict)
    }
}

/// Plugin list with the given plugins behind trait objects
pub fn serialization_plugins<P>(plugins: Vec<Arc<P>>) -> Vec<Arc<dyn ComponentSerializationPlugin>>
where
    P: ComponentSerializationPlugin + 'static,
{
    plugins
        .into_iter()
        .map(|p| p as Arc<dyn ComponentSerializationPlugin>)
        .collect()
}

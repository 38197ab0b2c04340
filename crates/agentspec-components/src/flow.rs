//! Flows, nodes and edges
//!
//! A [`FLOW`] is a graph of [`NODE`]s linked by control-flow edges, with
//! optional data-flow edges wiring node outputs to node inputs. Execution
//! enters at a [`START_NODE`] and leaves through [`END_NODE`]s.
//!
//! Flow-level `inputs` default to the start node's inputs and `outputs` to
//! the union of the end nodes' outputs.

use crate::agent::{derive_inputs, AGENTIC_COMPONENT};
use crate::llm::LLM_CONFIG;
use crate::property::{no_properties, properties_kind, property_title};
use crate::tool::TOOL;
use agentspec_core::{
    validating_factory, Component, ComponentBuilder, ComponentError, ComponentRef, ComponentShape,
    FieldDescriptor, FieldKind, FieldValue, TypeRegistry, ValidationError,
};
use std::collections::HashSet;

/// Family of every flow node
pub const NODE: &str = "Node";
/// Entry point of a flow
pub const START_NODE: &str = "StartNode";
/// Exit point of a flow
pub const END_NODE: &str = "EndNode";
/// Node prompting an LLM with a template
pub const LLM_NODE: &str = "LlmNode";
/// Node running an agentic component
pub const AGENT_NODE: &str = "AgentNode";
/// Node running a tool
pub const TOOL_NODE: &str = "ToolNode";
/// Transition between two nodes
pub const CONTROL_FLOW_EDGE: &str = "ControlFlowEdge";
/// Wiring of a node output to a node input
pub const DATA_FLOW_EDGE: &str = "DataFlowEdge";
/// Graph of nodes
pub const FLOW: &str = "Flow";

fn node_shape() -> ComponentShape {
    ComponentShape::new().in_family(NODE)
}

fn inputs() -> FieldDescriptor {
    FieldDescriptor::new("inputs", properties_kind()).with_default(no_properties())
}

fn outputs() -> FieldDescriptor {
    FieldDescriptor::new("outputs", properties_kind()).with_default(no_properties())
}

pub(crate) fn register(registry: &mut TypeRegistry) -> Result<(), ComponentError> {
    registry.register(START_NODE, node_shape().with_field(inputs()), validating_factory)?;
    registry.register(END_NODE, node_shape().with_field(outputs()), validating_factory)?;
    registry.register(
        LLM_NODE,
        node_shape()
            .with_field(FieldDescriptor::new("llm_config", FieldKind::component(LLM_CONFIG)))
            .with_field(FieldDescriptor::new("prompt_template", FieldKind::String))
            .with_field(inputs())
            .with_field(outputs()),
        llm_node_factory,
    )?;
    registry.register(
        AGENT_NODE,
        node_shape().with_field(FieldDescriptor::new("agent", FieldKind::component(AGENTIC_COMPONENT))),
        validating_factory,
    )?;
    registry.register(
        TOOL_NODE,
        node_shape().with_field(FieldDescriptor::new("tool", FieldKind::component(TOOL))),
        validating_factory,
    )?;

    registry.register(
        CONTROL_FLOW_EDGE,
        ComponentShape::new()
            .with_field(FieldDescriptor::new("from_node", FieldKind::component(NODE)))
            .with_field(FieldDescriptor::new("from_branch", FieldKind::optional(FieldKind::String)))
            .with_field(FieldDescriptor::new("to_node", FieldKind::component(NODE))),
        validating_factory,
    )?;
    registry.register(
        DATA_FLOW_EDGE,
        ComponentShape::new()
            .with_field(FieldDescriptor::new("source_node", FieldKind::component(NODE)))
            .with_field(FieldDescriptor::new("source_output", FieldKind::String))
            .with_field(FieldDescriptor::new("destination_node", FieldKind::component(NODE)))
            .with_field(FieldDescriptor::new("destination_input", FieldKind::String)),
        validating_factory,
    )?;

    registry.register(
        FLOW,
        ComponentShape::new()
            .in_family(AGENTIC_COMPONENT)
            .with_field(FieldDescriptor::new("start_node", FieldKind::component(START_NODE)))
            .with_field(FieldDescriptor::new("nodes", FieldKind::list(FieldKind::component(NODE))))
            .with_field(FieldDescriptor::new(
                "control_flow_connections",
                FieldKind::list(FieldKind::component(CONTROL_FLOW_EDGE)),
            ))
            .with_field(FieldDescriptor::new(
                "data_flow_connections",
                FieldKind::optional(FieldKind::list(FieldKind::component(DATA_FLOW_EDGE))),
            ))
            .with_field(inputs())
            .with_field(outputs()),
        flow_factory,
    )?;
    Ok(())
}

fn llm_node_factory(builder: ComponentBuilder, registry: &TypeRegistry) -> Result<Component, ComponentError> {
    derive_inputs(builder, "prompt_template").finish(registry)
}

fn flow_factory(mut builder: ComponentBuilder, registry: &TypeRegistry) -> Result<Component, ComponentError> {
    if is_unset(&builder, "inputs") {
        if let Some(inputs) = builder
            .get_field("start_node")
            .and_then(FieldValue::as_component)
            .and_then(|start| start.field("inputs"))
            .cloned()
        {
            builder.set_field("inputs", inputs);
        }
    }
    if is_unset(&builder, "outputs") {
        if let Some(outputs) = end_node_outputs(&builder) {
            builder.set_field("outputs", outputs);
        }
    }

    let flow = builder.finish(registry)?;
    check_flow_structure(&flow)?;
    Ok(flow)
}

fn is_unset(builder: &ComponentBuilder, field: &str) -> bool {
    builder.get_field(field).map_or(true, FieldValue::is_null)
}

// Outputs of every end node, first occurrence of each title wins.
fn end_node_outputs(builder: &ComponentBuilder) -> Option<FieldValue> {
    let nodes = builder.get_field("nodes")?.as_list()?;
    let mut seen = HashSet::new();
    let mut outputs = Vec::new();
    for node in nodes.iter().filter_map(FieldValue::as_component) {
        if node.component_type() != END_NODE {
            continue;
        }
        for output in node.field("outputs").and_then(FieldValue::as_list).unwrap_or_default() {
            let title = property_title(output).map(str::to_string);
            if title.as_ref().map_or(true, |t| seen.insert(t.clone())) {
                outputs.push(output.clone());
            }
        }
    }
    Some(FieldValue::List(outputs))
}

fn components_of<'a>(flow: &'a Component, field: &str) -> impl Iterator<Item = &'a ComponentRef> {
    flow.field(field)
        .and_then(FieldValue::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(FieldValue::as_component)
}

fn check_flow_structure(flow: &Component) -> Result<(), ComponentError> {
    let invalid = |field: &str, reason: String| ComponentError::Validation(ValidationError::new(flow.id(), field, reason));

    let node_ids: HashSet<&str> = components_of(flow, "nodes").map(|n| n.id()).collect();

    if let Some(start) = flow.field("start_node").and_then(FieldValue::as_component) {
        if !node_ids.contains(start.id()) {
            return Err(invalid(
                "start_node",
                format!("start node '{}' is not one of the flow's nodes", start.id()),
            ));
        }
    }

    for edge in components_of(flow, "control_flow_connections") {
        for endpoint in ["from_node", "to_node"] {
            check_endpoint(&node_ids, edge, endpoint)
                .map_err(|reason| invalid("control_flow_connections", reason))?;
        }
    }
    for edge in components_of(flow, "data_flow_connections") {
        for endpoint in ["source_node", "destination_node"] {
            check_endpoint(&node_ids, edge, endpoint)
                .map_err(|reason| invalid("data_flow_connections", reason))?;
        }
    }
    Ok(())
}

fn check_endpoint(node_ids: &HashSet<&str>, edge: &Component, endpoint: &str) -> Result<(), String> {
    match edge.field(endpoint).and_then(FieldValue::as_component) {
        Some(node) if node_ids.contains(node.id()) => Ok(()),
        Some(node) => Err(format!(
            "edge '{}' {} '{}' is not one of the flow's nodes",
            edge.id(),
            endpoint,
            node.id()
        )),
        None => Ok(()),
    }
}

/// Builder for a start node
#[inline]
#[must_use]
pub fn start_node(name: impl Into<String>) -> ComponentBuilder {
    Component::builder(START_NODE, name)
}

/// Builder for an end node
#[inline]
#[must_use]
pub fn end_node(name: impl Into<String>) -> ComponentBuilder {
    Component::builder(END_NODE, name)
}

/// Builder for an LLM node
#[must_use]
pub fn llm_node(
    name: impl Into<String>,
    llm_config: &ComponentRef,
    prompt_template: impl Into<String>,
) -> ComponentBuilder {
    Component::builder(LLM_NODE, name)
        .field("llm_config", llm_config)
        .field("prompt_template", FieldValue::String(prompt_template.into()))
}

/// Builder for an agent node
#[must_use]
pub fn agent_node(name: impl Into<String>, agent: &ComponentRef) -> ComponentBuilder {
    Component::builder(AGENT_NODE, name).field("agent", agent)
}

/// Builder for a tool node
#[must_use]
pub fn tool_node(name: impl Into<String>, tool: &ComponentRef) -> ComponentBuilder {
    Component::builder(TOOL_NODE, name).field("tool", tool)
}

/// Builder for a control-flow edge
#[must_use]
pub fn control_flow_edge(name: impl Into<String>, from: &ComponentRef, to: &ComponentRef) -> ComponentBuilder {
    Component::builder(CONTROL_FLOW_EDGE, name)
        .field("from_node", from)
        .field("to_node", to)
}

/// Builder for a data-flow edge
#[must_use]
pub fn data_flow_edge(
    name: impl Into<String>,
    source: (&ComponentRef, &str),
    destination: (&ComponentRef, &str),
) -> ComponentBuilder {
    Component::builder(DATA_FLOW_EDGE, name)
        .field("source_node", source.0)
        .field("source_output", source.1)
        .field("destination_node", destination.0)
        .field("destination_input", destination.1)
}

/// Builder for a flow
///
/// `start` must also appear in `nodes`.
#[must_use]
pub fn flow(
    name: impl Into<String>,
    start: &ComponentRef,
    nodes: &[ComponentRef],
    control_flow: &[ComponentRef],
) -> ComponentBuilder {
    Component::builder(FLOW, name)
        .field("start_node", start)
        .field("nodes", nodes.iter().map(FieldValue::from).collect::<Vec<_>>())
        .field(
            "control_flow_connections",
            control_flow.iter().map(FieldValue::from).collect::<Vec<_>>(),
        )
}

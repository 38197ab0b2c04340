//! Tools
//!
//! Every tool declares its `inputs` and `outputs` as property lists.
//! `requires_confirmation` only exists from 25.4.2 on and `RemoteTool` from
//! 25.4.0 on.

use crate::property::{no_properties, properties_kind};
use agentspec_core::{
    validating_factory, AgentSpecVersion, Component, ComponentBuilder, ComponentError,
    ComponentShape, FieldDescriptor, FieldKind, FieldValue, TypeRegistry,
};

/// Family of every tool
pub const TOOL: &str = "Tool";
/// Tool executed by the runtime hosting the agent
pub const SERVER_TOOL: &str = "ServerTool";
/// Tool executed by the client driving the conversation
pub const CLIENT_TOOL: &str = "ClientTool";
/// Tool backed by an HTTP endpoint
pub const REMOTE_TOOL: &str = "RemoteTool";

fn tool_shape() -> ComponentShape {
    ComponentShape::new()
        .in_family(TOOL)
        .with_field(FieldDescriptor::new("inputs", properties_kind()).with_default(no_properties()))
        .with_field(FieldDescriptor::new("outputs", properties_kind()).with_default(no_properties()))
        .with_field(
            FieldDescriptor::new("requires_confirmation", FieldKind::Bool)
                .with_default(false)
                .since(AgentSpecVersion::V25_4_2),
        )
}

pub(crate) fn register(registry: &mut TypeRegistry) -> Result<(), ComponentError> {
    registry.register(SERVER_TOOL, tool_shape(), validating_factory)?;
    registry.register(CLIENT_TOOL, tool_shape(), validating_factory)?;
    registry.register(
        REMOTE_TOOL,
        tool_shape()
            .since(AgentSpecVersion::V25_4_0)
            .with_field(FieldDescriptor::new("url", FieldKind::String))
            .with_field(FieldDescriptor::new("http_method", FieldKind::String).with_default("GET"))
            .with_field(
                FieldDescriptor::new("headers", FieldKind::optional(FieldKind::map(FieldKind::String)))
                    .sensitive(),
            )
            .with_field(
                FieldDescriptor::new("query_params", FieldKind::map(FieldKind::Any))
                    .with_default(FieldValue::Map(Default::default())),
            )
            .with_field(
                FieldDescriptor::new("data", FieldKind::map(FieldKind::Any))
                    .with_default(FieldValue::Map(Default::default())),
            ),
        validating_factory,
    )?;
    Ok(())
}

/// Builder for a server tool
#[inline]
#[must_use]
pub fn server_tool(name: impl Into<String>) -> ComponentBuilder {
    Component::builder(SERVER_TOOL, name)
}

/// Builder for a client tool
#[inline]
#[must_use]
pub fn client_tool(name: impl Into<String>) -> ComponentBuilder {
    Component::builder(CLIENT_TOOL, name)
}

/// Builder for a remote tool
#[must_use]
pub fn remote_tool(
    name: impl Into<String>,
    url: impl Into<String>,
    http_method: impl Into<String>,
) -> ComponentBuilder {
    Component::builder(REMOTE_TOOL, name)
        .field("url", FieldValue::String(url.into()))
        .field("http_method", FieldValue::String(http_method.into()))
}

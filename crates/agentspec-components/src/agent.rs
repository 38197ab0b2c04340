//! Agents
//!
//! An [`AGENT`] wraps an LLM configuration, a system prompt and a list of
//! tools. When no `inputs` are given they are derived from the `{{name}}`
//! placeholders of the system prompt, one string property per placeholder.

use crate::llm::LLM_CONFIG;
use crate::property::{no_properties, properties_kind, string_property};
use crate::templating::extract_placeholders;
use crate::tool::TOOL;
use agentspec_core::{
    AgentSpecVersion, Component, ComponentBuilder, ComponentError, ComponentShape, FieldDescriptor,
    FieldKind, FieldValue, TypeRegistry,
};

/// Family of components that can hold a conversation
pub const AGENTIC_COMPONENT: &str = "AgenticComponent";
/// LLM-backed agent
pub const AGENT: &str = "Agent";

pub(crate) fn register(registry: &mut TypeRegistry) -> Result<(), ComponentError> {
    registry.register(
        AGENT,
        ComponentShape::new()
            .in_family(AGENTIC_COMPONENT)
            .with_field(FieldDescriptor::new("llm_config", FieldKind::component(LLM_CONFIG)))
            .with_field(FieldDescriptor::new("system_prompt", FieldKind::String))
            .with_field(
                FieldDescriptor::new("tools", FieldKind::list(FieldKind::component(TOOL)))
                    .with_default(FieldValue::List(Vec::new())),
            )
            .with_field(FieldDescriptor::new("inputs", properties_kind()).with_default(no_properties()))
            .with_field(FieldDescriptor::new("outputs", properties_kind()).with_default(no_properties()))
            .with_field(
                FieldDescriptor::new("human_in_the_loop", FieldKind::Bool)
                    .with_default(true)
                    .since(AgentSpecVersion::V25_4_0),
            ),
        agent_factory,
    )
}

fn agent_factory(builder: ComponentBuilder, registry: &TypeRegistry) -> Result<Component, ComponentError> {
    let builder = derive_inputs(builder, "system_prompt");
    builder.finish(registry)
}

/// Fill `inputs` from the placeholders of a template field
///
/// Explicit inputs are kept as given. A missing or non-string template is
/// left for shape validation to report.
pub(crate) fn derive_inputs(mut builder: ComponentBuilder, template_field: &str) -> ComponentBuilder {
    if builder.get_field("inputs").is_some_and(|inputs| !inputs.is_null()) {
        return builder;
    }
    let Some(template) = builder.get_field(template_field).and_then(FieldValue::as_str) else {
        return builder;
    };
    let inputs: Vec<FieldValue> = extract_placeholders(template)
        .into_iter()
        .map(string_property)
        .collect();
    tracing::debug!(
        "derived {} input(s) for {} from '{}'",
        inputs.len(),
        builder.component_type(),
        template_field
    );
    builder.set_field("inputs", FieldValue::List(inputs));
    builder
}

/// Builder for an agent
#[must_use]
pub fn agent(
    name: impl Into<String>,
    llm_config: &agentspec_core::ComponentRef,
    system_prompt: impl Into<String>,
) -> ComponentBuilder {
    Component::builder(AGENT, name)
        .field("llm_config", llm_config)
        .field("system_prompt", FieldValue::String(system_prompt.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{self, openai_config};
    use crate::property::property_titles;
    use crate::tool::{self, server_tool};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        llm::register(&mut registry).unwrap();
        tool::register(&mut registry).unwrap();
        register(&mut registry).unwrap();
        registry
    }

    #[test]
    fn inputs_follow_prompt_placeholders() {
        let registry = registry();
        let llm = openai_config("gpt", "gpt-4o").build(&registry).unwrap();
        let agent = agent("helper", &llm, "You help {{user}} with {{ topic }}, {{user}}.")
            .build(&registry)
            .unwrap();

        assert_eq!(property_titles(agent.field("inputs")), vec!["user", "topic"]);
        assert_eq!(agent.field("human_in_the_loop"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn explicit_inputs_are_kept() {
        let registry = registry();
        let llm = openai_config("gpt", "gpt-4o").build(&registry).unwrap();
        let agent = agent("helper", &llm, "Hello {{user}}")
            .field("inputs", FieldValue::List(vec![string_property("other")]))
            .build(&registry)
            .unwrap();
        assert_eq!(property_titles(agent.field("inputs")), vec!["other"]);
    }

    #[test]
    fn tools_must_be_tools() {
        let registry = registry();
        let llm = openai_config("gpt", "gpt-4o").build(&registry).unwrap();
        let search = server_tool("search").build(&registry).unwrap();

        assert!(agent("a", &llm, "p")
            .field("tools", FieldValue::List(vec![FieldValue::from(&search)]))
            .build(&registry)
            .is_ok());
        assert!(matches!(
            agent("a", &llm, "p")
                .field("tools", FieldValue::List(vec![FieldValue::from(&llm)]))
                .build(&registry),
            Err(ComponentError::Validation(_))
        ));
    }

    #[test]
    fn llm_config_is_required() {
        let registry = registry();
        let result = Component::builder(AGENT, "a")
            .field("system_prompt", "p")
            .build(&registry);
        assert!(matches!(result, Err(ComponentError::Validation(_))));
    }
}

//! Swarms
//!
//! A [`SWARM`] lets agentic components hand a conversation over to each
//! other. `relationships` lists `[caller, callee]` pairs; members may
//! themselves be swarms or flows.

use crate::agent::AGENTIC_COMPONENT;
use agentspec_core::{
    AgentSpecVersion, Component, ComponentBuilder, ComponentError, ComponentRef, ComponentShape,
    FieldDescriptor, FieldKind, FieldValue, TypeRegistry, ValidationError,
};

/// Group of agentic components that delegate to each other
pub const SWARM: &str = "Swarm";

pub(crate) fn register(registry: &mut TypeRegistry) -> Result<(), ComponentError> {
    registry.register(
        SWARM,
        ComponentShape::new()
            .in_family(AGENTIC_COMPONENT)
            .since(AgentSpecVersion::V25_4_2)
            .with_field(FieldDescriptor::new(
                "first_agent",
                FieldKind::component(AGENTIC_COMPONENT),
            ))
            .with_field(FieldDescriptor::new(
                "relationships",
                FieldKind::list(FieldKind::list(FieldKind::component(AGENTIC_COMPONENT))),
            )),
        swarm_factory,
    )
}

fn swarm_factory(builder: ComponentBuilder, registry: &TypeRegistry) -> Result<Component, ComponentError> {
    let swarm = builder.finish(registry)?;
    let relationships = swarm
        .field("relationships")
        .and_then(FieldValue::as_list)
        .unwrap_or_default();
    for (index, pair) in relationships.iter().enumerate() {
        let len = pair.as_list().map_or(0, <[FieldValue]>::len);
        if len != 2 {
            return Err(ValidationError::new(
                swarm.id(),
                "relationships",
                format!("relationship {index} has {len} members, expected 2"),
            )
            .into());
        }
    }
    Ok(swarm)
}

/// Builder for a swarm
#[must_use]
pub fn swarm(
    name: impl Into<String>,
    first_agent: &ComponentRef,
    relationships: &[(ComponentRef, ComponentRef)],
) -> ComponentBuilder {
    let pairs: Vec<FieldValue> = relationships
        .iter()
        .map(|(caller, callee)| FieldValue::List(vec![caller.into(), callee.into()]))
        .collect();
    Component::builder(SWARM, name)
        .field("first_agent", first_agent)
        .field("relationships", pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{self, agent};
    use crate::llm::{self, openai_config};
    use crate::tool;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        llm::register(&mut registry).unwrap();
        tool::register(&mut registry).unwrap();
        agent::register(&mut registry).unwrap();
        register(&mut registry).unwrap();
        registry
    }

    fn agents(registry: &TypeRegistry) -> (ComponentRef, ComponentRef) {
        let config = openai_config("gpt", "gpt-4o").build(registry).unwrap();
        (
            agent("triage", &config, "Route the request").build(registry).unwrap(),
            agent("billing", &config, "Answer billing questions").build(registry).unwrap(),
        )
    }

    #[test]
    fn swarm_of_agents() {
        let registry = registry();
        let (triage, billing) = agents(&registry);
        let swarm = swarm("support", &triage, &[(triage.clone(), billing.clone())])
            .build(&registry)
            .unwrap();

        let pairs = swarm.field("relationships").and_then(FieldValue::as_list).unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(registry.is_instance_of(SWARM, AGENTIC_COMPONENT));
    }

    #[test]
    fn nested_swarm_is_an_agentic_member() {
        let registry = registry();
        let (triage, billing) = agents(&registry);
        let inner = swarm("inner", &billing, &[]).build(&registry).unwrap();
        assert!(swarm("outer", &triage, &[(triage.clone(), inner)])
            .build(&registry)
            .is_ok());
    }

    #[test]
    fn relationships_are_pairs() {
        let registry = registry();
        let (triage, billing) = agents(&registry);
        let result = Component::builder(SWARM, "s")
            .field("first_agent", &triage)
            .field(
                "relationships",
                FieldValue::List(vec![FieldValue::List(vec![
                    FieldValue::from(&triage),
                    FieldValue::from(&billing),
                    FieldValue::from(&triage),
                ])]),
            )
            .build(&registry);
        assert!(matches!(result, Err(ComponentError::Validation(e)) if e.field.as_deref() == Some("relationships")));
    }
}

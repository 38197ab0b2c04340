use agentspec_components::server_tool;
use agentspec_core::FieldValue;
use agentspec_serialization::{
    AgentSpecDeserializer, AgentSpecSerializer, ConfigurationError, DeserializationError,
    DeserializeOptions, Exported, SerializationError, SerializeOptions,
};
use agentspec_test_utils::{sample_agent, sample_swarm, schema};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn llm_of(agent: &agentspec_core::ComponentRef) -> agentspec_core::ComponentRef {
    Arc::clone(agent.field("llm_config").and_then(FieldValue::as_component).unwrap())
}

#[test]
fn test_disaggregated_component_becomes_marker() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let llm = llm_of(&agent);
    let serializer = AgentSpecSerializer::new(schema);

    let exported = serializer
        .to_dict(&agent, &SerializeOptions::new().disaggregate(&llm))
        .unwrap();
    assert!(matches!(exported, Exported::Single(_)));
    let main = exported.into_main();
    assert_eq!(main["llm_config"], json!({"$component_ref": "llm"}));
}

#[test]
fn test_export_returns_side_table() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let llm = llm_of(&agent);
    let serializer = AgentSpecSerializer::new(schema);

    let options = SerializeOptions::new()
        .disaggregate_as(&llm, "shared_llm")
        .export_disaggregated(true);
    let (main, referenced) = serializer.to_dict(&agent, &options).unwrap().into_parts();
    let referenced = referenced.unwrap();

    assert_eq!(main["llm_config"], json!({"$component_ref": "shared_llm"}));
    let keys: Vec<&str> = referenced.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["$referenced_components", "agentspec_version"]);
    let entry = &referenced["$referenced_components"]["shared_llm"];
    assert_eq!(entry["component_type"], json!("OpenAiCompatibleConfig"));
    assert_eq!(entry["id"], json!("llm"));
    assert!(entry.get("api_key").is_none());
}

#[test]
fn test_split_export_loads_with_components_registry() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let llm = llm_of(&agent);
    let serializer = AgentSpecSerializer::new(Arc::clone(&schema));
    let deserializer = AgentSpecDeserializer::new(schema);

    let options = SerializeOptions::new()
        .disaggregate_as(&llm, "shared_llm")
        .export_disaggregated(true);
    let (main, referenced) = serializer.to_yaml(&agent, &options).unwrap().into_parts();

    // Without the side table the reference dangles.
    assert!(matches!(
        deserializer.from_yaml(&main),
        Err(DeserializationError::DanglingReference(r)) if r == "shared_llm"
    ));

    let components = deserializer
        .load_referenced_components_from_yaml(&referenced.unwrap())
        .unwrap();
    let loaded = deserializer
        .from_yaml_with(&main, &DeserializeOptions::new().with_components(components.clone()))
        .unwrap();
    assert!(Arc::ptr_eq(&llm_of(&loaded), &components["shared_llm"]));
}

#[test]
fn test_caller_supplied_component_is_used_as_is() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let llm = llm_of(&agent);
    let serializer = AgentSpecSerializer::new(Arc::clone(&schema));
    let deserializer = AgentSpecDeserializer::new(schema);

    let main = serializer
        .to_json(&agent, &SerializeOptions::new().disaggregate(&llm))
        .unwrap()
        .into_main();
    let loaded = deserializer
        .from_json_with(&main, &DeserializeOptions::new().with_component("llm", Arc::clone(&llm)))
        .unwrap();

    // The supplied instance keeps its api key.
    assert!(Arc::ptr_eq(&llm_of(&loaded), &llm));
    assert_eq!(*loaded, *agent);
}

#[test]
fn test_root_cannot_be_disaggregated() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let serializer = AgentSpecSerializer::new(schema);

    let err = serializer
        .to_dict(&agent, &SerializeOptions::new().disaggregate(&agent))
        .unwrap_err();
    assert!(matches!(err, SerializationError::RootDisaggregation(id) if id == "assistant"));
}

#[test]
fn test_reference_id_must_be_unique() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let llm = llm_of(&agent);
    let tool = Arc::clone(
        agent.field("tools").and_then(FieldValue::as_list).unwrap()[0]
            .as_component()
            .unwrap(),
    );
    let serializer = AgentSpecSerializer::new(schema);

    let options = SerializeOptions::new()
        .disaggregate_as(&llm, "dep")
        .disaggregate_as(&tool, "dep");
    assert!(matches!(
        serializer.to_dict(&agent, &options),
        Err(SerializationError::DuplicateDisaggregatedId(id)) if id == "dep"
    ));

    // Listing the same component twice under one id is harmless.
    let options = SerializeOptions::new().disaggregate(&llm).disaggregate(&llm);
    assert!(serializer.to_dict(&agent, &options).is_ok());
}

#[test]
fn test_export_without_components_is_rejected() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let serializer = AgentSpecSerializer::new(schema);

    assert!(matches!(
        serializer.to_dict(&agent, &SerializeOptions::new().export_disaggregated(true)),
        Err(SerializationError::Configuration(ConfigurationError::InvalidOption(_)))
    ));
}

#[test]
fn test_unreachable_component_is_still_exported() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let stray = server_tool("stray").id("stray").build(schema.registry()).unwrap();
    let serializer = AgentSpecSerializer::new(schema);

    let options = SerializeOptions::new().disaggregate(&stray).export_disaggregated(true);
    let (_, referenced) = serializer.to_dict(&agent, &options).unwrap().into_parts();
    assert!(referenced.unwrap()["$referenced_components"].get("stray").is_some());
}

#[test]
fn test_swarm_members_disaggregated() {
    let schema = schema();
    let swarm = sample_swarm(&schema);
    let first = Arc::clone(swarm.field("first_agent").and_then(FieldValue::as_component).unwrap());
    let serializer = AgentSpecSerializer::new(Arc::clone(&schema));
    let deserializer = AgentSpecDeserializer::new(schema);

    let options = SerializeOptions::new().disaggregate(&first).export_disaggregated(true);
    let (main, referenced) = serializer.to_json(&swarm, &options).unwrap().into_parts();
    assert_eq!(main.matches(r#"{"$component_ref":"triage"}"#).count(), 3);

    let components = deserializer
        .load_referenced_components_from_json(&referenced.unwrap())
        .unwrap();
    let loaded = deserializer
        .from_json_with(&main, &DeserializeOptions::new().with_components(components))
        .unwrap();
    let pairs = loaded.field("relationships").and_then(FieldValue::as_list).unwrap();
    let callee = pairs[1].as_list().unwrap()[1].as_component().unwrap();
    assert!(Arc::ptr_eq(
        callee,
        loaded.field("first_agent").and_then(FieldValue::as_component).unwrap()
    ));
}

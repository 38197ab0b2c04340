use agentspec_components::remote_tool;
use agentspec_core::{AgentSpecVersion, FieldCasing, FieldValue};
use agentspec_serialization::{
    AgentSpecDeserializer, AgentSpecSerializer, ConfigurationError, SerializationError,
    SerializeOptions,
};
use agentspec_test_utils::{sample_agent, sample_tool, schema, SAMPLE_API_KEY};
use serde_json::{json, Value};
use std::sync::Arc;

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.contains(needle),
        Value::Array(items) => items.iter().any(|v| contains_text(v, needle)),
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| k.contains(needle) || contains_text(v, needle)),
        _ => false,
    }
}

#[test]
fn test_api_key_never_written() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let serializer = AgentSpecSerializer::new(schema);

    for version in [
        AgentSpecVersion::V25_3_0,
        AgentSpecVersion::V25_4_0,
        AgentSpecVersion::V25_4_2,
        AgentSpecVersion::V26_1_0,
    ] {
        for casing in [FieldCasing::SnakeCase, FieldCasing::CamelCase] {
            let options = SerializeOptions::new().with_version(version).with_casing(casing);
            let dict = serializer.to_dict(&agent, &options).unwrap().into_main();
            let document = Value::Object(dict);
            assert!(!contains_text(&document, SAMPLE_API_KEY), "{version} {casing:?}");
            assert!(!contains_text(&document, "api_key"));
            assert!(!contains_text(&document, "apiKey"));
        }
    }
}

#[test]
fn test_gated_field_hidden_before_its_version() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let serializer = AgentSpecSerializer::new(schema);

    let old = serializer
        .to_dict(&agent, &SerializeOptions::new().with_version(AgentSpecVersion::V25_3_0))
        .unwrap()
        .into_main();
    assert!(old.get("human_in_the_loop").is_none());
    assert_eq!(old["air_version"], json!("25.3.0"));
    assert!(old.get("agentspec_version").is_none());

    let new = serializer
        .to_dict(&agent, &SerializeOptions::new().with_version(AgentSpecVersion::V25_4_0))
        .unwrap()
        .into_main();
    assert_eq!(new["human_in_the_loop"], json!(true));
    assert_eq!(new["agentspec_version"], json!("25.4.0"));
    // requires_confirmation only appears from 25.4.2
    let tool = &new["tools"][0];
    assert!(tool.get("requires_confirmation").is_none());
}

#[test]
fn test_old_document_loads_with_defaults() {
    let schema = schema();
    let agent = sample_agent(&schema);
    let serializer = AgentSpecSerializer::new(Arc::clone(&schema));
    let deserializer = AgentSpecDeserializer::new(schema);

    let json = serializer
        .to_json(&agent, &SerializeOptions::new().with_version(AgentSpecVersion::V25_3_1))
        .unwrap()
        .into_main();
    assert!(json.contains(r#""air_version":"25.3.1""#));

    let loaded = deserializer.from_json(&json).unwrap();
    assert_eq!(loaded.field("human_in_the_loop"), Some(&FieldValue::Bool(true)));
}

#[test]
fn test_newer_type_rejected_for_old_target() {
    let schema = schema();
    let tool = remote_tool("weather", "https://example.com/weather", "GET")
        .build(schema.registry())
        .unwrap();
    let serializer = AgentSpecSerializer::new(schema);

    let err = serializer
        .to_dict(&tool, &SerializeOptions::new().with_version(AgentSpecVersion::V25_3_1))
        .unwrap_err();
    assert!(matches!(
        err,
        SerializationError::UnsupportedVersion { ref component_type, .. } if component_type == "RemoteTool"
    ));
    assert!(serializer
        .to_dict(&tool, &SerializeOptions::new().with_version(AgentSpecVersion::V25_4_0))
        .is_ok());
}

#[test]
fn test_unknown_target_version_is_a_configuration_error() {
    let schema = schema();
    let tool = sample_tool(&schema);
    let serializer = AgentSpecSerializer::new(schema);

    let err = serializer
        .to_dict(&tool, &SerializeOptions::new().with_version(AgentSpecVersion::new(24, 1, 0)))
        .unwrap_err();
    assert!(matches!(
        err,
        SerializationError::Configuration(ConfigurationError::InvalidOption(_))
    ));
}

#[test]
fn test_remote_tool_headers_are_sensitive() {
    let schema = schema();
    let tool = remote_tool("weather", "https://example.com/weather", "GET")
        .field(
            "headers",
            [("Authorization", "Bearer secret")].into_iter().collect::<FieldValue>(),
        )
        .build(schema.registry())
        .unwrap();
    let serializer = AgentSpecSerializer::new(Arc::clone(&schema));
    let deserializer = AgentSpecDeserializer::new(schema);

    let dict = serializer.to_dict(&tool, &SerializeOptions::new()).unwrap().into_main();
    assert!(dict.get("headers").is_none());
    let loaded = deserializer.from_dict(&dict).unwrap();
    assert_eq!(loaded.field("headers"), Some(&FieldValue::Null));
}

use agentspec_core::{camel_to_snake, snake_to_camel, FieldValue};
use agentspec_serialization::{AgentSpecDeserializer, AgentSpecSerializer, SerializeOptions};
use agentspec_test_utils::{sample_agent, sample_cache, schema_with_cache};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_camel_case_document() {
    let schema = schema_with_cache();
    let cache = sample_cache(&schema);
    let serializer = AgentSpecSerializer::new(schema);

    let dict = serializer
        .to_dict(&cache, &SerializeOptions::new().camel_case())
        .unwrap()
        .into_main();
    assert_eq!(
        serde_json::Value::Object(dict),
        json!({
            "component_type": "CacheConfig",
            "id": "cache",
            "name": "cache",
            "metadata": {},
            "maxCacheSize": 128,
            "evictionPolicy": "lru",
            "labels": {"teamName": "core"},
            "agentspec_version": "26.1.0"
        })
    );
}

#[test]
fn test_snake_case_document() {
    let schema = schema_with_cache();
    let cache = sample_cache(&schema);
    let serializer = AgentSpecSerializer::new(schema);

    let dict = serializer.to_dict(&cache, &SerializeOptions::new()).unwrap().into_main();
    assert_eq!(dict["max_cache_size"], json!(128));
    assert_eq!(dict["eviction_policy"], json!("lru"));
    assert_eq!(dict["labels"], json!({"teamName": "core"}));
}

#[test]
fn test_camel_case_round_trip() {
    let schema = schema_with_cache();
    let cache = sample_cache(&schema);
    let serializer = AgentSpecSerializer::new(Arc::clone(&schema));
    let deserializer = AgentSpecDeserializer::new(schema);

    let json = serializer
        .to_json(&cache, &SerializeOptions::new().camel_case())
        .unwrap()
        .into_main();
    let loaded = deserializer.from_json(&json).unwrap();
    assert_eq!(*loaded, *cache);
    assert_eq!(loaded.field("max_cache_size"), Some(&FieldValue::Integer(128)));
}

#[test]
fn test_model_object_keys_follow_casing() {
    let schema = schema_with_cache();
    let agent = sample_agent(&schema);
    let serializer = AgentSpecSerializer::new(Arc::clone(&schema));
    let deserializer = AgentSpecDeserializer::new(schema);

    let dict = serializer
        .to_dict(&agent, &SerializeOptions::new().camel_case())
        .unwrap()
        .into_main();
    assert!(dict.contains_key("systemPrompt"));
    assert!(!dict.contains_key("system_prompt"));
    assert_eq!(
        dict["llmConfig"]["defaultGenerationParameters"],
        json!({"maxTokens": 512, "temperature": 0.5})
    );
    // Property maps are user data and keep their keys.
    assert_eq!(dict["inputs"], json!([{"title": "x", "type": "string"}]));

    let loaded = deserializer.from_dict(&dict).unwrap();
    let llm = loaded.field("llm_config").and_then(FieldValue::as_component).unwrap();
    let params = llm.field("default_generation_parameters").and_then(FieldValue::as_object).unwrap();
    assert_eq!(params.get("max_tokens"), Some(&FieldValue::Integer(512)));
}

proptest! {
    #[test]
    fn prop_snake_names_survive_camel_round_trip(name in "[a-z]{1,8}(_[a-z]{2,8}){0,3}") {
        prop_assert_eq!(camel_to_snake(&snake_to_camel(&name)), name);
    }
}

//! Builtin Agent Spec component types
//!
//! Registers the standard component families into a shared schema:
//!
//! - **LlmConfig**: OpenAI, OpenAI-compatible, vLLM and Ollama endpoints
//! - **Tool**: server, client and remote (HTTP) tools
//! - **AgenticComponent**: agents, flows and swarms
//! - **Node**: flow nodes, linked by control-flow and data-flow edges
//!
//! # Example
//!
//! ```rust
//! use agentspec_components::prelude::*;
//!
//! let schema = builtin_schema().unwrap();
//! let llm = openai_config("gpt", "gpt-4o").build(schema.registry()).unwrap();
//! let agent = agent("helper", &llm, "Help {{user}}").build(schema.registry()).unwrap();
//! assert_eq!(property_titles(agent.field("inputs")), vec!["user"]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod agent;
pub mod flow;
pub mod llm;
pub mod property;
pub mod schema;
pub mod swarm;
pub mod templating;
pub mod tool;

pub use agent::{agent, AGENT, AGENTIC_COMPONENT};
pub use flow::{
    agent_node, control_flow_edge, data_flow_edge, end_node, flow, llm_node, start_node, tool_node,
    AGENT_NODE, CONTROL_FLOW_EDGE, DATA_FLOW_EDGE, END_NODE, FLOW, LLM_NODE, NODE, START_NODE,
    TOOL_NODE,
};
pub use llm::{
    ollama_config, openai_compatible_config, openai_config, vllm_config, GenerationParameters,
    LLM_CONFIG, OLLAMA_CONFIG, OPENAI_COMPATIBLE_CONFIG, OPENAI_CONFIG, VLLM_CONFIG,
};
pub use property::{property, property_title, property_titles, string_property, PropertyType};
pub use schema::{builtin_registry, builtin_schema, schema_builder, SchemaBuilder};
pub use swarm::{swarm, SWARM};
pub use templating::extract_placeholders;
pub use tool::{client_tool, remote_tool, server_tool, CLIENT_TOOL, REMOTE_TOOL, SERVER_TOOL, TOOL};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Builders, the builtin schema and property helpers
    pub use crate::agent::agent;
    pub use crate::flow::{
        agent_node, control_flow_edge, data_flow_edge, end_node, flow, llm_node, start_node,
        tool_node,
    };
    pub use crate::llm::{ollama_config, openai_compatible_config, openai_config, vllm_config};
    pub use crate::property::{property, property_titles, string_property, PropertyType};
    pub use crate::schema::{builtin_schema, schema_builder};
    pub use crate::swarm::swarm;
    pub use crate::tool::{client_tool, remote_tool, server_tool};
    pub use agentspec_core::prelude::*;
}

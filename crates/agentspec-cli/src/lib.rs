//! Agent Spec command-line operations
//!
//! - **convert**: re-emit a document in another encoding, casing or version
//! - **inspect**: summarize a document's component graph
//!
//! Both load documents with a caller-provided schema, normally the builtin
//! one.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use agentspec_core::{AgentSpecSchema, AgentSpecVersion, ComponentRef, FieldCasing};
use agentspec_serialization::{
    compute_referencing_structure, AgentSpecDeserializer, AgentSpecSerializer, SerializeOptions,
};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Document encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// JSON text
    #[default]
    Json,
    /// YAML text
    Yaml,
}

impl Format {
    /// Guess the encoding from a file extension, defaulting to JSON
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => bail!("unknown format '{other}', expected json or yaml"),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Options of the `convert` command
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Input encoding
    pub from: Format,
    /// Output encoding
    pub to: Format,
    /// Target version; latest when unset
    pub version: Option<AgentSpecVersion>,
    /// Output field casing
    pub casing: FieldCasing,
    /// JSON indentation
    pub indent: Option<usize>,
}

/// Load the root component of a document
///
/// # Errors
/// Returns error if the text is not a valid document for `schema`
pub fn load(text: &str, format: Format, schema: Arc<AgentSpecSchema>) -> Result<ComponentRef> {
    let deserializer = AgentSpecDeserializer::new(schema);
    let component = match format {
        Format::Json => deserializer.from_json(text),
        Format::Yaml => deserializer.from_yaml(text),
    }
    .with_context(|| format!("failed to load {format} document"))?;
    Ok(component)
}

/// Re-emit a document
///
/// # Errors
/// Returns error if the input cannot be loaded or the graph cannot be
/// written at the requested version
pub fn convert(text: &str, options: &ConvertOptions, schema: Arc<AgentSpecSchema>) -> Result<String> {
    let component = load(text, options.from, Arc::clone(&schema))?;

    let mut serialize = SerializeOptions::new().with_casing(options.casing);
    if let Some(version) = options.version {
        serialize = serialize.with_version(version);
    }
    if let Some(indent) = options.indent {
        serialize = serialize.with_indent(indent);
    }

    let serializer = AgentSpecSerializer::new(schema);
    let output = match options.to {
        Format::Json => serializer.to_json(&component, &serialize),
        Format::Yaml => serializer.to_yaml(&component, &serialize),
    }
    .with_context(|| format!("failed to write {} document", options.to))?;
    Ok(output.into_main())
}

/// Summary of a component graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Root component id
    pub root_id: String,
    /// Root component type
    pub root_type: String,
    /// Number of distinct components
    pub component_count: usize,
    /// Distinct components per type
    pub per_type: BTreeMap<String, usize>,
    /// Ids of components with more than one parent
    pub shared: Vec<String>,
    /// Ids ordered children first
    pub order: Vec<String>,
}

/// Summarize a loaded graph
#[must_use]
pub fn inspect(root: &ComponentRef) -> Inspection {
    let structure = compute_referencing_structure(root);
    let mut per_type = BTreeMap::new();
    for component in structure.components() {
        *per_type.entry(component.component_type().to_string()).or_insert(0) += 1;
    }
    Inspection {
        root_id: root.id().to_string(),
        root_type: root.component_type().to_string(),
        component_count: structure.len(),
        per_type,
        shared: structure.shared_components().map(String::from).collect(),
        order: structure
            .children_first_order()
            .into_iter()
            .map(|c| c.id().to_string())
            .collect(),
    }
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "root: {} ({})", self.root_id, self.root_type)?;
        writeln!(f, "components: {}", self.component_count)?;
        for (component_type, count) in &self.per_type {
            writeln!(f, "  {component_type}: {count}")?;
        }
        if self.shared.is_empty() {
            writeln!(f, "shared: none")?;
        } else {
            writeln!(f, "shared: {}", self.shared.join(", "))?;
        }
        write!(f, "order: {}", self.order.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("yml".parse::<Format>().unwrap(), Format::Yaml);
        assert!("toml".parse::<Format>().is_err());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("agent.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("agent.YML")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("agent.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("agent")), Format::Json);
    }
}

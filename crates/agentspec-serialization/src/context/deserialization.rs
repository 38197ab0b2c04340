use super::{COMPONENT_REF_KEY, COMPONENT_TYPE_KEY, REFERENCED_COMPONENTS_KEY};
use crate::error::{DeserializationError, DeserializationResult};
use crate::plugin::{ComponentDeserializationPlugin, PluginRegistry, SerializedDict};
use agentspec_core::version::{LEGACY_VERSION_FIELD, VERSION_FIELD};
use agentspec_core::{
    camel_to_snake, AgentSpecSchema, AgentSpecVersion, Component, ComponentBuilder, ComponentRef,
    FieldKind, FieldValue, ModelObject, ObjectShape, ValidationError,
};
use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// State of one deserialization call
///
/// References resolve in order: already loaded, caller-provided components,
/// then the `$referenced_components` side table. Components are cached by
/// reference id and by component id, so a component that appears several
/// times in a document is rebuilt once and shared.
pub struct DeserializationContext<'a> {
    schema: &'a AgentSpecSchema,
    plugins: &'a PluginRegistry<dyn ComponentDeserializationPlugin>,
    version: AgentSpecVersion,
    components_registry: &'a IndexMap<String, ComponentRef>,
    side_table: IndexMap<String, Value>,
    references: HashMap<String, ComponentRef>,
    instances: HashMap<String, ComponentRef>,
    resolving: Vec<String>,
}

impl<'a> DeserializationContext<'a> {
    /// Create context for one call
    #[must_use]
    pub fn new(
        schema: &'a AgentSpecSchema,
        plugins: &'a PluginRegistry<dyn ComponentDeserializationPlugin>,
        version: AgentSpecVersion,
        components_registry: &'a IndexMap<String, ComponentRef>,
    ) -> Self {
        Self {
            schema,
            plugins,
            version,
            components_registry,
            side_table: IndexMap::new(),
            references: HashMap::new(),
            instances: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    /// Schema in use
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &AgentSpecSchema {
        self.schema
    }

    /// Version declared by the document
    #[inline]
    #[must_use]
    pub fn version(&self) -> AgentSpecVersion {
        self.version
    }

    /// Number of distinct components built so far
    #[inline]
    #[must_use]
    pub fn loaded_components(&self) -> usize {
        self.instances.len()
    }

    /// Add entries of a `$referenced_components` table
    ///
    /// Entries already known keep their first definition.
    ///
    /// # Errors
    /// Returns [`DeserializationError::CyclicReference`] if the table's
    /// references form a cycle
    pub fn add_referenced_components(&mut self, table: &SerializedDict) -> DeserializationResult<()> {
        for (reference, dict) in table {
            self.side_table
                .entry(reference.clone())
                .or_insert_with(|| dict.clone());
        }
        self.check_side_table_acyclic()
    }

    /// Reference ids present in the side table
    pub fn referenced_ids(&self) -> impl Iterator<Item = &str> {
        self.side_table.keys().map(String::as_str)
    }

    fn check_side_table_acyclic(&self) -> DeserializationResult<()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (reference, dict) in &self.side_table {
            graph.add_node(reference.as_str());
            let mut targets = Vec::new();
            collect_markers(dict, &mut targets);
            for target in targets {
                if let Some((known, _)) = self.side_table.get_key_value(target) {
                    graph.add_edge(reference.as_str(), known.as_str(), ());
                }
            }
        }

        match toposort(&graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(DeserializationError::CyclicReference(cycle_path(
                &graph,
                cycle.node_id(),
            ))),
        }
    }

    /// Load a component from a dict, a reference marker or a bare reference id
    ///
    /// # Errors
    /// Returns error for unknown types, dangling or cyclic references and
    /// invalid fields
    pub fn load_component(&mut self, value: &Value) -> DeserializationResult<ComponentRef> {
        match value {
            Value::Object(dict) => self.load_component_dict(dict),
            Value::String(reference) => self.resolve_reference(reference),
            other => Err(DeserializationError::malformed(format!(
                "expected a component, found {}",
                json_kind(other)
            ))),
        }
    }

    /// Load a component from a component dict or a reference marker
    ///
    /// # Errors
    /// Returns error for unknown types, dangling or cyclic references and
    /// invalid fields
    pub fn load_component_dict(&mut self, dict: &SerializedDict) -> DeserializationResult<ComponentRef> {
        if let Some(reference) = dict.get(COMPONENT_REF_KEY) {
            let reference = reference.as_str().ok_or_else(|| {
                DeserializationError::malformed("component reference must be a string id")
            })?;
            return self.resolve_reference(reference);
        }

        match dict.get(REFERENCED_COMPONENTS_KEY) {
            Some(Value::Object(table)) => self.add_referenced_components(table)?,
            Some(_) => {
                return Err(DeserializationError::malformed(format!(
                    "'{REFERENCED_COMPONENTS_KEY}' must be an object"
                )))
            }
            None => {}
        }

        let component_type = component_type_of(dict)?;
        if let Some(existing) = dict
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| self.instances.get(id))
        {
            return Ok(Arc::clone(existing));
        }

        let plugins = self.plugins;
        let plugin = plugins
            .dispatch(component_type)
            .ok_or_else(|| DeserializationError::UnknownComponentType(component_type.to_string()))?;
        tracing::debug!(
            "deserializing {} with plugin {}",
            component_type,
            plugin.plugin_name()
        );

        let component = Arc::new(plugin.deserialize(dict, self)?);
        self.instances
            .entry(component.id().to_string())
            .or_insert_with(|| Arc::clone(&component));
        Ok(component)
    }

    /// Resolve a reference id
    ///
    /// # Errors
    /// - [`DeserializationError::DanglingReference`] if no table holds the id
    /// - [`DeserializationError::CyclicReference`] if the id is re-entered
    ///   while it is being resolved
    pub fn resolve_reference(&mut self, reference: &str) -> DeserializationResult<ComponentRef> {
        if let Some(component) = self.references.get(reference) {
            return Ok(Arc::clone(component));
        }

        if let Some(component) = self.components_registry.get(reference) {
            let component = Arc::clone(component);
            self.remember(reference, &component);
            return Ok(component);
        }

        if let Some(start) = self.resolving.iter().position(|r| r == reference) {
            let mut path = self.resolving[start..].to_vec();
            path.push(reference.to_string());
            return Err(DeserializationError::CyclicReference(path));
        }

        let value = self
            .side_table
            .get(reference)
            .cloned()
            .ok_or_else(|| DeserializationError::DanglingReference(reference.to_string()))?;

        self.resolving.push(reference.to_string());
        let result = self.load_component(&value);
        self.resolving.pop();

        let component = result?;
        self.remember(reference, &component);
        Ok(component)
    }

    fn remember(&mut self, reference: &str, component: &ComponentRef) {
        self.references
            .insert(reference.to_string(), Arc::clone(component));
        self.instances
            .entry(component.id().to_string())
            .or_insert_with(|| Arc::clone(component));
    }

    /// Load a field value guided by its declared kind
    ///
    /// Values that do not match the kind are loaded generically and left for
    /// shape validation to reject with the component and field named. Only
    /// component and untyped positions treat `component_type` or
    /// `$component_ref` keys as markers.
    ///
    /// # Errors
    /// Returns error if a nested component cannot be loaded
    pub fn load_field(&mut self, value: &Value, kind: &FieldKind) -> DeserializationResult<FieldValue> {
        match (kind, value) {
            (FieldKind::Optional(_), Value::Null) => Ok(FieldValue::Null),
            (FieldKind::Optional(inner), _) => self.load_field(value, inner),
            (FieldKind::Component(_), Value::Object(_) | Value::String(_)) => {
                self.load_component(value).map(FieldValue::Component)
            }
            (FieldKind::List(inner), Value::Array(items)) => items
                .iter()
                .map(|item| self.load_field(item, inner))
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            (FieldKind::Map(inner), Value::Object(map)) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, item) in map {
                    out.insert(key.clone(), self.load_field(item, inner)?);
                }
                Ok(FieldValue::Map(out))
            }
            (FieldKind::Object(shape), Value::Object(map)) => {
                self.load_model_object(map, Some(shape)).map(FieldValue::Object)
            }
            _ => self.load_value(value),
        }
    }

    /// Load a value without a declared kind
    ///
    /// Objects carrying a discriminator or reference marker become
    /// components; other objects become maps with verbatim keys.
    ///
    /// # Errors
    /// Returns error if a nested component cannot be loaded
    pub fn load_value(&mut self, value: &Value) -> DeserializationResult<FieldValue> {
        Ok(match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => FieldValue::Integer(i),
                (None, Some(f)) => FieldValue::Float(f),
                (None, None) => {
                    return Err(DeserializationError::malformed(format!("unsupported number {n}")))
                }
            },
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Array(items) => FieldValue::List(
                items
                    .iter()
                    .map(|item| self.load_value(item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) if is_component_dict(map) => {
                FieldValue::Component(self.load_component(value)?)
            }
            Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, item) in map {
                    out.insert(key.clone(), self.load_value(item)?);
                }
                FieldValue::Map(out)
            }
        })
    }

    /// Load a model object, converting keys to canonical names
    ///
    /// # Errors
    /// Returns error if a nested component cannot be loaded
    pub fn load_model_object(
        &mut self,
        map: &SerializedDict,
        shape: Option<&ObjectShape>,
    ) -> DeserializationResult<ModelObject> {
        let mut object = ModelObject::new();
        for (key, item) in map {
            let canonical = camel_to_snake(key);
            let value = match shape.and_then(|s| s.field(&canonical)) {
                Some(kind) => self.load_field(item, kind)?,
                None => self.load_value(item)?,
            };
            object.insert(canonical, value);
        }
        Ok(object)
    }

    /// Rebuild a component from its registered field table
    ///
    /// Accepts snake_case and camelCase keys. Unknown fields are rejected;
    /// absent fields take their declared defaults.
    ///
    /// # Errors
    /// Returns error for unknown types, unknown or ill-typed fields and
    /// unresolvable nested components
    pub fn deserialize_component_fields(
        &mut self,
        dict: &SerializedDict,
    ) -> DeserializationResult<Component> {
        let schema = self.schema;
        let component_type = component_type_of(dict)?;
        let registered = schema
            .registry()
            .lookup(component_type)
            .ok_or_else(|| DeserializationError::UnknownComponentType(component_type.to_string()))?;

        let id = match dict.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(other) => {
                return Err(ValidationError::new(
                    "<unknown>",
                    "id",
                    format!("expected string, found {}", json_kind(other)),
                )
                .into())
            }
        };
        let label = id.clone().unwrap_or_else(|| "<unknown>".to_string());

        let name = match dict.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(ValidationError::new(
                    label,
                    "name",
                    format!("expected string, found {}", json_kind(other)),
                )
                .into())
            }
            None => return Err(ValidationError::new(label, "name", "missing required field").into()),
        };

        let mut builder = ComponentBuilder::new(component_type, name);
        if let Some(id) = id {
            builder = builder.id(id);
        }

        for (key, value) in dict {
            if matches!(
                key.as_str(),
                COMPONENT_TYPE_KEY | REFERENCED_COMPONENTS_KEY | VERSION_FIELD | LEGACY_VERSION_FIELD | "id" | "name"
            ) {
                continue;
            }

            let canonical = camel_to_snake(key);
            match (canonical.as_str(), value) {
                ("description" | "metadata", Value::Null) => continue,
                ("description", Value::String(description)) => {
                    builder = builder.description(description.clone());
                    continue;
                }
                ("metadata", Value::Object(entries)) => {
                    for (entry, item) in entries {
                        let item = self.load_value(item)?;
                        builder = builder.metadata(entry.clone(), item);
                    }
                    continue;
                }
                ("description" | "metadata", other) => {
                    return Err(ValidationError::new(
                        label.as_str(),
                        canonical.as_str(),
                        format!("unexpected {}", json_kind(other)),
                    )
                    .into())
                }
                _ => {}
            }

            let descriptor = registered.shape().field(&canonical).ok_or_else(|| {
                ValidationError::new(
                    label.as_str(),
                    canonical.as_str(),
                    format!("unknown field for component type '{component_type}'"),
                )
            })?;
            let loaded = self.load_field(value, descriptor.kind())?;
            builder.set_field(canonical, loaded);
        }

        let factory = registered.factory();
        factory(builder, schema.registry()).map_err(Into::into)
    }
}

impl std::fmt::Debug for DeserializationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeserializationContext")
            .field("version", &self.version)
            .field("side_table", &self.side_table.len())
            .field("loaded", &self.instances.len())
            .field("resolving", &self.resolving)
            .finish_non_exhaustive()
    }
}

/// Discriminator of a component dict
fn component_type_of(dict: &SerializedDict) -> DeserializationResult<&str> {
    match dict.get(COMPONENT_TYPE_KEY) {
        Some(Value::String(component_type)) => Ok(component_type),
        Some(_) => Err(DeserializationError::malformed(format!(
            "'{COMPONENT_TYPE_KEY}' must be a string"
        ))),
        None => Err(DeserializationError::malformed(format!(
            "component is missing '{COMPONENT_TYPE_KEY}'"
        ))),
    }
}

fn is_component_dict(map: &SerializedDict) -> bool {
    map.contains_key(COMPONENT_TYPE_KEY) || map.contains_key(COMPONENT_REF_KEY)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Reference ids named by markers anywhere under `value`
///
/// Markers are single-key objects; larger maps holding the key are user data.
fn collect_markers<'v>(value: &'v Value, out: &mut Vec<&'v str>) {
    match value {
        Value::Object(map) => {
            if let (1, Some(Value::String(reference))) = (map.len(), map.get(COMPONENT_REF_KEY)) {
                out.push(reference);
            }
            for item in map.values() {
                collect_markers(item, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_markers(item, out);
            }
        }
        _ => {}
    }
}

/// Path from `start` around a cycle back to `start`
fn cycle_path(graph: &DiGraphMap<&str, ()>, start: &str) -> Vec<String> {
    fn walk<'g>(
        graph: &DiGraphMap<&'g str, ()>,
        node: &'g str,
        start: &str,
        path: &mut Vec<&'g str>,
        visited: &mut HashSet<&'g str>,
    ) -> bool {
        for next in graph.neighbors(node) {
            if next == start {
                return true;
            }
            if visited.insert(next) {
                path.push(next);
                if walk(graph, next, start, path, visited) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }

    let Some(first) = graph.nodes().find(|n| *n == start) else {
        return vec![start.to_string()];
    };
    let mut path = vec![first];
    let mut visited = HashSet::from([first]);
    walk(graph, first, start, &mut path, &mut visited);
    path.push(first);
    path.into_iter().map(str::to_string).collect()
}

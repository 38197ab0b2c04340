//! Per-type field tables
//!
//! Each registered component type declares a [`ComponentShape`]: the ordered
//! list of its fields with their kinds, defaults, sensitivity and the format
//! version that introduced them. Shapes are built once at registration and
//! drive validation, serialization and deserialization.

use crate::casing::camel_to_snake;
use crate::registry::TypeRegistry;
use crate::value::FieldValue;
use crate::version::AgentSpecVersion;

/// Constraint on the type of a nested component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentConstraint {
    /// Any registered component type
    Any,

    /// A type with this name or declaring this family
    Family(String),
}

impl ComponentConstraint {
    fn accepts(&self, component_type: &str, registry: &TypeRegistry) -> bool {
        match self {
            Self::Any => registry.contains(component_type),
            Self::Family(family) => registry.is_instance_of(component_type, family),
        }
    }
}

/// Declared kind of a field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Any value
    Any,
    /// Boolean
    Bool,
    /// Integer
    Integer,
    /// Float (integers accepted)
    Float,
    /// String
    String,
    /// Nested component
    Component(ComponentConstraint),
    /// Sequence of values
    List(Box<FieldKind>),
    /// String-keyed user map; keys are kept verbatim
    Map(Box<FieldKind>),
    /// Structured model object; keys are field names
    Object(ObjectShape),
    /// Nullable value
    Optional(Box<FieldKind>),
}

impl FieldKind {
    /// Nullable wrapper
    #[inline]
    #[must_use]
    pub fn optional(inner: FieldKind) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// List of `inner`
    #[inline]
    #[must_use]
    pub fn list(inner: FieldKind) -> Self {
        Self::List(Box::new(inner))
    }

    /// Map with `inner` values
    #[inline]
    #[must_use]
    pub fn map(inner: FieldKind) -> Self {
        Self::Map(Box::new(inner))
    }

    /// Component belonging to `family`
    #[inline]
    #[must_use]
    pub fn component(family: impl Into<String>) -> Self {
        Self::Component(ComponentConstraint::Family(family.into()))
    }

    /// Component of any type
    #[inline]
    #[must_use]
    pub fn any_component() -> Self {
        Self::Component(ComponentConstraint::Any)
    }

    /// Check whether `null` is acceptable
    #[inline]
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Any)
    }

    /// Short description for error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Any => "any".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Float => "float".to_string(),
            Self::String => "string".to_string(),
            Self::Component(ComponentConstraint::Any) => "component".to_string(),
            Self::Component(ComponentConstraint::Family(f)) => format!("component of family '{f}'"),
            Self::List(inner) => format!("list of {}", inner.describe()),
            Self::Map(inner) => format!("map of {}", inner.describe()),
            Self::Object(_) => "object".to_string(),
            Self::Optional(inner) => format!("optional {}", inner.describe()),
        }
    }

    /// Check that `value` conforms to this kind
    ///
    /// # Errors
    /// Returns a human-readable reason on mismatch
    pub fn check(&self, value: &FieldValue, registry: &TypeRegistry) -> Result<(), String> {
        let mismatch = || format!("expected {}, found {}", self.describe(), value.kind_name());

        match (self, value) {
            (Self::Any, _) if value.contains_object() => {
                Err("model objects are only allowed in object fields".to_string())
            }
            (Self::Any, _)
            | (Self::Optional(_), FieldValue::Null)
            | (Self::Bool, FieldValue::Bool(_))
            | (Self::Integer, FieldValue::Integer(_))
            | (Self::Float, FieldValue::Float(_) | FieldValue::Integer(_))
            | (Self::String, FieldValue::String(_)) => Ok(()),
            (Self::Optional(inner), _) => inner.check(value, registry),
            (Self::Component(constraint), FieldValue::Component(component)) => {
                if constraint.accepts(component.component_type(), registry) {
                    Ok(())
                } else {
                    Err(format!(
                        "{} is not a {}",
                        component.component_type(),
                        self.describe()
                    ))
                }
            }
            (Self::List(inner), FieldValue::List(items)) => {
                for (index, item) in items.iter().enumerate() {
                    inner
                        .check(item, registry)
                        .map_err(|reason| format!("item {index}: {reason}"))?;
                }
                Ok(())
            }
            (Self::Map(inner), FieldValue::Map(map)) => {
                for (key, item) in map {
                    inner
                        .check(item, registry)
                        .map_err(|reason| format!("key '{key}': {reason}"))?;
                }
                Ok(())
            }
            (Self::Object(shape), FieldValue::Object(obj)) => {
                for (key, item) in obj.iter() {
                    let kind = shape
                        .field(key)
                        .ok_or_else(|| format!("unknown object field '{key}'"))?;
                    kind.check(item, registry)
                        .map_err(|reason| format!("object field '{key}': {reason}"))?;
                }
                Ok(())
            }
            _ => Err(mismatch()),
        }
    }
}

/// Field table of a structured model object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    fields: Vec<(String, FieldKind)>,
}

impl ObjectShape {
    /// Create empty shape
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field (name accepted in either casing)
    #[must_use]
    pub fn with_field(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push((camel_to_snake(name), kind));
        self
    }

    /// Kind of a field by canonical name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldKind> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, k)| k)
    }

    /// Declared fields
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldKind)> {
        self.fields.iter().map(|(n, k)| (n.as_str(), k))
    }
}

/// Descriptor of one component field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    default: Option<FieldValue>,
    sensitive: bool,
    min_version: Option<AgentSpecVersion>,
}

impl FieldDescriptor {
    /// Create descriptor; the name may be given in either casing
    #[must_use]
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: camel_to_snake(name),
            kind,
            default: None,
            sensitive: false,
            min_version: None,
        }
    }

    /// Mark as sensitive: never written to documents
    #[inline]
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Gate behind a minimum format version
    #[inline]
    #[must_use]
    pub fn since(mut self, version: AgentSpecVersion) -> Self {
        self.min_version = Some(version);
        self
    }

    /// Default used when the field is not provided
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Canonical (snake_case) name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field is sensitive
    #[inline]
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Version that introduced the field
    #[inline]
    #[must_use]
    pub fn min_version(&self) -> Option<AgentSpecVersion> {
        self.min_version
    }

    /// Value used when the field is absent: the declared default, else
    /// `null` for optional kinds
    #[must_use]
    pub fn default_value(&self) -> Option<FieldValue> {
        match &self.default {
            Some(value) => Some(value.clone()),
            None if self.kind.is_optional() => Some(FieldValue::Null),
            None => None,
        }
    }
}

/// Field table and type-level attributes of a component type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentShape {
    families: Vec<String>,
    min_version: Option<AgentSpecVersion>,
    fields: Vec<FieldDescriptor>,
}

impl ComponentShape {
    /// Create empty shape
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare membership of a family (abstract base type)
    #[inline]
    #[must_use]
    pub fn in_family(mut self, family: impl Into<String>) -> Self {
        self.families.push(family.into());
        self
    }

    /// Gate the whole type behind a minimum format version
    #[inline]
    #[must_use]
    pub fn since(mut self, version: AgentSpecVersion) -> Self {
        self.min_version = Some(version);
        self
    }

    /// Append a field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    /// Families this type belongs to
    #[inline]
    #[must_use]
    pub fn families(&self) -> &[String] {
        &self.families
    }

    /// Version that introduced the type
    #[inline]
    #[must_use]
    pub fn min_version(&self) -> Option<AgentSpecVersion> {
        self.min_version
    }

    /// Declared fields in order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Descriptor by canonical name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::validating_factory;
    use crate::value::ModelObject;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register("Leaf", ComponentShape::new().in_family("Thing"), validating_factory)
            .unwrap();
        registry
            .register("Other", ComponentShape::new(), validating_factory)
            .unwrap();
        registry
    }

    #[test]
    fn descriptor_normalizes_name() {
        let descriptor = FieldDescriptor::new("maxCacheSize", FieldKind::Integer);
        assert_eq!(descriptor.name(), "max_cache_size");
    }

    #[test]
    fn default_value_rules() {
        assert_eq!(
            FieldDescriptor::new("a", FieldKind::optional(FieldKind::String)).default_value(),
            Some(FieldValue::Null)
        );
        assert_eq!(FieldDescriptor::new("a", FieldKind::String).default_value(), None);
        assert_eq!(
            FieldDescriptor::new("a", FieldKind::Bool).with_default(true).default_value(),
            Some(FieldValue::Bool(true))
        );
    }

    #[test]
    fn scalar_checks() {
        let registry = registry();
        assert!(FieldKind::Float.check(&FieldValue::Integer(1), &registry).is_ok());
        assert!(FieldKind::Integer.check(&FieldValue::Float(1.5), &registry).is_err());
        assert!(FieldKind::String.check(&FieldValue::Null, &registry).is_err());
        assert!(FieldKind::optional(FieldKind::String)
            .check(&FieldValue::Null, &registry)
            .is_ok());
    }

    #[test]
    fn nested_check_reports_position() {
        let registry = registry();
        let value = FieldValue::List(vec!["ok".into(), FieldValue::Integer(3)]);
        let reason = FieldKind::list(FieldKind::String)
            .check(&value, &registry)
            .unwrap_err();
        assert!(reason.starts_with("item 1"));
    }

    #[test]
    fn object_check_rejects_unknown_keys() {
        let registry = registry();
        let shape = ObjectShape::new().with_field("maxTokens", FieldKind::Integer);
        let kind = FieldKind::Object(shape);

        let ok = FieldValue::Object(ModelObject::new().with("max_tokens", 5));
        let bad = FieldValue::Object(ModelObject::new().with("temperature", 0.1));
        assert!(kind.check(&ok, &registry).is_ok());
        assert!(kind.check(&bad, &registry).is_err());
    }

    #[test]
    fn untyped_positions_reject_model_objects() {
        let registry = registry();
        let data: FieldValue = [("body", FieldValue::Object(ModelObject::new().with("page_size", 10)))]
            .into_iter()
            .collect();
        let reason = FieldKind::map(FieldKind::Any)
            .check(&data, &registry)
            .unwrap_err();
        assert!(reason.starts_with("key 'body'"));

        let plain: FieldValue = [("body", 10)].into_iter().collect();
        assert!(FieldKind::map(FieldKind::Any).check(&plain, &registry).is_ok());
    }

    #[test]
    fn component_family_check() {
        let registry = registry();
        let leaf = crate::Component::builder("Leaf", "l").build(&registry).unwrap();
        let other = crate::Component::builder("Other", "o").build(&registry).unwrap();

        let kind = FieldKind::component("Thing");
        assert!(kind.check(&FieldValue::Component(leaf), &registry).is_ok());
        assert!(kind.check(&FieldValue::Component(other.clone()), &registry).is_err());
        assert!(FieldKind::any_component()
            .check(&FieldValue::Component(other), &registry)
            .is_ok());
    }
}

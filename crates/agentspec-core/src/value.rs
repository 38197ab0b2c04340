//! Field values held by components
//!
//! A [`FieldValue`] is either plain data, a structured [`ModelObject`] whose
//! keys are field names, or a nested [`Component`].

use crate::component::{Component, ComponentRef};
use indexmap::IndexMap;
use std::sync::Arc;

/// Value of a component field
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Absent / null value
    #[default]
    Null,

    /// Boolean
    Bool(bool),

    /// Signed integer
    Integer(i64),

    /// Floating point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Ordered sequence
    List(Vec<FieldValue>),

    /// String-keyed user data; keys are never casing-converted
    Map(IndexMap<String, FieldValue>),

    /// Structured value whose keys are field names (casing-converted)
    Object(ModelObject),

    /// Nested component
    Component(ComponentRef),
}

impl FieldValue {
    /// Check for null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get string content
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get boolean content
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get integer content
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get numeric content as float (integers widen)
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get list content
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get map content
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, FieldValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get model object content
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ModelObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Get nested component
    #[inline]
    #[must_use]
    pub fn as_component(&self) -> Option<&ComponentRef> {
        match self {
            Self::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
            Self::Component(_) => "component",
        }
    }

    /// Check for a model object anywhere in this value, components excluded
    #[must_use]
    pub fn contains_object(&self) -> bool {
        match self {
            Self::Object(_) => true,
            Self::List(items) => items.iter().any(Self::contains_object),
            Self::Map(map) => map.values().any(Self::contains_object),
            Self::Null
            | Self::Bool(_)
            | Self::Integer(_)
            | Self::Float(_)
            | Self::String(_)
            | Self::Component(_) => false,
        }
    }

    /// Drop null entries of every model object in this value
    ///
    /// Documents never carry them, so this is the stored form.
    #[must_use]
    pub fn without_null_object_entries(self) -> Self {
        match self {
            Self::Object(obj) => Self::Object(
                obj.fields
                    .into_iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k, v.without_null_object_entries()))
                    .collect(),
            ),
            Self::List(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::without_null_object_entries)
                    .collect(),
            ),
            Self::Map(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, v.without_null_object_entries()))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Visit components nested in this value, without descending into them
    pub fn for_each_component<'a>(&'a self, visit: &mut impl FnMut(&'a ComponentRef)) {
        match self {
            Self::Component(c) => visit(c),
            Self::List(items) => {
                for item in items {
                    item.for_each_component(visit);
                }
            }
            Self::Map(map) => {
                for value in map.values() {
                    value.for_each_component(visit);
                }
            }
            Self::Object(obj) => {
                for value in obj.values() {
                    value.for_each_component(visit);
                }
            }
            Self::Null | Self::Bool(_) | Self::Integer(_) | Self::Float(_) | Self::String(_) => {}
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ComponentRef> for FieldValue {
    fn from(value: ComponentRef) -> Self {
        Self::Component(value)
    }
}

impl From<&ComponentRef> for FieldValue {
    fn from(value: &ComponentRef) -> Self {
        Self::Component(Arc::clone(value))
    }
}

impl From<Component> for FieldValue {
    fn from(value: Component) -> Self {
        Self::Component(Arc::new(value))
    }
}

impl From<ModelObject> for FieldValue {
    fn from(value: ModelObject) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Structured, non-component value (e.g. generation parameters)
///
/// Keys are canonical snake_case field names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelObject {
    fields: IndexMap<String, FieldValue>,
}

impl ModelObject {
    /// Create empty object
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field
    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Insert a field
    #[inline]
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get field value
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Iterate over fields in insertion order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Iterate over values
    #[inline]
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.values()
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for ModelObject {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

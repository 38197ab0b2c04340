//! Input and output properties
//!
//! A property is a JSON-schema map such as `{"title": "x", "type": "string"}`.
//! Properties are user data: their keys are written verbatim.

use agentspec_core::{FieldKind, FieldValue};
use indexmap::IndexMap;

/// JSON schema type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
}

impl PropertyType {
    /// JSON schema name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Property with a title and type
#[must_use]
pub fn property(title: impl Into<String>, property_type: PropertyType) -> FieldValue {
    let mut schema = IndexMap::new();
    schema.insert("title".to_string(), FieldValue::String(title.into()));
    schema.insert(
        "type".to_string(),
        FieldValue::String(property_type.as_str().to_string()),
    );
    FieldValue::Map(schema)
}

/// String property
#[inline]
#[must_use]
pub fn string_property(title: impl Into<String>) -> FieldValue {
    property(title, PropertyType::String)
}

/// Title of a property, if it has one
#[must_use]
pub fn property_title(property: &FieldValue) -> Option<&str> {
    property.as_map()?.get("title")?.as_str()
}

/// Titles of a property list
#[must_use]
pub fn property_titles(properties: Option<&FieldValue>) -> Vec<&str> {
    properties
        .and_then(FieldValue::as_list)
        .map(|list| list.iter().filter_map(property_title).collect())
        .unwrap_or_default()
}

/// Kind of an `inputs`/`outputs` field
#[must_use]
pub fn properties_kind() -> FieldKind {
    FieldKind::list(FieldKind::map(FieldKind::Any))
}

/// Empty property list
#[inline]
#[must_use]
pub fn no_properties() -> FieldValue {
    FieldValue::List(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_shape() {
        let p = property("count", PropertyType::Integer);
        let map = p.as_map().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["title", "type"]);
        assert_eq!(map["type"].as_str(), Some("integer"));
        assert_eq!(property_title(&p), Some("count"));
    }

    #[test]
    fn titles_of_list() {
        let list = FieldValue::List(vec![string_property("a"), FieldValue::Null, string_property("b")]);
        assert_eq!(property_titles(Some(&list)), vec!["a", "b"]);
        assert!(property_titles(None).is_empty());
    }
}

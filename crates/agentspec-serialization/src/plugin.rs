//! Serialization plugins
//!
//! A plugin is a type-scoped handler. Plugins are composed into an ordered
//! [`PluginRegistry`]: user plugins first, in registration order, then the
//! builtin plugin as the default handler for every registered type.
//!
//! Construction fails with [`ConfigurationError::PluginCollision`] when two
//! user plugins claim the same type, so misconfiguration surfaces before any
//! data flows.

use crate::context::{DeserializationContext, SerializationContext};
use crate::error::{ConfigurationError, DeserializationError, SerializationError};
use agentspec_core::Component;
use std::collections::HashMap;
use std::sync::Arc;

/// Serialized form of one component
pub type SerializedDict = serde_json::Map<String, serde_json::Value>;

/// Common plugin identity
pub trait Plugin: Send + Sync {
    /// Name used in diagnostics
    fn plugin_name(&self) -> &str;

    /// Component types handled by this plugin
    fn supported_component_types(&self) -> Vec<String>;

    /// Check if the plugin handles `component_type`
    fn supports(&self, component_type: &str) -> bool {
        self.supported_component_types()
            .iter()
            .any(|t| t == component_type)
    }
}

/// Writes components of its supported types
pub trait ComponentSerializationPlugin: Plugin {
    /// Serialize one component
    ///
    /// Nested values should go through the context so that references,
    /// casing and version gating apply uniformly.
    ///
    /// # Errors
    /// Returns error if a nested value cannot be serialized
    fn serialize(
        &self,
        component: &Component,
        context: &mut SerializationContext<'_>,
    ) -> Result<SerializedDict, SerializationError>;
}

/// Reads components of its supported types
pub trait ComponentDeserializationPlugin: Plugin {
    /// Reconstruct one component from its dict
    ///
    /// # Errors
    /// Returns error if the dict does not describe a valid component
    fn deserialize(
        &self,
        dict: &SerializedDict,
        context: &mut DeserializationContext<'_>,
    ) -> Result<Component, DeserializationError>;
}

/// Ordered plugin list with a builtin fallback
pub struct PluginRegistry<P: ?Sized> {
    plugins: Vec<Arc<P>>,
    claims: HashMap<String, usize>,
    builtin: Arc<P>,
}

impl<P: Plugin + ?Sized> PluginRegistry<P> {
    /// Create registry, checking user plugins for collisions
    ///
    /// # Errors
    /// Returns [`ConfigurationError::PluginCollision`] if two plugins
    /// claim the same component type
    pub fn new(plugins: Vec<Arc<P>>, builtin: Arc<P>) -> Result<Self, ConfigurationError> {
        let mut claims: HashMap<String, usize> = HashMap::new();
        for (index, plugin) in plugins.iter().enumerate() {
            for component_type in plugin.supported_component_types() {
                match claims.get(&component_type) {
                    Some(&owner) if owner != index => {
                        return Err(ConfigurationError::collision(
                            component_type,
                            plugins[owner].plugin_name(),
                            plugin.plugin_name(),
                        ));
                    }
                    Some(_) => {}
                    None => {
                        claims.insert(component_type, index);
                    }
                }
            }
        }

        Ok(Self {
            plugins,
            claims,
            builtin,
        })
    }

    /// Registry holding only the builtin plugin
    #[must_use]
    pub fn builtin_only(builtin: Arc<P>) -> Self {
        Self {
            plugins: Vec::new(),
            claims: HashMap::new(),
            builtin,
        }
    }

    /// Plugin handling `component_type`, if any
    #[must_use]
    pub fn dispatch(&self, component_type: &str) -> Option<&P> {
        if let Some(&index) = self.claims.get(component_type) {
            return Some(&*self.plugins[index]);
        }
        self.builtin
            .supports(component_type)
            .then_some(&*self.builtin)
    }

    /// Builtin fallback plugin
    #[inline]
    #[must_use]
    pub fn builtin(&self) -> &P {
        &self.builtin
    }

    /// Plugin names in dispatch order, builtin last
    #[must_use]
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins
            .iter()
            .map(|p| p.plugin_name())
            .chain(std::iter::once(self.builtin.plugin_name()))
            .collect()
    }
}

impl<P: Plugin + ?Sized> std::fmt::Debug for PluginRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugin_names())
            .field("claimed_types", &self.claims.len())
            .finish()
    }
}

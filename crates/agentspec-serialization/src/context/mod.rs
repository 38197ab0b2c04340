//! Per-call codec state
//!
//! A context lives for exactly one serialize or deserialize call. Its
//! caches are not shared between calls.

mod deserialization;
mod serialization;

pub use deserialization::DeserializationContext;
pub use serialization::{ComponentsIdMapping, SerializationContext};

/// Key of a reference marker object
pub const COMPONENT_REF_KEY: &str = "$component_ref";

/// Key of the disaggregated component table
pub const REFERENCED_COMPONENTS_KEY: &str = "$referenced_components";

/// Discriminator key, never casing-converted
pub const COMPONENT_TYPE_KEY: &str = "component_type";

//! Agent Spec component model
//!
//! Typed, immutable configuration components and the metadata that tells
//! the codec how to write and read them.
//!
//! # Core Concepts
//!
//! - **Component**: identified, typed node of a configuration graph
//! - **ComponentShape**: per-type ordered field table with kinds and defaults
//! - **TypeRegistry**: discriminator → shape and factory
//! - **FieldCatalog**: which fields are sensitive or version-gated
//! - **AgentSpecSchema**: registry, catalog and versions bundled for a codec
//!
//! # Example
//!
//! ```rust
//! use agentspec_core::prelude::*;
//!
//! let mut registry = TypeRegistry::new();
//! registry
//!     .register(
//!         "Note",
//!         ComponentShape::new().with_field(FieldDescriptor::new("text", FieldKind::String)),
//!         validating_factory,
//!     )
//!     .unwrap();
//!
//! let note = Component::builder("Note", "greeting")
//!     .field("text", "hello")
//!     .build(&registry)
//!     .unwrap();
//! assert_eq!(note.field("text").and_then(FieldValue::as_str), Some("hello"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod casing;
pub mod catalog;
pub mod component;
pub mod error;
pub mod registry;
pub mod schema;
pub mod shape;
pub mod value;
pub mod version;

pub use casing::{camel_to_snake, snake_to_camel, FieldCasing};
pub use catalog::{FieldCatalog, FieldPolicy};
pub use component::{Component, ComponentBuilder, ComponentRef};
pub use error::{ComponentError, ComponentResult, ValidationError};
pub use registry::{validating_factory, ComponentFactory, RegisteredType, TypeRegistry};
pub use schema::AgentSpecSchema;
pub use shape::{ComponentConstraint, ComponentShape, FieldDescriptor, FieldKind, ObjectShape};
pub use value::{FieldValue, ModelObject};
pub use version::{AgentSpecVersion, VersionParseError, VersionSet};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for defining and building components
    pub use crate::component::{Component, ComponentBuilder, ComponentRef};
    pub use crate::error::{ComponentError, ValidationError};
    pub use crate::registry::{validating_factory, TypeRegistry};
    pub use crate::schema::AgentSpecSchema;
    pub use crate::shape::{ComponentShape, FieldDescriptor, FieldKind, ObjectShape};
    pub use crate::value::{FieldValue, ModelObject};
    pub use crate::version::AgentSpecVersion;
}

//! Node type registry for the Folio document model.
//!
//! Node types are named, immutable descriptors. They are collected in an
//! explicit [`Registry`] (there is no process-wide table) and frozen into a
//! [`Schema`] which the model consults when building nodes.
//!
//! # Key Types
//!
//! - [`NodeType`] / [`NodeSpec`] -- Type descriptor and its schema flags
//! - [`NodeKind`] -- The concrete node variant a type is bound to
//! - [`Registry`] -- Mutable collection with `register` / `extend` / `override_type`
//! - [`Schema`] -- Frozen registry plus a [`ContentValidator`] oracle

pub mod error;
pub mod node_type;
pub mod registry;
pub mod validator;

pub use error::{SchemaError, SchemaResult};
pub use node_type::{NodeKind, NodeSpec, NodeSpecPatch, NodeType};
pub use registry::{basic_registry, Registry, Schema};
pub use validator::{AcceptAll, ContentValidator};

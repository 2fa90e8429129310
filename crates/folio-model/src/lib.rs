//! Immutable document tree for Folio.
//!
//! A document is a tree of [`Node`]s. Containers hold their children in a
//! [`Fragment`]; text-bearing nodes hold a raw string. Nothing is mutated in
//! place: every edit returns a new tree that shares every untouched subtree
//! with the old one.
//!
//! # Sizes and positions
//!
//! Every node has a scalar `node_size`: the character count of its text,
//! `1` for an inline leaf, or its content size plus two for a container (one
//! token for the opening edge, one for the closing edge). Absolute positions
//! count those units from the start of a boundary node's content, and a
//! [`Position`] maps such an integer to the path of nodes that contains it.
//!
//! # Key Types
//!
//! - [`Fragment`] -- Ordered child list with cached size
//! - [`Node`] -- Tree node (container, text, or leaf)
//! - [`Position`] / [`Anchor`] / [`Target`] -- Addressing
//! - [`Slice`] / [`replace_outer`] -- Structural replace
//! - [`NodeFactory`] -- Building nodes from a [`Schema`](folio_schema::Schema) by type name

pub mod error;
pub mod factory;
pub mod fragment;
pub mod json;
pub mod node;
pub mod position;
pub mod slice;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::{ModelError, ModelErrorKind, ModelResult};
pub use factory::{check_content, NodeFactory};
pub use fragment::Fragment;
pub use node::{Attrs, Insertion, Node};
pub use position::{Anchor, Position, ResolvedStep, Target};
pub use slice::{replace_outer, Slice};

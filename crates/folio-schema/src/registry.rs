//! Registry and frozen schema.
//!
//! Registration is an explicit, ordered data transformation: build a
//! [`Registry`], register base types, derive others with
//! [`Registry::extend`], then freeze it into a [`Schema`]. Nothing is
//! registered as a side effect of constructing nodes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use folio_types::{trace, violation};
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::node_type::{NodeKind, NodeSpec, NodeSpecPatch, NodeType};
use crate::validator::{AcceptAll, ContentValidator};

/// Mutable collection of node types, keyed by unique name.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    types: BTreeMap<String, Arc<NodeType>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Register a new type.
    ///
    /// Registering a name twice, or a type whose kind contradicts its
    /// flags, is a contract violation.
    pub fn register(&mut self, node_type: NodeType) -> Arc<NodeType> {
        let _op = trace::enter("Registry::register");
        if self.types.contains_key(&node_type.name) {
            violation(format!("node type `{}` is already registered", node_type.name));
        }
        if let Some(conflict) = node_type.binding_conflict() {
            violation(format!("node type `{}`: {conflict}", node_type.name));
        }
        debug!(name = %node_type.name, kind = %node_type.kind, "registered node type");
        let node_type = Arc::new(node_type);
        self.types
            .insert(node_type.name.clone(), Arc::clone(&node_type));
        node_type
    }

    /// Register `name` as a derivative of `base`: unset spec fields and the
    /// kind binding are inherited, metadata is copied.
    pub fn extend(
        &mut self,
        base: &str,
        name: impl Into<String>,
        patch: NodeSpecPatch,
    ) -> Arc<NodeType> {
        let _op = trace::enter("Registry::extend");
        let Some(base) = self.types.get(base).cloned() else {
            violation(format!("cannot extend unknown node type `{base}`"));
        };
        let derived = NodeType {
            name: name.into(),
            kind: base.kind,
            spec: base.spec.merged(&patch),
            meta: base.meta.clone(),
        };
        self.register(derived)
    }

    /// Replace an existing entry. The name must already be registered.
    pub fn override_type(&mut self, node_type: NodeType) -> Arc<NodeType> {
        let _op = trace::enter("Registry::override_type");
        if !self.types.contains_key(&node_type.name) {
            violation(format!(
                "cannot override unregistered node type `{}`",
                node_type.name
            ));
        }
        if let Some(conflict) = node_type.binding_conflict() {
            violation(format!("node type `{}`: {conflict}", node_type.name));
        }
        debug!(name = %node_type.name, kind = %node_type.kind, "overrode node type");
        let node_type = Arc::new(node_type);
        self.types
            .insert(node_type.name.clone(), Arc::clone(&node_type));
        node_type
    }

    pub fn get(&self, name: &str) -> SchemaResult<Arc<NodeType>> {
        self.soft_get(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    pub fn soft_get(&self, name: &str) -> Option<Arc<NodeType>> {
        self.types.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Freeze into a schema that accepts every content sequence.
    pub fn into_schema(self) -> Schema {
        self.into_schema_with(AcceptAll)
    }

    /// Freeze into a schema backed by the given content oracle.
    pub fn into_schema_with(self, validator: impl ContentValidator + 'static) -> Schema {
        Schema {
            registry: self,
            validator: Arc::new(validator),
        }
    }
}

/// A frozen registry plus its content oracle.
#[derive(Clone)]
pub struct Schema {
    registry: Registry,
    validator: Arc<dyn ContentValidator>,
}

impl Schema {
    pub fn get(&self, name: &str) -> SchemaResult<Arc<NodeType>> {
        self.registry.get(name)
    }

    pub fn soft_get(&self, name: &str) -> Option<Arc<NodeType>> {
        self.registry.soft_get(name)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Ask the oracle whether `children` is valid content for `parent`.
    pub fn accepts(&self, parent: &NodeType, children: &[&NodeType]) -> bool {
        if parent.is_text() || parent.is_leaf() {
            return children.is_empty();
        }
        self.validator.accepts(parent, children)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.registry.len())
            .finish()
    }
}

/// A small general-purpose registry.
///
/// - `doc`: document root (`block+`)
/// - `paragraph`, `header`: text-bearing blocks
/// - `line`: block holding inline children (`inline*`)
/// - `blockquote`: container of blocks
/// - `text`: inline text run
/// - `image`: inline leaf
pub fn basic_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(NodeType::new(
        "doc",
        NodeKind::Document,
        NodeSpec::container("block+"),
    ));
    registry.register(NodeType::new(
        "paragraph",
        NodeKind::Paragraph,
        NodeSpec::text().with_group("block"),
    ));
    registry.register(NodeType::new(
        "header",
        NodeKind::Header,
        NodeSpec::text().with_group("block"),
    ));
    registry.register(NodeType::new(
        "line",
        NodeKind::Paragraph,
        NodeSpec::container("inline*").with_group("block"),
    ));
    registry.register(NodeType::new(
        "blockquote",
        NodeKind::Blockquote,
        NodeSpec::container("block+").with_group("block"),
    ));
    registry.register(NodeType::new(
        "text",
        NodeKind::Text,
        NodeSpec::text().with_inline().with_group("inline"),
    ));
    registry.register(NodeType::new(
        "image",
        NodeKind::Leaf,
        NodeSpec::inline_leaf().with_group("inline"),
    ));
    registry
}

//! Building nodes by type name.
//!
//! The kind a node is built as always comes from its registered type, so a
//! schema-driven build can never disagree with the registration.

use folio_schema::{NodeKind, NodeType, Schema};
use folio_types::trace;

use crate::error::{ModelErrorKind, ModelResult};
use crate::fragment::Fragment;
use crate::node::{Attrs, Node};

/// Construct nodes from a schema, keyed by type name.
pub trait NodeFactory {
    /// Build a container (or block leaf) named `name`. Content is checked
    /// against the schema's content oracle.
    fn node(&self, name: &str, attrs: Attrs, content: impl Into<Fragment>) -> ModelResult<Node>;

    /// Build a text-bearing node named `name`.
    fn text(&self, name: &str, text: &str) -> ModelResult<Node>;

    /// Build an atomic node named `name`.
    fn leaf(&self, name: &str, attrs: Attrs) -> ModelResult<Node>;

    /// Build a `doc` node holding `children`.
    fn doc(&self, children: impl Into<Fragment>) -> ModelResult<Node> {
        self.node("doc", Attrs::new(), children)
    }

    /// Build `name` as the given kind. Asking for a kind other than the one
    /// the type was registered with is a contract violation.
    fn build(&self, kind: NodeKind, name: &str, attrs: Attrs, content: impl Into<Fragment>) -> ModelResult<Node>;
}

impl NodeFactory for Schema {
    fn node(&self, name: &str, attrs: Attrs, content: impl Into<Fragment>) -> ModelResult<Node> {
        let node_type = self.get(name)?;
        self.build(node_type.kind, name, attrs, content)
    }

    fn text(&self, name: &str, text: &str) -> ModelResult<Node> {
        let _op = trace::enter("NodeFactory::text");
        let node_type = self.get(name)?;
        Ok(Node::build_text(node_type.kind, node_type, Attrs::new(), text))
    }

    fn leaf(&self, name: &str, attrs: Attrs) -> ModelResult<Node> {
        self.node(name, attrs, Fragment::empty())
    }

    fn build(&self, kind: NodeKind, name: &str, attrs: Attrs, content: impl Into<Fragment>) -> ModelResult<Node> {
        let _op = trace::enter("NodeFactory::build");
        let node_type = self.get(name)?;
        let content = content.into();
        check_content(self, &node_type, &content)?;
        Ok(Node::build(kind, node_type, attrs, content))
    }
}

/// Ask the schema's oracle whether `content` may live inside `parent`.
pub fn check_content(schema: &Schema, parent: &NodeType, content: &Fragment) -> ModelResult<()> {
    if parent.is_text() || parent.is_leaf() || parent.is_inline_leaf() {
        // build reports these as contract violations
        return Ok(());
    }
    let children: Vec<&NodeType> = content.iter().map(|n| n.node_type().as_ref()).collect();
    if !schema.accepts(parent, &children) {
        return Err(ModelErrorKind::InvalidContent(parent.name.clone()).into());
    }
    Ok(())
}

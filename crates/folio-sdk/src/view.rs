//! Render hooks.
//!
//! A view turns one node into an opaque renderable and names the node whose
//! children belong inside it (its outlet). Rendering a tree follows outlets
//! downward; a node without an outlet renders its subtree by itself.

use folio_model::Node;

/// What a view produced for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendered<R> {
    pub renderable: R,
    /// Node whose children are rendered into `renderable`, if any.
    pub outlet: Option<Node>,
}

impl<R> Rendered<R> {
    /// A renderable whose children come from `outlet`.
    pub fn with_outlet(renderable: R, outlet: &Node) -> Self {
        Self {
            renderable,
            outlet: Some(outlet.clone()),
        }
    }

    /// A renderable that already covers its whole subtree.
    pub fn leaf(renderable: R) -> Self {
        Self {
            renderable,
            outlet: None,
        }
    }
}

/// Render hook invoked once per visited node.
pub trait NodeView {
    type Output;

    fn render(&self, node: &Node) -> Rendered<Self::Output>;
}

/// A rendered node and the rendered children of its outlet.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTree<R> {
    pub node: Node,
    pub renderable: R,
    pub children: Vec<RenderTree<R>>,
}

impl<R> RenderTree<R> {
    /// Number of rendered nodes, this one included.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(RenderTree::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Render `node` and, through outlets, everything below it.
pub fn render_tree<R>(view: &dyn NodeView<Output = R>, node: &Node) -> RenderTree<R> {
    let Rendered { renderable, outlet } = view.render(node);
    let children = match outlet {
        Some(outlet) => outlet
            .content()
            .iter()
            .map(|child| render_tree(view, child))
            .collect(),
        None => Vec::new(),
    };
    RenderTree {
        node: node.clone(),
        renderable,
        children,
    }
}

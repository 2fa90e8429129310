//! The content validity oracle.
//!
//! Content expressions (`"block+"`, `"inline*"`, ...) are stored on each
//! [`NodeSpec`](crate::NodeSpec) but never parsed here. Whoever owns the
//! grammar plugs in a [`ContentValidator`]; insertion and replace call sites
//! only ask it a yes/no question.

use crate::node_type::NodeType;

/// Decides whether a sequence of child types is valid content for a parent.
pub trait ContentValidator: Send + Sync {
    fn accepts(&self, parent: &NodeType, children: &[&NodeType]) -> bool;
}

/// Validator that accepts every child sequence.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl ContentValidator for AcceptAll {
    fn accepts(&self, _parent: &NodeType, _children: &[&NodeType]) -> bool {
        true
    }
}

impl<F> ContentValidator for F
where
    F: Fn(&NodeType, &[&NodeType]) -> bool + Send + Sync,
{
    fn accepts(&self, parent: &NodeType, children: &[&NodeType]) -> bool {
        self(parent, children)
    }
}

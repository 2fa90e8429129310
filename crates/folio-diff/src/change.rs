use std::fmt;

use folio_model::Node;
use serde::{Deserialize, Serialize};

/// What a [`Change`] does to the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Remove,
    Replace,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Remove => write!(f, "remove"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// A single change between two trees.
///
/// `old` is the node as it appears in the old tree (shared with it, so it
/// can be found by identity) and `modified` its counterpart in the new one.
/// An insert has no `old`, a remove has no `modified`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Change {
    pub old: Option<Node>,
    pub modified: Option<Node>,
    pub kind: ChangeKind,
}

impl Change {
    pub fn insert(modified: &Node) -> Self {
        Self {
            old: None,
            modified: Some(modified.clone()),
            kind: ChangeKind::Insert,
        }
    }

    pub fn remove(old: &Node) -> Self {
        Self {
            old: Some(old.clone()),
            modified: None,
            kind: ChangeKind::Remove,
        }
    }

    pub fn replace(old: &Node, modified: &Node) -> Self {
        Self {
            old: Some(old.clone()),
            modified: Some(modified.clone()),
            kind: ChangeKind::Replace,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.old, &self.modified) {
            (Some(old), Some(new)) => write!(f, "{} {old} -> {new}", self.kind),
            (Some(node), None) | (None, Some(node)) => write!(f, "{} {node}", self.kind),
            (None, None) => write!(f, "{}", self.kind),
        }
    }
}

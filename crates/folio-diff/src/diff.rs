use std::sync::OnceLock;

use folio_model::Node;
use folio_types::trace;
use tracing::debug;

use crate::change::{Change, ChangeKind};
use crate::compare::compare_nodes;
use crate::error::{DiffError, DiffResult};

/// A boundary node plus the changes that turn it into another tree.
#[derive(Clone, Debug)]
pub struct Diff {
    boundary: Node,
    changes: Vec<Change>,
    modified: OnceLock<DiffResult<Node>>,
}

impl Diff {
    /// Diff two snapshots. The modified tree is already known and is not
    /// rebuilt from the changes.
    pub fn between(old: &Node, modified: &Node) -> Self {
        let _op = trace::enter("Diff::between");
        let changes = compare_nodes(Some(old), Some(modified));
        debug!(
            boundary = %old.id().short_id(),
            changes = changes.len(),
            "computed diff"
        );
        Self {
            boundary: old.clone(),
            changes,
            modified: OnceLock::from(Ok(modified.clone())),
        }
    }

    /// A diff whose modified tree is reconstructed from `changes` on first
    /// access.
    pub fn new(boundary: Node, changes: Vec<Change>) -> Self {
        Self {
            boundary,
            changes,
            modified: OnceLock::new(),
        }
    }

    pub fn boundary(&self) -> &Node {
        &self.boundary
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// The tree after all changes.
    pub fn modified(&self) -> DiffResult<Node> {
        self.modified.get_or_init(|| self.reconstruct()).clone()
    }

    /// Replay the changes against the boundary.
    ///
    /// Each `replace` swaps its `old` node (found by identity) for its
    /// `modified` node. Inserts and removes carry no position, so they
    /// cannot be replayed and fail with [`DiffError::UnsupportedChange`].
    pub fn reconstruct(&self) -> DiffResult<Node> {
        let _op = trace::enter("Diff::reconstruct");
        let mut current = self.boundary.clone();
        for change in &self.changes {
            match (change.kind, &change.old, &change.modified) {
                (ChangeKind::Replace, Some(old), Some(modified)) => {
                    current = current.replace_child_recursive(old, modified.clone())?;
                }
                (kind, _, _) => return Err(DiffError::UnsupportedChange(kind)),
            }
        }
        Ok(current)
    }
}

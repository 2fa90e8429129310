//! Addressing: absolute offsets, resolved paths, and anchors.
//!
//! An absolute position is an integer counted from the start of a boundary
//! node's content. [`Position::resolve_absolute`] walks down from the
//! boundary and records, per level, which child the position enters (or
//! sits before) and how much offset that level contributes:
//!
//! ```text
//! doc( paragraph("ab"), line( text("cd") ) )
//!      0  1  2          2    3  4  5     6  7
//! ```
//!
//! Containers contribute one token on each edge; text and inline leaves do
//! not, so resolution stops at them. Depth `0` is the boundary itself.
//!
//! # Invariants
//!
//! - `steps[0].parent` is the boundary.
//! - `absolute` equals the sum of every step's `offset`.
//! - Text and inline leaves are terminal: no step descends below them.

use std::fmt;

use folio_types::{trace, NodeId};

use crate::error::{ModelErrorKind, ModelResult};
use crate::node::Node;

/// Compact form of a resolved step, stored in the per-node cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PathStep {
    pub(crate) index: usize,
    pub(crate) offset: usize,
}

/// One level of a resolved position.
#[derive(Clone)]
pub struct ResolvedStep {
    /// The node at this depth.
    pub parent: Node,
    /// Child of `parent` the position enters, or sits before.
    pub index: usize,
    /// Offset this level contributes to the absolute position.
    pub offset: usize,
}

impl PartialEq for ResolvedStep {
    fn eq(&self, other: &Self) -> bool {
        Node::ptr_eq(&self.parent, &other.parent)
            && self.index == other.index
            && self.offset == other.offset
    }
}

impl fmt::Debug for ResolvedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]+{}", self.parent.type_name(), self.index, self.offset)
    }
}

/// An absolute offset resolved to a path from a boundary node.
#[derive(Clone, PartialEq)]
pub struct Position {
    boundary: Node,
    steps: Vec<ResolvedStep>,
    absolute: usize,
}

impl Position {
    /// Resolve `pos` inside `boundary`.
    ///
    /// Fails when `pos` lies outside `[0, boundary.content_size()]`. This is
    /// narrower than `[0, boundary.node_size()]`: the boundary's own edge
    /// tokens are not addressable from inside it.
    pub fn resolve_absolute(boundary: &Node, pos: usize) -> ModelResult<Position> {
        let _op = trace::enter("Position::resolve_absolute");
        if pos > boundary.content_size() {
            return Err(ModelErrorKind::PositionOutOfRange {
                pos,
                size: boundary.content_size(),
            }
            .into());
        }

        let mut steps = Vec::new();
        let mut node = boundary.clone();
        let mut offset = pos;
        loop {
            if node.is_text() {
                steps.push(ResolvedStep {
                    parent: node,
                    index: 0,
                    offset,
                });
                break;
            }
            if node.is_inline_leaf() {
                if offset != 0 {
                    return Err(ModelErrorKind::InsideLeaf {
                        name: node.type_name().to_string(),
                        offset,
                    }
                    .into());
                }
                steps.push(ResolvedStep {
                    parent: node,
                    index: 0,
                    offset: 0,
                });
                break;
            }

            let (index, remainder) = node.content().offset_to_index(offset)?;
            if remainder == 0 {
                steps.push(ResolvedStep {
                    parent: node,
                    index,
                    offset,
                });
                break;
            }

            let child = node.child(index)?.clone();
            let child_start = offset - remainder;
            if child.is_text() {
                steps.push(ResolvedStep {
                    parent: node,
                    index,
                    offset: child_start,
                });
                offset = remainder;
            } else if child.is_inline_leaf() {
                return Err(ModelErrorKind::InsideLeaf {
                    name: child.type_name().to_string(),
                    offset: remainder,
                }
                .into());
            } else {
                steps.push(ResolvedStep {
                    parent: node,
                    index,
                    offset: child_start + 1,
                });
                offset = remainder - 1;
            }
            node = child;
        }

        Ok(Position {
            boundary: boundary.clone(),
            steps,
            absolute: pos,
        })
    }

    /// Rebuild a position from a cached path.
    pub(crate) fn from_path(boundary: &Node, pos: usize, path: &[PathStep]) -> ModelResult<Position> {
        let mut steps = Vec::with_capacity(path.len());
        let mut node = boundary.clone();
        for (depth, step) in path.iter().enumerate() {
            let next = if depth + 1 < path.len() {
                Some(node.child(step.index)?.clone())
            } else {
                None
            };
            steps.push(ResolvedStep {
                parent: node,
                index: step.index,
                offset: step.offset,
            });
            match next {
                Some(child) => node = child,
                None => break,
            }
        }
        Ok(Position {
            boundary: boundary.clone(),
            steps,
            absolute: pos,
        })
    }

    pub(crate) fn path(&self) -> Vec<PathStep> {
        self.steps
            .iter()
            .map(|s| PathStep {
                index: s.index,
                offset: s.offset,
            })
            .collect()
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn boundary(&self) -> &Node {
        &self.boundary
    }

    pub fn absolute(&self) -> usize {
        self.absolute
    }

    pub fn steps(&self) -> &[ResolvedStep] {
        &self.steps
    }

    /// Deepest resolved level (`0` = the boundary).
    pub fn depth(&self) -> usize {
        self.steps.len() - 1
    }

    /// Normalize a signed depth: negative values count back from the
    /// deepest level (`-1` is the deepest level itself).
    fn level(&self, depth: isize) -> ModelResult<usize> {
        let max = self.depth();
        let resolved = if depth < 0 {
            max as isize + 1 + depth
        } else {
            depth
        };
        if resolved < 0 || resolved > max as isize {
            return Err(ModelErrorKind::DepthOutOfRange { depth, max }.into());
        }
        Ok(resolved as usize)
    }

    /// Node at `depth`.
    pub fn node(&self, depth: isize) -> ModelResult<&Node> {
        Ok(&self.steps[self.level(depth)?].parent)
    }

    /// Child index at `depth`.
    pub fn index(&self, depth: isize) -> ModelResult<usize> {
        Ok(self.steps[self.level(depth)?].index)
    }

    /// Absolute offset where the content of the node at `depth` starts.
    pub fn start(&self, depth: isize) -> ModelResult<usize> {
        let level = self.level(depth)?;
        Ok(self.steps[..level].iter().map(|s| s.offset).sum())
    }

    /// Absolute offset where the content of the node at `depth` ends.
    pub fn end(&self, depth: isize) -> ModelResult<usize> {
        let level = self.level(depth)?;
        Ok(self.start(level as isize)? + self.steps[level].parent.content_size())
    }

    /// Offset of this position inside the content of the node at `depth`.
    pub fn relative(&self, depth: isize) -> ModelResult<usize> {
        Ok(self.absolute - self.start(depth)?)
    }

    /// The deepest resolved node.
    pub fn parent(&self) -> &Node {
        &self.steps[self.depth()].parent
    }

    /// Returns `true` if the position lies inside a text-bearing node.
    pub fn is_in_text(&self) -> bool {
        self.parent().is_text()
    }

    /// Character offset inside the enclosing text node, if any.
    pub fn text_offset(&self) -> Option<usize> {
        self.is_in_text().then(|| self.steps[self.depth()].offset)
    }

    /// Node directly before the position at its deepest container level.
    pub fn node_before(&self) -> Option<&Node> {
        let step = &self.steps[self.depth()];
        if step.parent.is_text() || step.index == 0 {
            return None;
        }
        step.parent.maybe_child(step.index - 1)
    }

    /// Node directly after the position at its deepest container level.
    pub fn node_after(&self) -> Option<&Node> {
        let step = &self.steps[self.depth()];
        if step.parent.is_text() {
            return None;
        }
        step.parent.maybe_child(step.index)
    }

    /// Deepest depth at which both positions pass through the same node.
    ///
    /// Nodes are compared by their index path from the boundary, so two
    /// occurrences of one shared instance count as different nodes.
    pub fn common_ancestor(a: &Position, b: &Position) -> ModelResult<usize> {
        if !Node::ptr_eq(&a.boundary, &b.boundary) {
            return Err(ModelErrorKind::IncomparablePositions.into());
        }
        let mut depth = 0;
        for (wa, wb) in a.steps.windows(2).zip(b.steps.windows(2)) {
            if wa[0].index != wb[0].index || !Node::ptr_eq(&wa[1].parent, &wb[1].parent) {
                break;
            }
            depth += 1;
        }
        Ok(depth)
    }

    /// Replace the node at `depth` with `replacement`, rebuilding each
    /// ancestor up to the boundary. Returns the new boundary.
    pub fn rebuild(&self, depth: isize, replacement: Node) -> ModelResult<Node> {
        let _op = trace::enter("Position::rebuild");
        let level = self.level(depth)?;
        let mut current = replacement;
        for step in self.steps[..level].iter().rev() {
            let content = step.parent.content().replace_child(current, step.index)?;
            current = step.parent.copy(content);
        }
        Ok(current)
    }

    /// Offset at which child `index` of `node` starts.
    pub fn index_to_offset(node: &Node, index: usize) -> ModelResult<usize> {
        node.content().index_to_offset(index)
    }

    /// Child of `node` containing `offset`, plus the remainder into it.
    pub fn offset_to_index(node: &Node, offset: usize) -> ModelResult<(usize, usize)> {
        node.content().offset_to_index(offset)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({} ", self.absolute)?;
        f.debug_list().entries(self.steps.iter()).finish()?;
        write!(f, ")")
    }
}

// ---------------------------------------------------------------------------
// Anchors
// ---------------------------------------------------------------------------

/// A position described relative to a node rather than as an integer.
///
/// Anchors locate their node by id, so they keep meaning "after this
/// paragraph" when the paragraph is copied with new content or when
/// unrelated parts of the tree change size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Just before the node's opening edge.
    Before(NodeId),
    /// Just after the node's closing edge.
    After(NodeId),
    /// Before child `index` of the node (`None` = after the last child).
    Child(NodeId, Option<usize>),
    /// At an offset inside the node's content (`None` = `0`).
    Offset(NodeId, Option<usize>),
}

impl Anchor {
    pub fn before(node: &Node) -> Self {
        Self::Before(node.id())
    }

    pub fn after(node: &Node) -> Self {
        Self::After(node.id())
    }

    pub fn child(node: &Node, index: Option<usize>) -> Self {
        Self::Child(node.id(), index)
    }

    pub fn offset(node: &Node, offset: Option<usize>) -> Self {
        Self::Offset(node.id(), offset)
    }

    pub fn node_id(&self) -> NodeId {
        match *self {
            Self::Before(id) | Self::After(id) | Self::Child(id, _) | Self::Offset(id, _) => id,
        }
    }

    /// Absolute offset of this anchor inside `boundary`.
    pub fn absolute(&self, boundary: &Node) -> ModelResult<usize> {
        let _op = trace::enter("Anchor::absolute");
        let id = self.node_id();
        let (before, node, content_start) = if boundary.id() == id {
            (None, boundary.clone(), 0)
        } else {
            let (offset, node) = boundary
                .content()
                .find_by_id(id)
                .ok_or_else(|| ModelErrorKind::NodeNotFound(id.to_string()))?;
            let start = if node.is_text() { offset } else { offset + 1 };
            (Some(offset), node, start)
        };

        match *self {
            Self::Before(_) | Self::After(_) => {
                let Some(before) = before else {
                    // the boundary has no outside edge within itself
                    return Err(ModelErrorKind::NodeNotFound(id.to_string()).into());
                };
                if matches!(self, Self::Before(_)) {
                    Ok(before)
                } else {
                    Ok(before + node.node_size())
                }
            }
            Self::Child(_, index) => {
                let index = index.unwrap_or(node.child_count());
                Ok(content_start + node.content().index_to_offset(index)?)
            }
            Self::Offset(_, offset) => {
                let offset = offset.unwrap_or(0);
                if offset > node.content_size() {
                    return Err(ModelErrorKind::OffsetOutOfRange {
                        offset,
                        size: node.content_size(),
                    }
                    .into());
                }
                Ok(content_start + offset)
            }
        }
    }

    /// Resolve this anchor against `boundary`.
    pub fn resolve(&self, boundary: &Node) -> ModelResult<Position> {
        boundary.resolve(self.absolute(boundary)?)
    }
}

/// Where an edit applies: an absolute offset or an anchor, resolved
/// against whatever snapshot the edit is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    At(usize),
    Anchor(Anchor),
}

impl Target {
    pub fn absolute(&self, boundary: &Node) -> ModelResult<usize> {
        match self {
            Self::At(pos) => Ok(*pos),
            Self::Anchor(anchor) => anchor.absolute(boundary),
        }
    }

    pub fn resolve(&self, boundary: &Node) -> ModelResult<Position> {
        boundary.resolve(self.absolute(boundary)?)
    }
}

impl From<usize> for Target {
    fn from(pos: usize) -> Self {
        Self::At(pos)
    }
}

impl From<Anchor> for Target {
    fn from(anchor: Anchor) -> Self {
        Self::Anchor(anchor)
    }
}

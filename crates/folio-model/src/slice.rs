//! Slices and the structural replace.

use folio_types::{trace, violation};
use tracing::debug;

use crate::error::{ModelErrorKind, ModelResult};
use crate::fragment::Fragment;
use crate::node::{char_slice, Node};
use crate::position::Position;

/// A piece of content that may start or end in the middle of a container.
///
/// `start_depth` and `end_depth` count the outer container levels at each
/// edge that are open: only their interior belongs to the slice, so their
/// edge tokens are not part of its size.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Slice {
    content: Fragment,
    start_depth: usize,
    end_depth: usize,
}

impl Slice {
    /// Build a slice. Open depths larger than the content can carry are a
    /// contract violation.
    pub fn new(content: impl Into<Fragment>, start_depth: usize, end_depth: usize) -> Self {
        let content = content.into();
        if start_depth + end_depth > content.size() {
            let _op = trace::enter("Slice::new");
            violation(format!(
                "open depths {start_depth}/{end_depth} exceed slice content of size {}",
                content.size()
            ));
        }
        Self {
            content,
            start_depth,
            end_depth,
        }
    }

    /// A slice with no open edges.
    pub fn closed(content: impl Into<Fragment>) -> Self {
        Self::new(content, 0, 0)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &Fragment {
        &self.content
    }

    pub fn start_depth(&self) -> usize {
        self.start_depth
    }

    pub fn end_depth(&self) -> usize {
        self.end_depth
    }

    /// Content size minus the open edge tokens.
    pub fn size(&self) -> usize {
        self.content.size() - self.start_depth - self.end_depth
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// Replace the range between `from` and `to` in `root` with `slice`.
///
/// Descends while both positions enter the same child, then either removes
/// the range (empty slice) or splices a closed slice between two positions
/// that sit at the same depth. Every other shape fails with
/// [`ModelErrorKind::UnsupportedReplace`].
pub fn replace_outer(root: &Node, from: &Position, to: &Position, slice: &Slice) -> ModelResult<Node> {
    let _op = trace::enter("replace_outer");
    if slice.start_depth > from.depth() || slice.end_depth > to.depth() {
        violation(format!(
            "slice open depths {}/{} exceed position depths {}/{}",
            slice.start_depth,
            slice.end_depth,
            from.depth(),
            to.depth()
        ));
    }
    if from.depth() as isize - to.depth() as isize
        != slice.start_depth as isize - slice.end_depth as isize
    {
        violation(format!(
            "slice open depths {}/{} do not match position depths {}/{}",
            slice.start_depth,
            slice.end_depth,
            from.depth(),
            to.depth()
        ));
    }
    if !Node::ptr_eq(from.boundary(), root) || !Node::ptr_eq(to.boundary(), root) {
        return Err(ModelErrorKind::IncomparablePositions.into());
    }
    if from.absolute() > to.absolute() {
        return Err(ModelErrorKind::InvalidRange {
            from: from.absolute(),
            to: to.absolute(),
        }
        .into());
    }

    let updated = replace_at(from, to, slice, 0)?;
    debug!(
        from = from.absolute(),
        to = to.absolute(),
        slice_size = slice.size(),
        "replaced range"
    );
    Ok(updated)
}

fn replace_at(from: &Position, to: &Position, slice: &Slice, depth: usize) -> ModelResult<Node> {
    let level = depth as isize;
    let node = from.node(level)?;
    let index = from.index(level)?;

    if depth + slice.start_depth < from.depth() && depth < to.depth() && index == to.index(level)? {
        let child = replace_at(from, to, slice, depth + 1)?;
        return Ok(node.copy(node.content().replace_child(child, index)?));
    }

    let start = from.relative(level)?;
    let end = to.relative(level)?;
    if slice.size() == 0 {
        return node.remove(start, end);
    }

    let flat = slice.start_depth == 0 && slice.end_depth == 0;
    if flat && from.depth() == depth && to.depth() == depth {
        if let Some(text) = node.text() {
            return splice_text(node, text, start, end, slice);
        }
        if node.is_leaf() {
            return Err(ModelErrorKind::UnsupportedReplace(format!(
                "leaf `{}` has no content to replace",
                node.type_name()
            ))
            .into());
        }
        let content = Fragment::concat([
            node.content().cut(0, Some(start))?,
            slice.content.clone(),
            node.content().cut(end, None)?,
        ]);
        return Ok(node.copy(content));
    }

    Err(ModelErrorKind::UnsupportedReplace(format!(
        "slice open {}/{} between depths {} and {} at depth {depth}",
        slice.start_depth,
        slice.end_depth,
        from.depth(),
        to.depth()
    ))
    .into())
}

fn splice_text(node: &Node, text: &str, start: usize, end: usize, slice: &Slice) -> ModelResult<Node> {
    let mut inserted = String::new();
    for part in slice.content.iter() {
        match part.text() {
            Some(t) => inserted.push_str(t),
            None => {
                return Err(ModelErrorKind::UnsupportedReplace(format!(
                    "cannot splice `{}` into text-bearing `{}`",
                    part.type_name(),
                    node.type_name()
                ))
                .into())
            }
        }
    }
    let size = node.content_size();
    let mut updated = char_slice(text, 0, start);
    updated.push_str(&inserted);
    updated.push_str(&char_slice(text, end, size));
    Ok(node.copy_text(updated))
}

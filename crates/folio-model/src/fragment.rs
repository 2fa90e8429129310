//! Ordered, immutable child lists.
//!
//! A [`Fragment`] owns its children behind an `Arc`, so cloning a fragment
//! (or the node holding it) never copies the tree. Every operation returns a
//! new fragment; children that an operation does not touch are shared with
//! the input by reference.
//!
//! # Invariants
//!
//! - `size` equals the sum of the children's `node_size` after every operation.
//! - The empty fragment is one shared instance ([`Fragment::empty`]).

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, LazyLock};

use folio_types::{trace, NodeId};

use crate::error::{ModelErrorKind, ModelResult};
use crate::node::Node;

static EMPTY: LazyLock<Fragment> = LazyLock::new(|| Fragment {
    nodes: Arc::new(Vec::new()),
    size: 0,
});

/// Ordered list of child nodes with a cached total size.
#[derive(Clone)]
pub struct Fragment {
    nodes: Arc<Vec<Node>>,
    size: usize,
}

impl Fragment {
    /// The canonical empty fragment.
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// Build a fragment from a list of nodes.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        if nodes.is_empty() {
            return Self::empty();
        }
        let size = nodes.iter().map(Node::node_size).sum();
        Self {
            nodes: Arc::new(nodes),
            size,
        }
    }

    /// Concatenate several fragments into one.
    pub fn concat(parts: impl IntoIterator<Item = Fragment>) -> Self {
        let nodes: Vec<Node> = parts
            .into_iter()
            .flat_map(|part| part.nodes.as_ref().clone())
            .collect();
        Self::from_nodes(nodes)
    }

    /// Total size of all children.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn first(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn last(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// The child at `index`, or an error outside `[0, child_count)`.
    pub fn child(&self, index: usize) -> ModelResult<&Node> {
        self.nodes.get(index).ok_or_else(|| {
            ModelErrorKind::IndexOutOfRange {
                index: index as isize,
                len: self.nodes.len(),
            }
            .into()
        })
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Returns `true` if both fragments share the same child storage.
    pub fn ptr_eq(&self, other: &Fragment) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
    }

    /// Concatenated text of every text-bearing descendant.
    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Append nodes (or whole fragments, flattened) at the end.
    pub fn append(&self, content: impl Into<Fragment>) -> Fragment {
        let content = content.into();
        if content.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return content;
        }
        let mut nodes = Vec::with_capacity(self.nodes.len() + content.nodes.len());
        nodes.extend(self.nodes.iter().cloned());
        nodes.extend(content.nodes.iter().cloned());
        Self {
            nodes: Arc::new(nodes),
            size: self.size + content.size,
        }
    }

    /// Insert nodes before `index`.
    ///
    /// `None` appends; a negative index counts back from the end
    /// (`-1` inserts before the last child). The resolved index must lie in
    /// `[0, child_count]`; it is never clamped.
    pub fn insert(&self, content: impl Into<Fragment>, index: Option<isize>) -> ModelResult<Fragment> {
        let _op = trace::enter("Fragment::insert");
        let len = self.nodes.len();
        let resolved = match index {
            None => len as isize,
            Some(i) if i < 0 => len as isize + i,
            Some(i) => i,
        };
        if resolved < 0 || resolved > len as isize {
            return Err(ModelErrorKind::IndexOutOfRange {
                index: index.unwrap_or(resolved),
                len,
            }
            .into());
        }
        let content = content.into();
        let at = resolved as usize;
        let mut nodes = Vec::with_capacity(len + content.nodes.len());
        nodes.extend(self.nodes[..at].iter().cloned());
        nodes.extend(content.nodes.iter().cloned());
        nodes.extend(self.nodes[at..].iter().cloned());
        Ok(Self {
            nodes: Arc::new(nodes),
            size: self.size + content.size,
        })
    }

    // ---------------------------------------------------------------
    // Removal
    // ---------------------------------------------------------------

    /// Remove the child at `index`.
    pub fn remove_child(&self, index: usize) -> ModelResult<Fragment> {
        let _op = trace::enter("Fragment::remove_child");
        let removed = self.child(index)?;
        let size = self.size - removed.node_size();
        let mut nodes = self.nodes.as_ref().clone();
        nodes.remove(index);
        Ok(self.rebuilt(nodes, size))
    }

    /// Remove a child by identity.
    pub fn remove_node(&self, node: &Node) -> ModelResult<Fragment> {
        self.remove_nodes(std::slice::from_ref(node))
    }

    /// Remove several children by identity. Fails if any is absent.
    pub fn remove_nodes(&self, targets: &[Node]) -> ModelResult<Fragment> {
        let _op = trace::enter("Fragment::remove_nodes");
        if let Some(missing) = targets
            .iter()
            .find(|t| !self.nodes.iter().any(|n| Node::ptr_eq(n, t)))
        {
            return Err(ModelErrorKind::NodeNotFound(format!("{missing:?}")).into());
        }
        let nodes: Vec<Node> = self
            .nodes
            .iter()
            .filter(|n| !targets.iter().any(|t| Node::ptr_eq(n, t)))
            .cloned()
            .collect();
        Ok(Self::from_nodes(nodes))
    }

    /// Keep only the content between offsets `from` and `to` (defaults to
    /// the end).
    ///
    /// Children wholly inside the range are shared as-is. A child straddling
    /// an edge is cut recursively: text by characters, containers one level
    /// down with the edge token skipped. Inline leaves occupy a single
    /// position and are never split.
    pub fn cut(&self, from: usize, to: Option<usize>) -> ModelResult<Fragment> {
        let _op = trace::enter("Fragment::cut");
        let to = to.unwrap_or(self.size);
        if from > to {
            return Err(ModelErrorKind::InvalidRange { from, to }.into());
        }
        if to > self.size {
            return Err(ModelErrorKind::OffsetOutOfRange {
                offset: to,
                size: self.size,
            }
            .into());
        }
        if from == 0 && to == self.size {
            return Ok(self.clone());
        }

        let mut result = Vec::new();
        let mut pos = 0;
        for child in self.nodes.iter() {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from {
                if pos >= from && end <= to {
                    result.push(child.clone());
                } else if child.is_text() {
                    let start = from.saturating_sub(pos);
                    let stop = (to - pos).min(child.content_size());
                    result.push(child.cut(start, Some(stop))?);
                } else {
                    let start = from.saturating_sub(pos + 1);
                    let stop = (to - pos - 1).min(child.content_size());
                    result.push(child.cut(start, Some(stop))?);
                }
            }
            pos = end;
        }
        Ok(Self::from_nodes(result))
    }

    // ---------------------------------------------------------------
    // Replacement
    // ---------------------------------------------------------------

    /// Overwrite the child at `index`. Schema conformance is the caller's
    /// concern.
    pub fn replace_child(&self, node: Node, index: usize) -> ModelResult<Fragment> {
        let _op = trace::enter("Fragment::replace_child");
        let current = self.child(index)?;
        if Node::ptr_eq(current, &node) {
            return Ok(self.clone());
        }
        let size = self.size - current.node_size() + node.node_size();
        let mut nodes = self.nodes.as_ref().clone();
        nodes[index] = node;
        Ok(self.rebuilt(nodes, size))
    }

    /// Overwrite a direct child found by identity.
    pub fn replace_node(&self, node: Node, old: &Node) -> ModelResult<Fragment> {
        let index = self
            .nodes
            .iter()
            .position(|n| Node::ptr_eq(n, old))
            .ok_or_else(|| ModelErrorKind::NodeNotFound(format!("{old:?}")))?;
        self.replace_child(node, index)
    }

    /// Replace `child` (found by identity at any depth) with `replacement`.
    ///
    /// Only the nodes on the path from this fragment down to the match are
    /// rebuilt; every other subtree is shared with `self`.
    pub fn replace_child_recursive(&self, child: &Node, replacement: Node) -> ModelResult<Fragment> {
        let _op = trace::enter("Fragment::replace_child_recursive");
        let path = self
            .find_path(|n| Node::ptr_eq(n, child), None)
            .ok_or_else(|| ModelErrorKind::NodeNotFound(format!("{child:?}")))?;
        self.rebuild_path(&path, replacement)
    }

    /// Rebuild along `path` (child indices from this fragment downward),
    /// putting `replacement` at the end of it.
    pub(crate) fn rebuild_path(&self, path: &[usize], replacement: Node) -> ModelResult<Fragment> {
        match path {
            [] => Ok(self.clone()),
            [index] => self.replace_child(replacement, *index),
            [index, rest @ ..] => {
                let parent = self.child(*index)?;
                let content = parent.content().rebuild_path(rest, replacement)?;
                self.replace_child(parent.copy(content), *index)
            }
        }
    }

    // ---------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------

    /// Breadth-first search for a node by identity, at most `max_depth`
    /// levels deep (`None` for unbounded; `Some(1)` checks direct children).
    pub fn contains(&self, node: &Node, max_depth: Option<usize>) -> bool {
        self.find_path(|n| Node::ptr_eq(n, node), max_depth).is_some()
    }

    /// Offset of `node` (found by identity) from the start of this fragment.
    pub fn offset(&self, node: &Node) -> Option<usize> {
        self.find_offset(|n| Node::ptr_eq(n, node))
            .map(|(offset, _)| offset)
    }

    /// Offset and current instance of the node carrying `id`.
    pub fn find_by_id(&self, id: NodeId) -> Option<(usize, Node)> {
        self.find_offset(|n| n.id() == id)
    }

    fn find_offset(&self, matches: impl Fn(&Node) -> bool) -> Option<(usize, Node)> {
        let path = self.find_path(&matches, None)?;
        let mut fragment = self;
        let mut offset = 0;
        for (level, &index) in path.iter().enumerate() {
            let node = &fragment.nodes[index];
            offset += fragment.nodes[..index]
                .iter()
                .map(Node::node_size)
                .sum::<usize>();
            if level + 1 == path.len() {
                return Some((offset, node.clone()));
            }
            // step over the opening token of the container we descend into
            offset += 1;
            fragment = node.content();
        }
        None
    }

    /// Index path to the first match in breadth-first order.
    fn find_path(&self, matches: impl Fn(&Node) -> bool, max_depth: Option<usize>) -> Option<Vec<usize>> {
        let mut queue: VecDeque<(&Fragment, Vec<usize>)> = VecDeque::new();
        queue.push_back((self, Vec::new()));

        while let Some((fragment, path)) = queue.pop_front() {
            let depth = path.len() + 1;
            if max_depth.is_some_and(|max| depth > max) {
                continue;
            }
            for (index, node) in fragment.nodes.iter().enumerate() {
                if matches(node) {
                    let mut found = path.clone();
                    found.push(index);
                    return Some(found);
                }
            }
            for (index, node) in fragment.nodes.iter().enumerate() {
                if !node.content().is_empty() {
                    let mut next = path.clone();
                    next.push(index);
                    queue.push_back((node.content(), next));
                }
            }
        }
        None
    }

    // ---------------------------------------------------------------
    // Index / offset conversion
    // ---------------------------------------------------------------

    /// Offset at which the child `index` starts (`index == child_count`
    /// gives the fragment size).
    pub fn index_to_offset(&self, index: usize) -> ModelResult<usize> {
        if index > self.nodes.len() {
            return Err(ModelErrorKind::IndexOutOfRange {
                index: index as isize,
                len: self.nodes.len(),
            }
            .into());
        }
        Ok(self.nodes[..index].iter().map(Node::node_size).sum())
    }

    /// The child containing `offset` and the remaining offset into it.
    ///
    /// An offset that falls exactly between two children reports the later
    /// child with a remainder of zero; the fragment end reports
    /// `(child_count, 0)`.
    pub fn offset_to_index(&self, offset: usize) -> ModelResult<(usize, usize)> {
        if offset > self.size {
            return Err(ModelErrorKind::OffsetOutOfRange {
                offset,
                size: self.size,
            }
            .into());
        }
        let mut pos = 0;
        for (index, child) in self.nodes.iter().enumerate() {
            let end = pos + child.node_size();
            if offset < end {
                return Ok((index, offset - pos));
            }
            pos = end;
        }
        Ok((self.nodes.len(), 0))
    }

    fn rebuilt(&self, nodes: Vec<Node>, size: usize) -> Fragment {
        if nodes.is_empty() {
            return Self::empty();
        }
        Self {
            nodes: Arc::new(nodes),
            size,
        }
    }
}

impl Default for Fragment {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.nodes.len() == other.nodes.len()
                && self.nodes.iter().zip(other.nodes.iter()).all(|(a, b)| a == b))
    }
}

impl Eq for Fragment {}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Self {
        Self::from_nodes(vec![node])
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        Self::from_nodes(nodes)
    }
}

impl From<&[Node]> for Fragment {
    fn from(nodes: &[Node]) -> Self {
        Self::from_nodes(nodes.to_vec())
    }
}

impl From<Vec<Fragment>> for Fragment {
    fn from(parts: Vec<Fragment>) -> Self {
        Self::concat(parts)
    }
}

impl From<&Fragment> for Fragment {
    fn from(fragment: &Fragment) -> Self {
        fragment.clone()
    }
}

impl FromIterator<Node> for Fragment {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::from_nodes(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Fragment {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::error::ModelErrorKind;
    use crate::test_util::*;

    fn abc() -> (Node, Node, Node) {
        (p("aa"), p("bbb"), p("c"))
    }

    fn sum_of_children(f: &Fragment) -> usize {
        f.iter().map(Node::node_size).sum()
    }

    #[test]
    fn empty_fragment_is_shared() {
        let a = Fragment::empty();
        let b = Fragment::from_nodes(vec![]);
        assert!(a.ptr_eq(&b));
        assert_eq!(a.size(), 0);
    }

    #[test]
    fn child_out_of_range_errors() {
        let (a, _, _) = abc();
        let f = Fragment::from(a);
        assert!(f.child(0).is_ok());
        let err = f.child(1).unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::IndexOutOfRange { index: 1, len: 1 });
    }

    #[test]
    fn append_flattens_fragments() {
        let (a, b, c) = abc();
        let f = Fragment::from(a.clone())
            .append(vec![Fragment::from(b.clone()), Fragment::from(c.clone())]);
        assert_eq!(f.child_count(), 3);
        assert_eq!(f.size(), 6);
        assert!(Node::ptr_eq(f.child(2).unwrap(), &c));
    }

    #[test]
    fn insert_at_child_count_appends() {
        let (a, b, c) = abc();
        let f = Fragment::from(vec![a, b]);
        let inserted = f.insert(c.clone(), Some(2)).unwrap();
        assert!(Node::ptr_eq(inserted.last().unwrap(), &c));
        assert_eq!(inserted.size(), 6);
    }

    #[test]
    fn insert_past_child_count_errors() {
        let (a, b, c) = abc();
        let f = Fragment::from(vec![a, b]);
        let err = f.insert(c, Some(3)).unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::IndexOutOfRange { index: 3, len: 2 });
        assert_eq!(err.trace.innermost(), Some("Fragment::insert"));
    }

    #[test]
    fn insert_negative_counts_from_end() {
        let (a, b, c) = abc();
        let f = Fragment::from(vec![a, b.clone()]);
        let inserted = f.insert(c.clone(), Some(-1)).unwrap();
        assert!(Node::ptr_eq(inserted.child(1).unwrap(), &c));
        assert!(Node::ptr_eq(inserted.child(2).unwrap(), &b));
        assert!(f.insert(p("x"), Some(-3)).is_err());
    }

    #[test]
    fn insert_default_appends() {
        let (a, b, _) = abc();
        let f = Fragment::from(a).insert(b.clone(), None).unwrap();
        assert!(Node::ptr_eq(f.last().unwrap(), &b));
    }

    #[test]
    fn remove_child_by_index() {
        let (a, b, c) = abc();
        let f = Fragment::from(vec![a.clone(), b, c.clone()]);
        let removed = f.remove_child(1).unwrap();
        assert_eq!(removed, Fragment::from(vec![a.clone(), c.clone()]));
        assert_eq!(removed.size(), a.node_size() + c.node_size());
    }

    #[test]
    fn remove_by_identity() {
        let (a, b, c) = abc();
        let f = Fragment::from(vec![a.clone(), b.clone(), c.clone()]);
        let removed = f.remove_nodes(&[a.clone(), c]).unwrap();
        assert_eq!(removed.child_count(), 1);
        assert!(Node::ptr_eq(removed.child(0).unwrap(), &b));

        // an equal but distinct instance is not the same node
        let err = f.remove_node(&p("aa")).unwrap_err();
        assert!(matches!(err.kind, ModelErrorKind::NodeNotFound(_)));
    }

    #[test]
    fn cut_whole_range_is_identity() {
        let f = Fragment::from(vec![p("abc"), line(vec![t("de"), img()])]);
        let cut = f.cut(0, None).unwrap();
        assert_eq!(cut, f);
    }

    #[test]
    fn cut_shares_whole_children() {
        let (a, b, c) = abc();
        let f = Fragment::from(vec![a, b.clone(), c]);
        let cut = f.cut(2, Some(5)).unwrap();
        assert_eq!(cut.child_count(), 1);
        assert!(Node::ptr_eq(cut.child(0).unwrap(), &b));
    }

    #[test]
    fn cut_slices_text_children() {
        let f = Fragment::from(vec![p("hello"), p("world")]);
        let cut = f.cut(3, Some(7)).unwrap();
        assert_eq!(cut.child_count(), 2);
        assert_eq!(cut.child(0).unwrap().text(), Some("lo"));
        assert_eq!(cut.child(1).unwrap().text(), Some("wo"));
        assert_eq!(cut.size(), 4);
        // the sliced pieces keep their identity lineage
        assert_eq!(cut.child(0).unwrap().id(), f.child(0).unwrap().id());
    }

    #[test]
    fn cut_recurses_into_containers() {
        // line = [open, t("abcd") x4, image, close] -> size 7
        let l = line(vec![t("abcd"), img()]);
        let f = Fragment::from(vec![l.clone()]);
        let cut = f.cut(0, Some(3)).unwrap();
        let inner = cut.child(0).unwrap();
        assert_eq!(inner.type_name(), "line");
        assert_eq!(inner.content().text_content(), "ab");
        assert_eq!(inner.node_size(), 4);

        let tail = f.cut(3, None).unwrap();
        let inner = tail.child(0).unwrap();
        assert_eq!(inner.content().child_count(), 2);
        assert_eq!(inner.content().child(0).unwrap().text(), Some("cd"));
        assert_eq!(inner.content().child(1).unwrap().type_name(), "image");
    }

    #[test]
    fn cut_never_splits_leaves() {
        let f = Fragment::from(vec![t("ab"), img(), t("cd")]);
        let cut = f.cut(1, Some(4)).unwrap();
        let names: Vec<&str> = cut.iter().map(Node::type_name).collect();
        assert_eq!(names, vec!["text", "image", "text"]);
        assert_eq!(cut.size(), 3);
    }

    #[test]
    fn cut_rejects_bad_ranges() {
        let f = Fragment::from(vec![p("abc")]);
        assert_eq!(
            f.cut(2, Some(1)).unwrap_err().kind,
            ModelErrorKind::InvalidRange { from: 2, to: 1 }
        );
        assert_eq!(
            f.cut(0, Some(4)).unwrap_err().kind,
            ModelErrorKind::OffsetOutOfRange { offset: 4, size: 3 }
        );
    }

    #[test]
    fn replace_child_recomputes_size() {
        let (a, b, c) = abc();
        let f = Fragment::from(vec![a, b, c]);
        let replaced = f.replace_child(p("longer text"), 1).unwrap();
        assert_eq!(replaced.size(), 2 + 11 + 1);
        assert!(f.replace_child(p("x"), 3).is_err());
    }

    #[test]
    fn replace_child_recursive_shares_siblings() {
        let target = p("inner");
        let sibling = p("sibling");
        let quote = blockquote(vec![target.clone()]);
        let f = Fragment::from(vec![sibling.clone(), quote.clone()]);

        let replaced = f.replace_child_recursive(&target, p("changed")).unwrap();
        assert!(Node::ptr_eq(replaced.child(0).unwrap(), &sibling));
        let new_quote = replaced.child(1).unwrap();
        assert_eq!(new_quote.id(), quote.id());
        assert!(!Node::ptr_eq(new_quote, &quote));
        assert_eq!(new_quote.content().child(0).unwrap().text(), Some("changed"));
        assert_eq!(replaced.size(), 7 + 7 + 2);
    }

    #[test]
    fn replace_child_recursive_missing_errors() {
        let f = Fragment::from(vec![p("a")]);
        let err = f.replace_child_recursive(&p("a"), p("b")).unwrap_err();
        assert!(matches!(err.kind, ModelErrorKind::NodeNotFound(_)));
    }

    #[test]
    fn contains_respects_depth() {
        let target = t("deep");
        let f = Fragment::from(vec![blockquote(vec![line(vec![target.clone()])])]);
        assert!(f.contains(&target, None));
        assert!(f.contains(&target, Some(3)));
        assert!(!f.contains(&target, Some(2)));
    }

    #[test]
    fn offset_finds_nested_nodes() {
        let target = t("xy");
        let f = Fragment::from(vec![p("abc"), line(vec![t("d"), target.clone()])]);
        // p(3) + line open(1) + t("d")(1)
        assert_eq!(f.offset(&target), Some(5));
        assert_eq!(f.offset(&p("abc")), None);
    }

    #[test]
    fn index_offset_conversion() {
        let (a, b, c) = abc();
        let f = Fragment::from(vec![a, b, c]);
        assert_eq!(f.index_to_offset(0).unwrap(), 0);
        assert_eq!(f.index_to_offset(2).unwrap(), 5);
        assert_eq!(f.index_to_offset(3).unwrap(), 6);
        assert!(f.index_to_offset(4).is_err());

        assert_eq!(f.offset_to_index(0).unwrap(), (0, 0));
        assert_eq!(f.offset_to_index(3).unwrap(), (1, 1));
        assert_eq!(f.offset_to_index(5).unwrap(), (2, 0));
        assert_eq!(f.offset_to_index(6).unwrap(), (3, 0));
        assert!(f.offset_to_index(7).is_err());
    }

    fn arb_fragment() -> impl Strategy<Value = Fragment> {
        prop::collection::vec(
            prop_oneof![
                "[a-z]{1,6}".prop_map(|s| p(&s)),
                prop::collection::vec("[a-z]{1,4}", 0..4)
                    .prop_map(|texts| line(texts.iter().map(|s| t(s)).collect())),
                Just(blockquote(vec![p("q")])),
            ],
            0..6,
        )
        .prop_map(Fragment::from)
    }

    proptest! {
        #[test]
        fn size_matches_children_after_every_operation(
            f in arb_fragment(),
            a in 0usize..40,
            b in 0usize..40,
            index in 0usize..6,
        ) {
            prop_assert_eq!(f.size(), sum_of_children(&f));

            let appended = f.append(p("tail"));
            prop_assert_eq!(appended.size(), sum_of_children(&appended));

            if let Ok(inserted) = f.insert(p("ins"), Some(index as isize)) {
                prop_assert_eq!(inserted.size(), sum_of_children(&inserted));
            }
            if let Ok(removed) = f.remove_child(index) {
                prop_assert_eq!(removed.size(), sum_of_children(&removed));
            }
            if let Ok(replaced) = f.replace_child(p("rep"), index) {
                prop_assert_eq!(replaced.size(), sum_of_children(&replaced));
            }
            let (from, to) = (a.min(b), a.max(b));
            if let Ok(cut) = f.cut(from, Some(to)) {
                prop_assert_eq!(cut.size(), sum_of_children(&cut));
            }
        }

        #[test]
        fn full_cut_equals_original(f in arb_fragment()) {
            prop_assert_eq!(f.cut(0, Some(f.size())).unwrap(), f);
        }
    }
}

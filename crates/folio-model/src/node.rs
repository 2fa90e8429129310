//! Tree nodes.
//!
//! A [`Node`] is a cheap-to-clone handle (`Arc`) to immutable node data. The
//! concrete variant is the [`NodeKind`] its type was registered with; text,
//! inline and leaf behaviour follow the type's schema flags.
//!
//! Two notions of sameness are used throughout the model:
//!
//! - *identity* ([`Node::ptr_eq`]): the very same instance, as shared by
//!   structural sharing. Removal and recursive replacement search by identity.
//! - *equality* (`==`, [`Node::equals`]): same type, attrs and content,
//!   ignoring ids.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};

use folio_schema::{NodeKind, NodeType};
use folio_types::{trace, violation, NodeId};
use serde_json::Value;
use tracing::trace as log_trace;

use crate::error::{ModelErrorKind, ModelResult};
use crate::fragment::Fragment;
use crate::position::{PathStep, Position};
use crate::slice::{replace_outer, Slice};

/// Node attributes.
pub type Attrs = BTreeMap<String, Value>;

/// Content accepted by [`Node::insert`].
#[derive(Clone, Debug, PartialEq)]
pub enum Insertion {
    Text(String),
    Nodes(Fragment),
}

impl From<&str> for Insertion {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Insertion {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Node> for Insertion {
    fn from(node: Node) -> Self {
        Self::Nodes(Fragment::from(node))
    }
}

impl From<Vec<Node>> for Insertion {
    fn from(nodes: Vec<Node>) -> Self {
        Self::Nodes(Fragment::from(nodes))
    }
}

impl From<Fragment> for Insertion {
    fn from(fragment: Fragment) -> Self {
        Self::Nodes(fragment)
    }
}

/// An immutable tree node.
#[derive(Clone)]
pub struct Node(Arc<NodeInner>);

struct NodeInner {
    id: NodeId,
    node_type: Arc<NodeType>,
    attrs: Attrs,
    content: Fragment,
    text: Option<String>,
    size: usize,
    /// Resolved paths keyed by absolute position. Append-only: the node is
    /// immutable, so an entry never goes stale. It lives as long as the node,
    /// which matters only for long-lived roots resolved at many offsets.
    positions: RwLock<HashMap<usize, Arc<[PathStep]>>>,
}

impl Node {
    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Build a container or leaf node of the given kind.
    ///
    /// `kind` must be the kind `node_type` was registered with, and the type
    /// must not be text-bearing.
    pub fn build(kind: NodeKind, node_type: Arc<NodeType>, attrs: Attrs, content: Fragment) -> Node {
        let _op = trace::enter("Node::build");
        check_binding(kind, &node_type);
        if node_type.is_text() {
            violation(format!(
                "`{}` is text-bearing and needs string content",
                node_type.name
            ));
        }
        if (node_type.is_leaf() || node_type.is_inline_leaf()) && !content.is_empty() {
            violation(format!("leaf `{}` cannot hold content", node_type.name));
        }
        Self::from_parts(NodeId::new(), node_type, attrs, content, None)
    }

    /// Build a text-bearing node of the given kind.
    pub fn build_text(kind: NodeKind, node_type: Arc<NodeType>, attrs: Attrs, text: impl Into<String>) -> Node {
        let _op = trace::enter("Node::build_text");
        check_binding(kind, &node_type);
        if !node_type.is_text() {
            violation(format!(
                "string content requires a text-bearing node, `{}` is not",
                node_type.name
            ));
        }
        Self::from_parts(NodeId::new(), node_type, attrs, Fragment::empty(), Some(text.into()))
    }

    pub(crate) fn from_parts(
        id: NodeId,
        node_type: Arc<NodeType>,
        attrs: Attrs,
        content: Fragment,
        text: Option<String>,
    ) -> Node {
        let size = match &text {
            Some(text) => text.chars().count(),
            None if node_type.is_inline_leaf() => 1,
            None => content.size() + 2,
        };
        Node(Arc::new(NodeInner {
            id,
            node_type,
            attrs,
            content,
            text,
            size,
            positions: RwLock::new(HashMap::new()),
        }))
    }

    /// Same type and attrs, new content. Keeps this node's id when
    /// `keep_id` is set, mints a fresh one otherwise.
    pub fn new_node(&self, content: Fragment, keep_id: bool) -> Node {
        let id = if keep_id { self.id() } else { NodeId::new() };
        if self.is_text() {
            violation(format!(
                "`{}` is text-bearing; use copy_text",
                self.type_name()
            ));
        }
        Self::from_parts(id, Arc::clone(&self.0.node_type), self.0.attrs.clone(), content, None)
    }

    /// Copy-on-write update: this node with `content`, same id.
    ///
    /// Returns `self` unchanged when the content is equal to the current one.
    pub fn copy(&self, content: Fragment) -> Node {
        if content == self.0.content {
            return self.clone();
        }
        self.new_node(content, true)
    }

    /// Copy-on-write update of a text-bearing node.
    pub fn copy_text(&self, text: impl Into<String>) -> Node {
        let text = text.into();
        match &self.0.text {
            Some(current) if *current == text => self.clone(),
            Some(_) => Self::from_parts(
                self.id(),
                Arc::clone(&self.0.node_type),
                self.0.attrs.clone(),
                Fragment::empty(),
                Some(text),
            ),
            None => violation(format!(
                "string content requires a text-bearing node, `{}` is not",
                self.type_name()
            )),
        }
    }

    /// This node with different attrs, same id and content.
    pub fn with_attrs(&self, attrs: Attrs) -> Node {
        if attrs == self.0.attrs {
            return self.clone();
        }
        Self::from_parts(
            self.id(),
            Arc::clone(&self.0.node_type),
            attrs,
            self.0.content.clone(),
            self.0.text.clone(),
        )
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn node_type(&self) -> &Arc<NodeType> {
        &self.0.node_type
    }

    pub fn type_name(&self) -> &str {
        &self.0.node_type.name
    }

    pub fn kind(&self) -> NodeKind {
        self.0.node_type.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.0.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.0.attrs.get(key)
    }

    pub fn content(&self) -> &Fragment {
        &self.0.content
    }

    pub fn text(&self) -> Option<&str> {
        self.0.text.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.0.text.is_some()
    }

    pub fn is_inline_leaf(&self) -> bool {
        self.0.node_type.is_inline_leaf()
    }

    pub fn is_leaf(&self) -> bool {
        self.is_text() || self.0.node_type.is_leaf() || self.is_inline_leaf()
    }

    /// Text length, `1` for an inline leaf, or content size plus the two
    /// edge tokens.
    pub fn node_size(&self) -> usize {
        self.0.size
    }

    /// Size of what lies between this node's edges: its text length or its
    /// content size.
    pub fn content_size(&self) -> usize {
        match &self.0.text {
            Some(_) => self.0.size,
            None => self.0.content.size(),
        }
    }

    pub fn child_count(&self) -> usize {
        self.0.content.child_count()
    }

    pub fn child(&self, index: usize) -> ModelResult<&Node> {
        self.0.content.child(index)
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.0.content.maybe_child(index)
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match &self.0.text {
            Some(text) => text.clone(),
            None => self.0.content.text_content(),
        }
    }

    /// Every node in this subtree in pre-order, `self` first.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.content().iter().rev().cloned());
            out.push(node);
        }
        out
    }

    /// The current instance carrying `id` in this subtree.
    pub fn find_by_id(&self, id: NodeId) -> Option<Node> {
        if self.id() == id {
            return Some(self.clone());
        }
        self.0.content.find_by_id(id).map(|(_, node)| node)
    }

    // ---------------------------------------------------------------
    // Equality
    // ---------------------------------------------------------------

    /// Returns `true` if both handles point at the same instance.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Same type name and attrs, and unless `ignore_content`, deeply equal
    /// content (ids are ignored).
    pub fn equals(&self, other: &Node, ignore_content: bool) -> bool {
        if Node::ptr_eq(self, other) {
            return true;
        }
        if self.type_name() != other.type_name() || self.0.attrs != other.0.attrs {
            return false;
        }
        ignore_content || (self.0.text == other.0.text && self.0.content == other.0.content)
    }

    /// Shallow identity: same type name and attrs, content ignored.
    pub fn same_markup(&self, other: &Node) -> bool {
        self.equals(other, true)
    }

    /// Deep equality that also requires equal ids.
    pub fn strict_eq(&self, other: &Node) -> bool {
        self.id() == other.id() && self.equals(other, false)
    }

    // ---------------------------------------------------------------
    // Editing
    // ---------------------------------------------------------------

    /// Insert text or nodes at `offset` (relative to this node's content).
    ///
    /// Text goes only into text-bearing nodes, nodes only into containers;
    /// anything else is a contract violation. An offset inside a child is
    /// forwarded to that child.
    pub fn insert(&self, offset: usize, content: impl Into<Insertion>) -> ModelResult<Node> {
        let _op = trace::enter("Node::insert");
        match (&self.0.text, content.into()) {
            (Some(text), Insertion::Text(inserted)) => {
                if offset > self.0.size {
                    return Err(ModelErrorKind::OffsetOutOfRange {
                        offset,
                        size: self.0.size,
                    }
                    .into());
                }
                let at = byte_index(text, offset);
                let mut updated = String::with_capacity(text.len() + inserted.len());
                updated.push_str(&text[..at]);
                updated.push_str(&inserted);
                updated.push_str(&text[at..]);
                Ok(self.copy_text(updated))
            }
            (Some(_), Insertion::Nodes(_)) => violation(format!(
                "cannot insert nodes into text-bearing node `{}`",
                self.type_name()
            )),
            (None, Insertion::Text(_)) => violation(format!(
                "string content requires a text-bearing node, `{}` is not",
                self.type_name()
            )),
            (None, Insertion::Nodes(nodes)) => {
                if self.is_leaf() {
                    violation(format!("leaf `{}` cannot hold content", self.type_name()));
                }
                let (index, remainder) = self.0.content.offset_to_index(offset)?;
                if remainder == 0 {
                    return Ok(self.copy(self.0.content.insert(nodes, Some(index as isize))?));
                }
                let child = self.child(index)?;
                let inner = if child.is_text() { remainder } else { remainder - 1 };
                let updated = child.insert(inner, Insertion::Nodes(nodes))?;
                Ok(self.copy(self.0.content.replace_child(updated, index)?))
            }
        }
    }

    /// Keep only the content between `from` and `to` (defaults to the end).
    pub fn cut(&self, from: usize, to: Option<usize>) -> ModelResult<Node> {
        let _op = trace::enter("Node::cut");
        match &self.0.text {
            Some(text) => {
                let to = to.unwrap_or(self.0.size);
                check_range(from, to, self.0.size)?;
                if from == 0 && to == self.0.size {
                    return Ok(self.clone());
                }
                Ok(self.copy_text(char_slice(text, from, to)))
            }
            None => Ok(self.copy(self.0.content.cut(from, to)?)),
        }
    }

    /// Remove the content between `from` and `to`.
    pub fn remove(&self, from: usize, to: usize) -> ModelResult<Node> {
        let _op = trace::enter("Node::remove");
        match &self.0.text {
            Some(text) => {
                check_range(from, to, self.0.size)?;
                let mut updated = char_slice(text, 0, from);
                updated.push_str(&char_slice(text, to, self.0.size));
                Ok(self.copy_text(updated))
            }
            None => {
                check_range(from, to, self.0.content.size())?;
                let head = self.0.content.cut(0, Some(from))?;
                let tail = self.0.content.cut(to, None)?;
                Ok(self.copy(head.append(tail)))
            }
        }
    }

    /// Replace the range `from..to` with `slice`.
    pub fn replace(&self, from: usize, to: usize, slice: &Slice) -> ModelResult<Node> {
        let _op = trace::enter("Node::replace");
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        replace_outer(self, &from, &to, slice)
    }

    /// Replace `child` (found by identity anywhere below, or `self`) with
    /// `replacement`, rebuilding only the path to it.
    pub fn replace_child_recursive(&self, child: &Node, replacement: Node) -> ModelResult<Node> {
        if Node::ptr_eq(self, child) {
            return Ok(replacement);
        }
        Ok(self.copy(self.0.content.replace_child_recursive(child, replacement)?))
    }

    // ---------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------

    /// Resolve an absolute position inside this node, memoized per node.
    pub fn resolve(&self, pos: usize) -> ModelResult<Position> {
        let cached = self
            .0
            .positions
            .read()
            .ok()
            .and_then(|cache| cache.get(&pos).cloned());
        if let Some(path) = cached {
            log_trace!(pos, node = %self.id().short_id(), "position cache hit");
            return Position::from_path(self, pos, &path);
        }

        let position = self.resolve_no_cache(pos)?;
        if let Ok(mut cache) = self.0.positions.write() {
            cache.entry(pos).or_insert_with(|| position.path().into());
        }
        log_trace!(pos, node = %self.id().short_id(), "position cache miss");
        Ok(position)
    }

    /// Resolve without consulting or filling the cache.
    pub fn resolve_no_cache(&self, pos: usize) -> ModelResult<Position> {
        Position::resolve_absolute(self, pos)
    }

    pub(crate) fn cached_positions(&self) -> usize {
        self.0.positions.read().map(|c| c.len()).unwrap_or(0)
    }
}

fn check_binding(kind: NodeKind, node_type: &NodeType) {
    if node_type.kind != kind {
        violation(format!(
            "node type `{}` is bound to {}, cannot build it as {}",
            node_type.name, node_type.kind, kind
        ));
    }
}

fn check_range(from: usize, to: usize, size: usize) -> ModelResult<()> {
    if from > to {
        return Err(ModelErrorKind::InvalidRange { from, to }.into());
    }
    if to > size {
        return Err(ModelErrorKind::OffsetOutOfRange { offset: to, size }.into());
    }
    Ok(())
}

/// Byte index of the `chars`-th character (or the string length).
fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

pub(crate) fn char_slice(text: &str, from: usize, to: usize) -> String {
    text.chars().skip(from).take(to.saturating_sub(from)).collect()
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, false)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())?;
        if !self.0.attrs.is_empty() {
            write!(f, "{:?}", self.0.attrs)?;
        }
        match &self.0.text {
            Some(text) => write!(f, "({text:?})"),
            None if self.0.content.is_empty() => Ok(()),
            None => {
                write!(f, "(")?;
                for (i, child) in self.0.content.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child:?}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use folio_schema::NodeSpec;
    use folio_types::ContractViolation;

    use super::*;
    use crate::test_util::*;

    fn violation_of<T>(f: impl FnOnce() -> T) -> ContractViolation {
        let payload = match catch_unwind(AssertUnwindSafe(f)) {
            Ok(_) => panic!("expected a contract violation"),
            Err(payload) => payload,
        };
        payload
            .downcast_ref::<ContractViolation>()
            .cloned()
            .expect("panic payload should be a ContractViolation")
    }

    #[test]
    fn sizes_follow_node_shape() {
        assert_eq!(p("abc").node_size(), 3);
        assert_eq!(img().node_size(), 1);
        assert_eq!(line(vec![t("ab"), img()]).node_size(), 5);
        assert_eq!(doc(vec![p("ab"), p("c")]).node_size(), 5);
        assert_eq!(doc(vec![]).node_size(), 2);
    }

    #[test]
    fn unicode_text_counts_chars() {
        let node = p("héllo wörld");
        assert_eq!(node.node_size(), 11);
        assert_eq!(node.cut(1, Some(5)).unwrap().text(), Some("éllo"));
    }

    #[test]
    fn copy_preserves_id_and_returns_self_when_unchanged() {
        let original = line(vec![t("ab")]);
        let same = original.copy(Fragment::from(t("ab")));
        assert!(Node::ptr_eq(&same, &original));

        let changed = original.copy(Fragment::from(t("xy")));
        assert!(!Node::ptr_eq(&changed, &original));
        assert_eq!(changed.id(), original.id());
    }

    #[test]
    fn new_node_mints_fresh_id_unless_kept() {
        let original = line(vec![]);
        let fresh = original.new_node(Fragment::from(t("a")), false);
        let kept = original.new_node(Fragment::from(t("a")), true);
        assert_ne!(fresh.id(), original.id());
        assert_eq!(kept.id(), original.id());
    }

    #[test]
    fn equality_levels() {
        let a = p("same");
        let b = p("same");
        let c = p("other");
        assert_eq!(a, b);
        assert!(!a.strict_eq(&b));
        assert!(a.strict_eq(&a.copy_text("same")));
        assert!(a.same_markup(&c));
        assert_ne!(a, c);
        assert!(!a.same_markup(&header("same")));
    }

    #[test]
    fn attrs_participate_in_shallow_equality() {
        let mut attrs = Attrs::new();
        attrs.insert("level".into(), Value::from(2));
        let h1 = header("title");
        let h2 = h1.with_attrs(attrs);
        assert_eq!(h2.id(), h1.id());
        assert!(!h1.same_markup(&h2));
    }

    #[test]
    fn insert_text_into_text_node() {
        let node = p("held");
        let updated = node.insert(3, "lo wor").unwrap();
        assert_eq!(updated.text(), Some("hello word"));
        assert_eq!(updated.id(), node.id());
        assert!(node.insert(5, "x").is_err());
    }

    #[test]
    fn insert_nodes_at_child_boundary() {
        let d = doc(vec![p("ab"), p("cd")]);
        let updated = d.insert(2, p("new")).unwrap();
        let texts: Vec<_> = updated.content().iter().map(Node::text_content).collect();
        assert_eq!(texts, vec!["ab", "new", "cd"]);
        assert_eq!(updated.node_size(), d.node_size() + 3);
    }

    #[test]
    fn insert_nodes_inside_container_child() {
        let d = doc(vec![line(vec![t("ab")])]);
        // offset 3 = after the line's open token and "ab"
        let updated = d.insert(3, img()).unwrap();
        let inner = updated.child(0).unwrap();
        assert_eq!(inner.child_count(), 2);
        assert_eq!(inner.child(1).unwrap().type_name(), "image");
    }

    #[test]
    fn string_into_container_is_a_violation() {
        let d = doc(vec![p("ab")]);
        let v = violation_of(|| d.insert(0, "text"));
        assert!(v.message.contains("text-bearing"));
        assert_eq!(v.trace.ops(), &["Node::insert"]);
    }

    #[test]
    fn nodes_into_text_is_a_violation() {
        let node = p("ab");
        let v = violation_of(|| node.insert(1, img()));
        assert!(v.message.contains("cannot insert nodes"));
    }

    #[test]
    fn kind_mismatch_is_a_violation() {
        let paragraph = schema().get("paragraph").unwrap();
        let v = violation_of(|| Node::build_text(NodeKind::Header, paragraph, Attrs::new(), "x"));
        assert!(v.message.contains("bound to paragraph"));
    }

    #[test]
    fn leaf_with_content_is_a_violation() {
        let image = schema().get("image").unwrap();
        let v = violation_of(|| {
            Node::build(NodeKind::Leaf, image, Attrs::new(), Fragment::from(t("x")))
        });
        assert!(v.message.contains("cannot hold content"));
    }

    #[test]
    fn text_type_rejects_node_construction() {
        let ty = Arc::new(NodeType::new("plain", NodeKind::Text, NodeSpec::text()));
        let v = violation_of(|| Node::build(NodeKind::Text, ty, Attrs::new(), Fragment::empty()));
        assert!(v.message.contains("needs string content"));
    }

    #[test]
    fn cut_and_remove_text() {
        let node = p("abcdef");
        assert_eq!(node.cut(2, None).unwrap().text(), Some("cdef"));
        assert_eq!(node.remove(1, 4).unwrap().text(), Some("aef"));
        assert!(node.remove(4, 2).is_err());
        assert!(Node::ptr_eq(&node.cut(0, None).unwrap(), &node));
    }

    #[test]
    fn remove_across_children() {
        let d = doc(vec![p("abc"), p("def"), p("ghi")]);
        let updated = d.remove(2, 7).unwrap();
        let texts: Vec<_> = updated.content().iter().map(Node::text_content).collect();
        assert_eq!(texts, vec!["ab", "hi"]);
        assert_eq!(updated.content().size(), 4);
    }

    #[test]
    fn replace_child_recursive_on_self_returns_replacement() {
        let node = p("a");
        let replacement = p("b");
        let result = node.replace_child_recursive(&node, replacement.clone()).unwrap();
        assert!(Node::ptr_eq(&result, &replacement));
    }

    #[test]
    fn descendants_are_pre_order() {
        let d = doc(vec![line(vec![t("a"), img()]), p("b")]);
        let names: Vec<String> = d
            .descendants()
            .iter()
            .map(|n| n.type_name().to_string())
            .collect();
        assert_eq!(names, vec!["doc", "line", "text", "image", "paragraph"]);
    }

    #[test]
    fn find_by_id_follows_copies() {
        let target = p("abc");
        let d = doc(vec![p("x"), target.clone()]);
        let edited = d.replace_child_recursive(&target, target.copy_text("abz")).unwrap();
        let found = edited.find_by_id(target.id()).unwrap();
        assert_eq!(found.text(), Some("abz"));
        assert!(edited.find_by_id(NodeId::new()).is_none());
    }

    #[test]
    fn resolve_is_memoized() {
        let d = doc(vec![p("abc"), p("def")]);
        assert_eq!(d.cached_positions(), 0);
        let first = d.resolve(4).unwrap();
        let second = d.resolve(4).unwrap();
        assert_eq!(d.cached_positions(), 1);
        assert_eq!(first, second);
        assert_eq!(first, d.resolve_no_cache(4).unwrap());
    }

    #[test]
    fn resolve_cache_is_shared_across_threads() {
        let d = doc(vec![p("abc"), line(vec![t("de"), img()]), blockquote(vec![p("f")])]);
        let size = d.content_size();
        std::thread::scope(|scope| {
            for shift in 0..4 {
                let d = &d;
                scope.spawn(move || {
                    for i in 0..=size {
                        let pos = (i + shift * 3) % (size + 1);
                        assert_eq!(d.resolve(pos).unwrap(), d.resolve_no_cache(pos).unwrap());
                    }
                });
            }
        });
        assert_eq!(d.cached_positions(), size + 1);
    }

    #[test]
    fn debug_format_is_compact() {
        let d = doc(vec![p("ab"), line(vec![img()])]);
        assert_eq!(format!("{d:?}"), "doc(paragraph(\"ab\"), line(image))");
    }
}

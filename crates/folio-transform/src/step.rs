//! Atomic edits.
//!
//! A step holds its targets unresolved and resolves them against whatever
//! boundary it is applied to, so steps recorded one after another compose:
//! each sees the snapshot its predecessor produced.

use std::fmt;
use std::sync::Arc;

use folio_model::{
    check_content, replace_outer, Fragment, ModelErrorKind, ModelResult, Node, Position, Slice,
    Target,
};
use folio_schema::Schema;
use folio_types::trace;

/// One edit: a pure function from a boundary node to a new one.
pub trait Step: fmt::Debug + Send + Sync {
    fn apply(&self, boundary: &Node) -> ModelResult<Node>;

    /// Short name used in logs and history.
    fn name(&self) -> &'static str;
}

/// Insert whole nodes at a position between children.
#[derive(Clone, Debug)]
pub struct InsertStep {
    pub at: Target,
    pub content: Fragment,
    schema: Option<Arc<Schema>>,
}

impl InsertStep {
    pub fn new(at: impl Into<Target>, content: impl Into<Fragment>) -> Self {
        Self {
            at: at.into(),
            content: content.into(),
            schema: None,
        }
    }

    /// Check the resulting content against `schema`'s oracle.
    pub fn validated(mut self, schema: Arc<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }
}

impl Step for InsertStep {
    fn apply(&self, boundary: &Node) -> ModelResult<Node> {
        let _op = trace::enter("InsertStep::apply");
        let pos = self.at.resolve(boundary)?;
        let parent = pos.parent();
        if parent.is_text() {
            return Err(ModelErrorKind::InsideText(pos.absolute()).into());
        }
        if parent.is_leaf() {
            return Err(ModelErrorKind::InvalidContent(parent.type_name().to_string()).into());
        }
        let index = pos.index(-1)? as isize;
        let content = parent.content().insert(self.content.clone(), Some(index))?;
        if let Some(schema) = &self.schema {
            check_content(schema, parent.node_type(), &content)?;
        }
        pos.rebuild(-1, parent.copy(content))
    }

    fn name(&self) -> &'static str {
        "insert"
    }
}

/// Remove everything between two positions.
///
/// The removal happens in the deepest node both positions share; nodes
/// straddling either edge are cut, not joined.
#[derive(Clone, Debug)]
pub struct RemoveStep {
    pub from: Target,
    pub to: Target,
}

impl RemoveStep {
    pub fn new(from: impl Into<Target>, to: impl Into<Target>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Step for RemoveStep {
    fn apply(&self, boundary: &Node) -> ModelResult<Node> {
        let _op = trace::enter("RemoveStep::apply");
        let from = self.from.resolve(boundary)?;
        let to = self.to.resolve(boundary)?;
        if from.absolute() > to.absolute() {
            return Err(ModelErrorKind::InvalidRange {
                from: from.absolute(),
                to: to.absolute(),
            }
            .into());
        }
        let depth = Position::common_ancestor(&from, &to)? as isize;
        let node = from.node(depth)?;
        let updated = node.remove(from.relative(depth)?, to.relative(depth)?)?;
        from.rebuild(depth, updated)
    }

    fn name(&self) -> &'static str {
        "remove"
    }
}

/// Replace a range with a slice through [`replace_outer`].
#[derive(Clone, Debug)]
pub struct ReplaceStep {
    pub from: Target,
    pub to: Target,
    pub slice: Slice,
    schema: Option<Arc<Schema>>,
}

impl ReplaceStep {
    pub fn new(from: impl Into<Target>, to: impl Into<Target>, slice: Slice) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            slice,
            schema: None,
        }
    }

    pub fn validated(mut self, schema: Arc<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }
}

impl Step for ReplaceStep {
    fn apply(&self, boundary: &Node) -> ModelResult<Node> {
        let _op = trace::enter("ReplaceStep::apply");
        let from = self.from.resolve(boundary)?;
        let to = self.to.resolve(boundary)?;
        let updated = replace_outer(boundary, &from, &to, &self.slice)?;
        if let Some(schema) = &self.schema {
            // the index path down to the shared ancestor is unchanged by the replace
            let depth = Position::common_ancestor(&from, &to)?;
            let mut parent = &updated;
            for step in &from.steps()[..depth] {
                parent = parent.child(step.index)?;
            }
            check_content(schema, parent.node_type(), parent.content())?;
        }
        Ok(updated)
    }

    fn name(&self) -> &'static str {
        "replace"
    }
}

/// Insert characters into a text node.
///
/// A position between children counts as inside the text node just before
/// it (appending) or, failing that, the one just after it (prepending).
#[derive(Clone, Debug)]
pub struct InsertTextStep {
    pub at: Target,
    pub text: String,
}

impl InsertTextStep {
    pub fn new(at: impl Into<Target>, text: impl Into<String>) -> Self {
        Self {
            at: at.into(),
            text: text.into(),
        }
    }
}

impl Step for InsertTextStep {
    fn apply(&self, boundary: &Node) -> ModelResult<Node> {
        let _op = trace::enter("InsertTextStep::apply");
        let pos = self.at.resolve(boundary)?;
        let hit = text_at(&pos, Lean::Before)
            .or_else(|| text_at(&pos, Lean::After))
            .ok_or(ModelErrorKind::NotInText(pos.absolute()))?;
        let updated = hit.node.insert(hit.offset, self.text.as_str())?;
        hit.rebuild(updated)
    }

    fn name(&self) -> &'static str {
        "insert_text"
    }
}

/// Remove characters from a single text node.
#[derive(Clone, Debug)]
pub struct RemoveTextStep {
    pub from: Target,
    pub to: Target,
}

impl RemoveTextStep {
    pub fn new(from: impl Into<Target>, to: impl Into<Target>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Step for RemoveTextStep {
    fn apply(&self, boundary: &Node) -> ModelResult<Node> {
        let _op = trace::enter("RemoveTextStep::apply");
        let from = self.from.resolve(boundary)?;
        let to = self.to.resolve(boundary)?;
        if from.absolute() > to.absolute() {
            return Err(ModelErrorKind::InvalidRange {
                from: from.absolute(),
                to: to.absolute(),
            }
            .into());
        }
        if from.absolute() == to.absolute() {
            return Ok(boundary.clone());
        }
        let start = text_at(&from, Lean::After).ok_or(ModelErrorKind::NotInText(from.absolute()))?;
        let end = text_at(&to, Lean::Before).ok_or(ModelErrorKind::NotInText(to.absolute()))?;
        if start.path() != end.path() {
            return Err(ModelErrorKind::UnsupportedReplace(
                "text range spans more than one text node".into(),
            )
            .into());
        }
        let updated = start.node.remove(start.offset, end.offset)?;
        start.rebuild(updated)
    }

    fn name(&self) -> &'static str {
        "remove_text"
    }
}

#[derive(Clone, Copy)]
enum Lean {
    Before,
    After,
}

/// A text node reached from a position.
struct TextHit<'a> {
    pos: &'a Position,
    node: Node,
    /// Character offset into `node`.
    offset: usize,
    /// Index of `node` under `pos.parent()` when the position sits between
    /// children; `None` when the position is inside `node` itself.
    child: Option<usize>,
}

impl TextHit<'_> {
    /// Child indices from the boundary down to the text node.
    fn path(&self) -> Vec<usize> {
        self.pos.steps()[..self.pos.depth()]
            .iter()
            .map(|step| step.index)
            .chain(self.child)
            .collect()
    }

    /// Put `updated` where the text node was, rebuilding along the resolved
    /// path. Returns the new boundary.
    fn rebuild(&self, updated: Node) -> ModelResult<Node> {
        match self.child {
            None => self.pos.rebuild(-1, updated),
            Some(index) => {
                let parent = self.pos.parent();
                let content = parent.content().replace_child(updated, index)?;
                self.pos.rebuild(-1, parent.copy(content))
            }
        }
    }
}

/// The text node a position touches, if any.
fn text_at(pos: &Position, lean: Lean) -> Option<TextHit<'_>> {
    if let Some(offset) = pos.text_offset() {
        return Some(TextHit {
            pos,
            node: pos.parent().clone(),
            offset,
            child: None,
        });
    }
    let index = pos.steps()[pos.depth()].index;
    let (node, child, offset) = match lean {
        Lean::Before => {
            let node = pos.node_before().filter(|n| n.is_text())?;
            (node, index - 1, node.content_size())
        }
        Lean::After => {
            let node = pos.node_after().filter(|n| n.is_text())?;
            (node, index, 0)
        }
    };
    Some(TextHit {
        pos,
        node: node.clone(),
        offset,
        child: Some(child),
    })
}

#[cfg(test)]
mod tests {
    use folio_model::{Anchor, Attrs, NodeFactory};
    use folio_schema::{basic_registry, NodeType};

    use super::*;

    fn schema() -> Schema {
        basic_registry().into_schema()
    }

    fn texts(node: &Node) -> Vec<String> {
        node.content().iter().map(Node::text_content).collect()
    }

    #[test]
    fn insert_between_paragraphs() {
        let s = schema();
        let d = s
            .doc(vec![s.text("paragraph", "a").unwrap(), s.text("paragraph", "b").unwrap()])
            .unwrap();
        let step = InsertStep::new(1usize, s.text("header", "h").unwrap());
        let updated = step.apply(&d).unwrap();
        assert_eq!(texts(&updated), vec!["a", "h", "b"]);
        assert_eq!(updated.id(), d.id());
    }

    #[test]
    fn insert_inside_nested_container() {
        let s = schema();
        let line = s
            .node("line", Attrs::new(), vec![s.text("text", "ab").unwrap()])
            .unwrap();
        let d = s.doc(vec![line.clone()]).unwrap();
        let step = InsertStep::new(Anchor::child(&line, None), s.leaf("image", Attrs::new()).unwrap());
        let updated = step.apply(&d).unwrap();
        let names: Vec<_> = updated
            .child(0)
            .unwrap()
            .content()
            .iter()
            .map(|n| n.type_name().to_string())
            .collect();
        assert_eq!(names, vec!["text", "image"]);
    }

    #[test]
    fn insert_inside_text_is_rejected() {
        let s = schema();
        let d = s.doc(vec![s.text("paragraph", "abc").unwrap()]).unwrap();
        let err = InsertStep::new(1usize, s.text("paragraph", "x").unwrap())
            .apply(&d)
            .unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::InsideText(1));
        assert_eq!(err.trace.innermost(), Some("InsertStep::apply"));
    }

    #[test]
    fn validated_insert_consults_oracle() {
        let s = Arc::new(basic_registry().into_schema_with(
            |parent: &NodeType, children: &[&NodeType]| {
                parent.name != "doc" || children.iter().all(|c| c.in_group("block"))
            },
        ));
        let d = s.doc(vec![s.text("paragraph", "a").unwrap()]).unwrap();
        let loose = s.text("text", "loose").unwrap();
        let err = InsertStep::new(0usize, loose.clone())
            .validated(Arc::clone(&s))
            .apply(&d)
            .unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::InvalidContent("doc".into()));
        // unvalidated steps leave the oracle to the caller
        assert!(InsertStep::new(0usize, loose).apply(&d).is_ok());
    }

    #[test]
    fn remove_spanning_children() {
        let s = schema();
        let d = s
            .doc(vec![
                s.text("paragraph", "abc").unwrap(),
                s.text("paragraph", "def").unwrap(),
                s.text("paragraph", "ghi").unwrap(),
            ])
            .unwrap();
        let updated = RemoveStep::new(3usize, 6usize).apply(&d).unwrap();
        assert_eq!(texts(&updated), vec!["abc", "ghi"]);
        assert!(Node::ptr_eq(updated.child(1).unwrap(), d.child(2).unwrap()));
    }

    #[test]
    fn remove_nested_node_by_anchor() {
        let s = schema();
        let keep = s.text("paragraph", "a").unwrap();
        let gone = s.text("paragraph", "b").unwrap();
        let quote = s.node("blockquote", Attrs::new(), vec![keep.clone(), gone.clone()]).unwrap();
        let d = s.doc(vec![quote]).unwrap();
        let updated = RemoveStep::new(Anchor::before(&gone), Anchor::after(&gone))
            .apply(&d)
            .unwrap();
        let quote = updated.child(0).unwrap();
        assert_eq!(quote.child_count(), 1);
        assert!(Node::ptr_eq(quote.child(0).unwrap(), &keep));
    }

    #[test]
    fn remove_reversed_range_errors() {
        let s = schema();
        let d = s.doc(vec![s.text("paragraph", "abc").unwrap()]).unwrap();
        let err = RemoveStep::new(2usize, 1usize).apply(&d).unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::InvalidRange { from: 2, to: 1 });
    }

    #[test]
    fn replace_step_splices_slice() {
        let s = schema();
        let d = s.doc(vec![s.text("paragraph", "hello").unwrap()]).unwrap();
        let step = ReplaceStep::new(1usize, 4usize, Slice::closed(s.text("text", "ipp").unwrap()))
            .validated(Arc::new(schema()));
        let updated = step.apply(&d).unwrap();
        assert_eq!(texts(&updated), vec!["hippo"]);
    }

    #[test]
    fn insert_text_inside_and_next_to_text() {
        let s = schema();
        let d = s
            .doc(vec![s.text("paragraph", "ab").unwrap(), s.text("paragraph", "cd").unwrap()])
            .unwrap();

        let inside = InsertTextStep::new(1usize, "X").apply(&d).unwrap();
        assert_eq!(texts(&inside), vec!["aXb", "cd"]);

        // 2 sits between the paragraphs: text joins the one before it
        let between = InsertTextStep::new(2usize, "!").apply(&d).unwrap();
        assert_eq!(texts(&between), vec!["ab!", "cd"]);

        // 0 has nothing before it: text joins the one after it
        let start = InsertTextStep::new(0usize, ">").apply(&d).unwrap();
        assert_eq!(texts(&start), vec![">ab", "cd"]);
    }

    #[test]
    fn insert_text_away_from_text_fails() {
        let s = schema();
        let quote = s
            .node("blockquote", Attrs::new(), vec![s.text("paragraph", "a").unwrap()])
            .unwrap();
        let d = s.doc(vec![quote]).unwrap();
        let err = InsertTextStep::new(0usize, "x").apply(&d).unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::NotInText(0));
    }

    #[test]
    fn remove_text_to_end_of_node() {
        let s = schema();
        let d = s.doc(vec![s.text("paragraph", "abc").unwrap()]).unwrap();
        // 3 resolves between children, right after the paragraph
        let updated = RemoveTextStep::new(1usize, 3usize).apply(&d).unwrap();
        assert_eq!(texts(&updated), vec!["a"]);
        let same = RemoveTextStep::new(2usize, 2usize).apply(&d).unwrap();
        assert!(Node::ptr_eq(&same, &d));
    }

    #[test]
    fn remove_text_across_nodes_fails() {
        let s = schema();
        let d = s
            .doc(vec![s.text("paragraph", "ab").unwrap(), s.text("paragraph", "cd").unwrap()])
            .unwrap();
        let err = RemoveTextStep::new(1usize, 3usize).apply(&d).unwrap_err();
        assert!(matches!(err.kind, ModelErrorKind::UnsupportedReplace(_)));
    }

    #[test]
    fn text_steps_follow_the_resolved_path() {
        let s = schema();
        let twin = s.text("paragraph", "ab").unwrap();
        // the same instance twice: identity cannot tell the copies apart
        let d = s
            .doc(vec![s.text("paragraph", "x").unwrap(), twin.clone(), twin])
            .unwrap();

        let inside = InsertTextStep::new(4usize, "Z").apply(&d).unwrap();
        assert_eq!(texts(&inside), vec!["x", "ab", "aZb"]);
        assert!(Node::ptr_eq(inside.child(1).unwrap(), d.child(1).unwrap()));

        let appended = InsertTextStep::new(5usize, "!").apply(&d).unwrap();
        assert_eq!(texts(&appended), vec!["x", "ab", "ab!"]);

        let removed = RemoveTextStep::new(3usize, 4usize).apply(&d).unwrap();
        assert_eq!(texts(&removed), vec!["x", "ab", "b"]);

        let err = RemoveTextStep::new(2usize, 4usize).apply(&d).unwrap_err();
        assert!(matches!(err.kind, ModelErrorKind::UnsupportedReplace(_)));
    }

    #[test]
    fn validated_replace_checks_nested_parent() {
        let strict = Arc::new(basic_registry().into_schema_with(
            |parent: &NodeType, children: &[&NodeType]| {
                parent.name != "blockquote" || children.iter().all(|c| c.name != "header")
            },
        ));
        let s = schema();
        let quote = s
            .node(
                "blockquote",
                Attrs::new(),
                vec![s.text("paragraph", "a").unwrap(), s.text("paragraph", "b").unwrap()],
            )
            .unwrap();
        let d = s.doc(vec![quote]).unwrap();
        let slice = Slice::closed(s.text("header", "h").unwrap());

        let err = ReplaceStep::new(2usize, 3usize, slice.clone())
            .validated(strict)
            .apply(&d)
            .unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::InvalidContent("blockquote".into()));

        let updated = ReplaceStep::new(2usize, 3usize, slice)
            .validated(Arc::new(schema()))
            .apply(&d)
            .unwrap();
        assert_eq!(texts(updated.child(0).unwrap()), vec!["a", "h"]);
    }
}

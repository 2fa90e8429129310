//! Transactions: ordered step logs over one original document.

use std::fmt;
use std::sync::Arc;

use folio_diff::Diff;
use folio_model::{Anchor, Insertion, ModelError, ModelErrorKind, Node, Position, Slice, Target};
use folio_schema::Schema;
use folio_types::trace;
use tracing::{debug, warn};

use crate::error::TransformResult;
use crate::step::{InsertStep, InsertTextStep, RemoveStep, RemoveTextStep, ReplaceStep, Step};

/// A sequence of steps applied to an original document.
///
/// Steps apply strictly in submission order, each to the snapshot the
/// previous one produced. After every step the transaction records a diff
/// from the original to the new snapshot, so `diffs()[i]` is the cumulative
/// effect of `steps()[..=i]`.
pub struct Transaction {
    original: Node,
    current: Node,
    schema: Arc<Schema>,
    validate_content: bool,
    steps: Vec<Box<dyn Step>>,
    diffs: Vec<Diff>,
}

impl Transaction {
    /// Start a transaction on `original`. Structural edits made through the
    /// sugar methods are checked against `schema`.
    pub fn new(original: Node, schema: Arc<Schema>) -> Self {
        Self {
            current: original.clone(),
            original,
            schema,
            validate_content: true,
            steps: Vec::new(),
            diffs: Vec::new(),
        }
    }

    /// Turn the content oracle check on structural sugar on or off.
    pub fn with_validation(mut self, validate_content: bool) -> Self {
        self.validate_content = validate_content;
        self
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn original(&self) -> &Node {
        &self.original
    }

    /// The snapshot after the last step: the last diff's modified tree, or
    /// the original when nothing was applied.
    pub fn modified(&self) -> &Node {
        &self.current
    }

    pub fn steps(&self) -> &[Box<dyn Step>] {
        &self.steps
    }

    pub fn diffs(&self) -> &[Diff] {
        &self.diffs
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns `true` if the modified document differs from the original.
    pub fn doc_changed(&self) -> bool {
        !Node::ptr_eq(&self.original, &self.current) && self.original != self.current
    }

    // ---------------------------------------------------------------
    // Step application
    // ---------------------------------------------------------------

    /// Apply `step` to the current snapshot, propagating any failure.
    pub fn step(&mut self, step: impl Step + 'static) -> TransformResult<&mut Self> {
        let _op = trace::enter("Transaction::step");
        let next = step.apply(&self.current)?;
        self.commit(Box::new(step), next);
        Ok(self)
    }

    /// Apply `step` if it succeeds. A failed step leaves the transaction
    /// untouched and is only logged.
    pub fn soft_step(&mut self, step: impl Step + 'static) -> bool {
        let _op = trace::enter("Transaction::soft_step");
        match step.apply(&self.current) {
            Ok(next) => {
                self.commit(Box::new(step), next);
                true
            }
            Err(err) => {
                warn!(step = step.name(), error = %err, "discarded failed step");
                false
            }
        }
    }

    fn commit(&mut self, step: Box<dyn Step>, next: Node) {
        let diff = Diff::between(&self.original, &next);
        debug!(
            step = step.name(),
            index = self.steps.len(),
            changes = diff.len(),
            "applied step"
        );
        self.steps.push(step);
        self.diffs.push(diff);
        self.current = next;
    }

    // ---------------------------------------------------------------
    // Sugar
    // ---------------------------------------------------------------

    /// Insert text or nodes at `at`.
    ///
    /// Text becomes an [`InsertTextStep`]; nodes become an [`InsertStep`],
    /// which cannot land inside a text node.
    pub fn insert(
        &mut self,
        at: impl Into<Target>,
        content: impl Into<Insertion>,
    ) -> TransformResult<&mut Self> {
        let at = at.into();
        match content.into() {
            Insertion::Text(text) => self.step(InsertTextStep::new(at, text)),
            Insertion::Nodes(nodes) => {
                let pos = at.resolve(&self.current)?;
                if pos.is_in_text() {
                    return Err(ModelError::from(ModelErrorKind::InsideText(pos.absolute())).into());
                }
                let mut step = InsertStep::new(at, nodes);
                if self.validate_content {
                    step = step.validated(Arc::clone(&self.schema));
                }
                self.step(step)
            }
        }
    }

    pub fn insert_text(&mut self, at: impl Into<Target>, text: &str) -> TransformResult<&mut Self> {
        self.step(InsertTextStep::new(at, text))
    }

    /// Remove a range: character-level when both ends fall inside the same
    /// text node, structural otherwise.
    pub fn remove(&mut self, from: impl Into<Target>, to: impl Into<Target>) -> TransformResult<&mut Self> {
        let (from, to) = (from.into(), to.into());
        let start = from.resolve(&self.current)?;
        let end = to.resolve(&self.current)?;
        let same_text = start.is_in_text()
            && end.is_in_text()
            && start.depth() == end.depth()
            && Position::common_ancestor(&start, &end)? == start.depth();
        if same_text {
            self.step(RemoveTextStep::new(from, to))
        } else {
            self.step(RemoveStep::new(from, to))
        }
    }

    pub fn remove_text(&mut self, from: impl Into<Target>, to: impl Into<Target>) -> TransformResult<&mut Self> {
        self.step(RemoveTextStep::new(from, to))
    }

    pub fn replace(
        &mut self,
        from: impl Into<Target>,
        to: impl Into<Target>,
        slice: Slice,
    ) -> TransformResult<&mut Self> {
        let mut step = ReplaceStep::new(from, to, slice);
        if self.validate_content {
            step = step.validated(Arc::clone(&self.schema));
        }
        self.step(step)
    }

    /// Remove `node` wherever it currently lives, found by id.
    pub fn delete_node(&mut self, node: &Node) -> TransformResult<&mut Self> {
        self.step(RemoveStep::new(Anchor::before(node), Anchor::after(node)))
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("original", &self.original)
            .field("modified", &self.current)
            .field("steps", &self.steps)
            .finish()
    }
}

//! The editor facade: one current document, committed through transactions.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use folio_diff::Diff;
use folio_model::{Attrs, Fragment, Node, NodeFactory};
use folio_schema::Schema;
use folio_transform::Transaction;
use serde_json::Value;
use tracing::debug;

use crate::config::EditorConfig;
use crate::error::{SdkError, SdkResult};
use crate::view::{render_tree, NodeView, RenderTree};

/// One committed step.
#[derive(Clone, Debug)]
pub struct HistoryRecord {
    /// Position of this step among every step the editor has committed,
    /// counting from zero. Unaffected by history trimming.
    pub sequence: u64,
    /// [`Step::name`](folio_transform::Step::name) of the applied step.
    pub step: &'static str,
    /// Diff from the transaction's original document to the snapshot
    /// after this step.
    pub diff: Diff,
}

/// Holds the current document and the history of committed steps.
pub struct Editor {
    schema: Arc<Schema>,
    config: EditorConfig,
    document: Node,
    history: VecDeque<HistoryRecord>,
    committed: u64,
}

impl Editor {
    /// Create an editor holding an empty document of `config.document_type`.
    pub fn new(schema: Arc<Schema>, config: EditorConfig) -> SdkResult<Self> {
        let document = schema.node(&config.document_type, Attrs::new(), Fragment::empty())?;
        Ok(Self::with_document(schema, config, document))
    }

    /// Create an editor around an existing document.
    pub fn with_document(schema: Arc<Schema>, config: EditorConfig, document: Node) -> Self {
        Self {
            schema,
            config,
            document,
            history: VecDeque::new(),
            committed: 0,
        }
    }

    /// Create an editor from the JSON form produced by [`Editor::to_json`].
    pub fn from_json(schema: Arc<Schema>, config: EditorConfig, value: &Value) -> SdkResult<Self> {
        let document = Node::from_json(&schema, value)?;
        Ok(Self::with_document(schema, config, document))
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn document(&self) -> &Node {
        &self.document
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Committed steps, oldest first.
    pub fn history(&self) -> &VecDeque<HistoryRecord> {
        &self.history
    }

    /// Total number of steps committed, including trimmed ones.
    pub fn committed_steps(&self) -> u64 {
        self.committed
    }

    pub fn to_json(&self) -> SdkResult<Value> {
        Ok(self.document.to_json()?)
    }

    // ---------------------------------------------------------------
    // Editing
    // ---------------------------------------------------------------

    /// Start a transaction on the current document.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.document.clone(), Arc::clone(&self.schema))
            .with_validation(self.config.validate_content)
    }

    /// Commit `tx`. The transaction must have been started on the current
    /// document; otherwise it is rejected and nothing changes.
    pub fn apply(&mut self, tx: Transaction) -> SdkResult<()> {
        if !Node::ptr_eq(tx.original(), &self.document) {
            return Err(SdkError::StaleTransaction);
        }

        for (step, diff) in tx.steps().iter().zip(tx.diffs()) {
            self.history.push_back(HistoryRecord {
                sequence: self.committed,
                step: step.name(),
                diff: diff.clone(),
            });
            self.committed += 1;
        }
        if let Some(max) = self.config.max_history {
            while self.history.len() > max {
                self.history.pop_front();
            }
        }

        debug!(
            steps = tx.steps().len(),
            changed = tx.doc_changed(),
            history = self.history.len(),
            "committed transaction"
        );
        self.document = tx.modified().clone();
        Ok(())
    }

    /// Render the current document through `view`.
    pub fn render<R>(&self, view: &dyn NodeView<Output = R>) -> RenderTree<R> {
        render_tree(view, &self.document)
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document.type_name())
            .field("size", &self.document.content().size())
            .field("history", &self.history.len())
            .field("config", &self.config)
            .finish()
    }
}

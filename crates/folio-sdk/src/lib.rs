//! Editor facade for the Folio document model.
//!
//! An [`Editor`] owns the current document of one schema. Edits are made on
//! a [`Transaction`] obtained from the editor and committed back with
//! [`Editor::apply`], which records every step in the editor's history.
//! Views render the document through [`NodeView`] hooks.
//!
//! # Key Types
//!
//! - [`Editor`] -- Current document plus step history
//! - [`EditorConfig`] -- Validation, history and root type settings (TOML)
//! - [`NodeView`] / [`Rendered`] / [`RenderTree`] -- Render hooks
//! - [`SdkError`] -- Errors surfaced by the facade

pub mod config;
pub mod editor;
pub mod error;
pub mod view;

pub use config::EditorConfig;
pub use editor::{Editor, HistoryRecord};
pub use error::{SdkError, SdkResult};
pub use view::{render_tree, NodeView, RenderTree, Rendered};

pub use folio_diff::{Change, ChangeKind, Diff};
pub use folio_model::{Anchor, Attrs, Fragment, Node, NodeFactory, Position, Slice, Target};
pub use folio_schema::{basic_registry, Registry, Schema};
pub use folio_transform::{Step, Transaction};
pub use folio_types::NodeId;

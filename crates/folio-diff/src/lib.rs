//! Tree diff for the Folio document model.
//!
//! Compares two snapshots of a document and produces the list of changes
//! between them. Children are aligned by a longest common subsequence over
//! their markup, and edited text is reported as a whole-node replace.
//!
//! # Key Types
//!
//! - [`Change`] / [`ChangeKind`] -- One insert, remove, or replace
//! - [`Diff`] -- Boundary plus changes, with the modified tree
//! - [`compare_nodes`] / [`align`] -- The comparison and its LCS alignment

pub mod change;
pub mod compare;
pub mod diff;
pub mod error;

pub use change::{Change, ChangeKind};
pub use compare::{align, compare_nodes, Alignment};
pub use diff::Diff;
pub use error::{DiffError, DiffResult};

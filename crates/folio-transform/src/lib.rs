//! Steps and transactions for the Folio document model.
//!
//! A [`Step`] is a pure function from one snapshot to the next. A
//! [`Transaction`] applies steps in order to an original document and keeps
//! a cumulative [`Diff`](folio_diff::Diff) after each one.
//!
//! # Key Types
//!
//! - [`Step`] -- The step contract
//! - [`InsertStep`] / [`RemoveStep`] / [`ReplaceStep`] -- Structural edits
//! - [`InsertTextStep`] / [`RemoveTextStep`] -- Character edits
//! - [`Transaction`] -- Ordered step log with per-step diffs

pub mod error;
pub mod step;
pub mod transaction;

pub use error::{TransformError, TransformResult};
pub use step::{InsertStep, InsertTextStep, RemoveStep, RemoveTextStep, ReplaceStep, Step};
pub use transaction::Transaction;

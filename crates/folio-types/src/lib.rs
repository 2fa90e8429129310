//! Foundation types for the Folio document model.
//!
//! This crate provides the identity and diagnostic primitives shared by every
//! other Folio crate.
//!
//! # Key Types
//!
//! - [`NodeId`] -- Opaque per-instance node identifier (UUID v7)
//! - [`Trace`] -- Snapshot of the named-operation stack, attached to errors
//! - [`ContractViolation`] -- Panic payload for programmer errors
//!
//! # Two error tiers
//!
//! Expected failures (a position that does not resolve, a node that is not
//! present) are returned as `Result` values by the crates that own them.
//! Programmer errors (wrong argument kind for a node's schema, inconsistent
//! slice depths, duplicate registrations) are raised with [`violation`] and
//! are not meant to be recovered from.

pub mod error;
pub mod id;
pub mod trace;

pub use error::TypeError;
pub use id::NodeId;
pub use trace::{enter, violation, ContractViolation, OpGuard, Trace};

//! Foundation types for Tally.
//!
//! Tally persists typed records and binary files as plain files inside a git
//! working tree. This crate holds the types every other Tally crate shares.
//!
//! # Key Types
//!
//! - [`Record`]: Capability implemented by every persisted record type
//! - [`Author`]: Fixed author identity stamped on every history entry
//! - [`document_identity`]: Identity lookup for untyped JSON documents
//! - [`TypeError`]: Identity and author validation failures

pub mod author;
pub mod error;
pub mod identity;
pub mod record;

pub use author::Author;
pub use error::TypeError;
pub use identity::{document_identity, IDENTITY_FIELD};
pub use record::{resolve_identity, Record};

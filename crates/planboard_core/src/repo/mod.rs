//! Durable key-value byte storage.
//!
//! # Responsibility
//! - Define the blob store contract used by the persistence adapter.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - A multi-key write is all-or-nothing.

pub mod blob_repo;

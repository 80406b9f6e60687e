//! Board use-case services.
//!
//! # Responsibility
//! - Own the in-memory record collections and their rules.
//! - Mirror state into durable storage.
//! - Keep front ends decoupled from storage details.

pub mod board_session;
pub mod clock;
pub mod persistence;
pub mod record_store;

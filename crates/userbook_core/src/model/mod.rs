//! Domain records for users and the books they own.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//!
//! # Invariants
//! - Identifiers are storage-assigned; `None` means "not yet persisted".
//! - A book belongs to exactly one user through `owner_id`.

pub mod book;
pub mod user;

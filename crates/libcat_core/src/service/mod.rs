//! In-memory catalog services.
//!
//! # Responsibility
//! - Number authors and books and keep them in insertion order.
//! - Enforce creation-time validation and report lookups of missing ids.
//!
//! # Invariants
//! - Ids come from an injected `IdGenerator` and are never reused.
//! - Services are single-owner: writes take `&mut self` and callers sharing a
//!   service across threads must wrap it in their own lock.

pub mod author_service;
pub mod book_service;
pub mod ids;

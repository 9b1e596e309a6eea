//! Catalog domain model.
//!
//! # Responsibility
//! - Define the author and book records shared by services and storage.
//! - Keep book variant behavior (late fees, access instructions) in one place.
//!
//! # Invariants
//! - A book title is never blank and its year never exceeds `MAX_PUBLISH_YEAR`.
//! - E-book file size is never negative.
//! - Id `0` marks a record that has not been assigned an id yet.

pub mod author;
pub mod book;
pub mod capability;

/// Id value carried by records that no service or store has numbered yet.
pub const UNASSIGNED_ID: i64 = 0;

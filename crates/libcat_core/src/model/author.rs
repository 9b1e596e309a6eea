//! Author domain model.
//!
//! # Responsibility
//! - Define the author record referenced (not owned) by books.
//!
//! # Invariants
//! - `name` is non-blank.
//! - `id` is assigned once by the owning service or store.

use super::UNASSIGNED_ID;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Numeric author identifier (SQLite rowid compatible).
pub type AuthorId = i64;

/// Validation failures for author construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorValidationError {
    EmptyName,
}

impl Display for AuthorValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "author name cannot be empty"),
        }
    }
}

impl Error for AuthorValidationError {}

/// Book author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AuthorWire")]
pub struct Author {
    id: AuthorId,
    name: String,
    birth_year: i32,
    nationality: String,
}

#[derive(Deserialize)]
struct AuthorWire {
    id: AuthorId,
    name: String,
    birth_year: i32,
    nationality: String,
}

impl TryFrom<AuthorWire> for Author {
    type Error = AuthorValidationError;

    fn try_from(value: AuthorWire) -> Result<Self, Self::Error> {
        Self::with_id(value.id, value.name, value.birth_year, value.nationality)
    }
}

impl Author {
    /// Creates an author that has not been numbered yet.
    pub fn new(
        name: impl Into<String>,
        birth_year: i32,
        nationality: impl Into<String>,
    ) -> Result<Self, AuthorValidationError> {
        Self::with_id(UNASSIGNED_ID, name, birth_year, nationality)
    }

    /// Creates an author with a known id, as read back from storage.
    pub fn with_id(
        id: AuthorId,
        name: impl Into<String>,
        birth_year: i32,
        nationality: impl Into<String>,
    ) -> Result<Self, AuthorValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AuthorValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            birth_year,
            nationality: nationality.into(),
        })
    }

    pub fn id(&self) -> AuthorId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: AuthorId) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birth_year(&self) -> i32 {
        self.birth_year
    }

    pub fn nationality(&self) -> &str {
        &self.nationality
    }
}

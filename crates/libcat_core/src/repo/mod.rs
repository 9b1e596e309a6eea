//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for authors and books.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Write paths validate entities before SQL mutations.
//! - Lookups report "missing" as `Ok(None)` and storage failures as `Err`;
//!   the two are never conflated.
//! - Every failure is logged before it is returned.

use crate::db::DbError;
use crate::model::author::{AuthorId, AuthorValidationError};
use crate::model::book::{BookId, BookKind, BookValidationError};
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author_repo;
pub mod book_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    AuthorValidation(AuthorValidationError),
    Db(DbError),
    BookNotFound(BookId),
    AuthorNotFound(AuthorId),
    DuplicateIsbn(String),
    /// Stored discriminator is not one of the known book types.
    UnknownBookType(String),
    /// Entity variant does not match the operation it was passed to.
    KindMismatch {
        expected: BookKind,
        actual: BookKind,
    },
    InvalidData(String),
}

impl RepoError {
    /// Returns whether this error reports a missing record rather than a
    /// storage or data failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BookNotFound(_) | Self::AuthorNotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::AuthorValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::BookNotFound(id) => write!(f, "book with id {id} not found"),
            Self::AuthorNotFound(id) => write!(f, "author with id {id} not found"),
            Self::DuplicateIsbn(isbn) => write!(f, "book with isbn `{isbn}` already exists"),
            Self::UnknownBookType(value) => write!(f, "unknown book type `{value}`"),
            Self::KindMismatch { expected, actual } => {
                write!(f, "expected a {expected} book, got {actual}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::AuthorValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AuthorValidationError> for RepoError {
    fn from(value: AuthorValidationError) -> Self {
        Self::AuthorValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Logs a failed repository call and hands the result back unchanged.
pub(crate) fn logged<T>(event: &'static str, result: RepoResult<T>) -> RepoResult<T> {
    if let Err(err) = &result {
        if err.is_not_found() {
            warn!("event={event} module=repo status=not_found error={err}");
        } else {
            error!("event={event} module=repo status=error error={err}");
        }
    }
    result
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

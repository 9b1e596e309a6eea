//! Book use-case service.
//!
//! # Responsibility
//! - Validate, number and store e-books and printed books in memory.
//! - Provide lookup, in-place mutation and deletion by id.
//!
//! # Invariants
//! - A book that fails validation is never stored and consumes no id.
//! - `get_book_by_id_mut` hands out the stored entity, so mutations are
//!   visible to later scans.
//! - Lookups of a missing id fail with `CatalogError::ResourceNotFound`.

use crate::model::author::AuthorValidationError;
use crate::model::book::{Book, BookId, BookKind, BookValidationError};
use crate::repo::RepoError;
use crate::service::ids::{IdGenerator, SequentialIdGenerator};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error taxonomy reported to catalog callers.
#[derive(Debug)]
pub enum CatalogError {
    /// Input failed validation (blank title, negative file size, wrong variant).
    InvalidInput(String),
    /// No book has the requested id.
    ResourceNotFound(BookId),
    /// The resource collides with an existing one (duplicate ISBN).
    DuplicateResource(String),
    /// Storage-layer failure.
    Storage(RepoError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::ResourceNotFound(id) => write!(f, "book with id {id} not found"),
            Self::DuplicateResource(message) => write!(f, "duplicate resource: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for CatalogError {
    fn from(value: BookValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

impl From<AuthorValidationError> for CatalogError {
    fn from(value: AuthorValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::BookNotFound(id) => Self::ResourceNotFound(id),
            RepoError::DuplicateIsbn(isbn) => {
                Self::DuplicateResource(format!("book with isbn `{isbn}` already exists"))
            }
            RepoError::Validation(err) => err.into(),
            RepoError::AuthorValidation(err) => err.into(),
            RepoError::KindMismatch { expected, actual } => {
                Self::InvalidInput(format!("expected a {expected} book, got {actual}"))
            }
            other => Self::Storage(other),
        }
    }
}

/// In-memory book catalog.
pub struct BookService<G: IdGenerator = SequentialIdGenerator> {
    books: Vec<Book>,
    ids: G,
}

impl BookService {
    /// Creates an empty catalog numbering from 1.
    pub fn new() -> Self {
        Self::with_id_generator(SequentialIdGenerator::new())
    }
}

impl Default for BookService {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> BookService<G> {
    pub fn with_id_generator(ids: G) -> Self {
        Self {
            books: Vec::new(),
            ids,
        }
    }

    /// Validates and stores an e-book, returning its assigned id.
    pub fn create_ebook(&mut self, book: Book) -> Result<BookId, CatalogError> {
        self.create(book, BookKind::EBook)
    }

    /// Validates and stores a printed book, returning its assigned id.
    pub fn create_printed_book(&mut self, book: Book) -> Result<BookId, CatalogError> {
        self.create(book, BookKind::Printed)
    }

    /// Returns all books in insertion order.
    pub fn get_all_books(&self) -> &[Book] {
        &self.books
    }

    pub fn get_book_by_id(&self, id: BookId) -> Result<&Book, CatalogError> {
        self.books
            .iter()
            .find(|book| book.id() == id)
            .ok_or(CatalogError::ResourceNotFound(id))
    }

    /// Returns the stored book for in-place mutation.
    pub fn get_book_by_id_mut(&mut self, id: BookId) -> Result<&mut Book, CatalogError> {
        self.books
            .iter_mut()
            .find(|book| book.id() == id)
            .ok_or(CatalogError::ResourceNotFound(id))
    }

    /// Removes the book with `id` and hands it back.
    pub fn delete_book_by_id(&mut self, id: BookId) -> Result<Book, CatalogError> {
        let index = self
            .books
            .iter()
            .position(|book| book.id() == id)
            .ok_or(CatalogError::ResourceNotFound(id))?;
        let removed = self.books.remove(index);
        debug!("event=book_delete module=service status=ok id={id}");
        Ok(removed)
    }

    fn create(&mut self, mut book: Book, expected: BookKind) -> Result<BookId, CatalogError> {
        validate_book(&book, expected)?;

        let id = self.ids.next_id();
        book.set_id(id);
        debug!(
            "event=book_create module=service status=ok id={id} kind={}",
            book.kind()
        );
        self.books.push(book);
        Ok(id)
    }
}

fn validate_book(book: &Book, expected: BookKind) -> Result<(), CatalogError> {
    if book.kind() != expected {
        return Err(CatalogError::InvalidInput(format!(
            "expected a {expected} book, got {}",
            book.kind()
        )));
    }
    if book.title().trim().is_empty() {
        return Err(CatalogError::InvalidInput(
            "book title cannot be empty".to_string(),
        ));
    }
    if let Some(digital) = book.as_digital_access() {
        if digital.file_size().is_nan() || digital.file_size() < 0.0 {
            return Err(CatalogError::InvalidInput(
                "file size cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}

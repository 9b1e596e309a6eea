//! Core domain logic for the library catalog.
//!
//! Books come in two closed variants (e-book, printed) sharing one record
//! shape. They are managed either by the in-memory services or by the SQLite
//! repositories, which map both variants onto a single `books` table.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::author::{Author, AuthorId, AuthorValidationError};
pub use model::book::{
    Book, BookFormat, BookId, BookKind, BookValidationError, EBook, PrintedBook, MAX_PUBLISH_YEAR,
};
pub use model::capability::{Borrowable, Capability, DigitalAccess};
pub use model::UNASSIGNED_ID;
pub use repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
pub use repo::book_repo::{BookRepository, BookUpdate, SqliteBookRepository};
pub use repo::{RepoError, RepoResult};
pub use service::author_service::AuthorService;
pub use service::book_service::{BookService, CatalogError};
pub use service::ids::{IdGenerator, SequentialIdGenerator};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

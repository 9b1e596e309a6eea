//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Map both book variants onto the single `books` table, using the
//!   `book_type` discriminator to choose the column set.
//! - Rebuild the owning author for every materialized row.
//!
//! # Invariants
//! - Columns that do not apply to a row's variant are stored as NULL.
//! - A row whose discriminator is unknown is reported as
//!   `RepoError::UnknownBookType`, never skipped and never written.
//! - Inserts ignore the entity id; SQLite assigns it.

use super::author_repo::{AuthorRepository, SqliteAuthorRepository};
use super::{bool_to_int, logged, RepoError, RepoResult};
use crate::db::ensure_connection_ready;
use crate::model::author::{Author, AuthorId};
use crate::model::book::{
    validate_file_size, validate_title, validate_weight, validate_year, Book, BookFormat, BookId,
    BookKind, EBook, PrintedBook,
};
use crate::model::capability::DigitalAccess;
use rusqlite::ffi::{SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_UNIQUE};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::collections::HashMap;
use std::sync::Arc;

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    isbn,
    author_id,
    publish_year,
    book_type,
    download_url,
    file_size,
    shelf_location,
    weight,
    available
FROM books";

const BOOK_UPDATE_SQL: &str = "UPDATE books
 SET
    title = ?1,
    isbn = ?2,
    author_id = ?3,
    publish_year = ?4,
    file_size = ?5,
    download_url = ?6,
    shelf_location = ?7,
    weight = ?8
 WHERE id = ?9;";

/// Full replacement values for `BookRepository::update_book`.
///
/// Carries the fields of both variants; the stored discriminator decides
/// which set is written and the other is cleared to NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct BookUpdate {
    pub title: String,
    pub isbn: String,
    pub author_id: AuthorId,
    pub publish_year: i32,
    pub file_size: f64,
    pub download_url: String,
    pub shelf_location: String,
    pub weight: f64,
}

impl BookUpdate {
    /// Captures the current field values of `book`.
    ///
    /// Fields belonging to the other variant are left empty.
    pub fn from_book(book: &Book) -> Self {
        let mut update = Self {
            title: book.title().to_string(),
            isbn: book.isbn().to_string(),
            author_id: book.author().id(),
            publish_year: book.year(),
            file_size: 0.0,
            download_url: String::new(),
            shelf_location: String::new(),
            weight: 0.0,
        };
        match book.format() {
            BookFormat::EBook(edition) => {
                update.file_size = edition.file_size();
                update.download_url = edition.download_url().to_string();
            }
            BookFormat::Printed(edition) => {
                update.shelf_location = edition.shelf_location().to_string();
                update.weight = edition.weight();
            }
        }
        update
    }
}

/// Repository interface for book persistence.
pub trait BookRepository {
    /// Inserts an e-book row and returns its stored id.
    fn add_ebook(&self, book: &Book) -> RepoResult<BookId>;
    /// Inserts a printed-book row and returns its stored id.
    fn add_printed_book(&self, book: &Book) -> RepoResult<BookId>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn get_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>>;
    /// Lists every book ordered by id.
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    /// Replaces the stored fields of one book, keeping its variant.
    fn update_book(&self, id: BookId, update: &BookUpdate) -> RepoResult<()>;
    /// Persists the lending state of one book.
    fn set_available(&self, id: BookId, available: bool) -> RepoResult<()>;
    fn delete_book(&self, id: BookId) -> RepoResult<()>;

    /// Inserts `book` through the variant-specific entry point.
    fn add_book(&self, book: &Book) -> RepoResult<BookId> {
        match book.kind() {
            BookKind::EBook => self.add_ebook(book),
            BookKind::Printed => self.add_printed_book(book),
        }
    }
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
    authors: SqliteAuthorRepository<'conn>,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["books"])?;
        let authors = SqliteAuthorRepository::try_new(conn)?;
        Ok(Self { conn, authors })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn add_ebook(&self, book: &Book) -> RepoResult<BookId> {
        logged("book_insert", self.insert_ebook(book))
    }

    fn add_printed_book(&self, book: &Book) -> RepoResult<BookId> {
        logged("book_insert", self.insert_printed_book(book))
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        logged(
            "book_get",
            self.select_one(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"), &id),
        )
    }

    fn get_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>> {
        logged(
            "book_get_by_isbn",
            self.select_one(&format!("{BOOK_SELECT_SQL} WHERE isbn = ?1;"), &isbn),
        )
    }

    fn list_books(&self) -> RepoResult<Vec<Book>> {
        logged("book_list", self.select_all())
    }

    fn update_book(&self, id: BookId, update: &BookUpdate) -> RepoResult<()> {
        logged("book_update", self.apply_update(id, update))
    }

    fn set_available(&self, id: BookId, available: bool) -> RepoResult<()> {
        logged("book_set_available", self.write_available(id, available))
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        logged("book_delete", self.delete_row(id))
    }
}

impl SqliteBookRepository<'_> {
    fn insert_ebook(&self, book: &Book) -> RepoResult<BookId> {
        let BookFormat::EBook(edition) = book.format() else {
            return Err(RepoError::KindMismatch {
                expected: BookKind::EBook,
                actual: book.kind(),
            });
        };
        book.validate()?;

        self.conn
            .execute(
                "INSERT INTO books (
                    title,
                    isbn,
                    author_id,
                    publish_year,
                    book_type,
                    download_url,
                    file_size,
                    available
                ) VALUES (?1, ?2, ?3, ?4, 'EBOOK', ?5, ?6, ?7);",
                params![
                    book.title(),
                    book.isbn(),
                    book.author().id(),
                    book.year(),
                    edition.download_url(),
                    edition.file_size(),
                    bool_to_int(book.is_available()),
                ],
            )
            .map_err(|err| map_write_error(err, book.isbn(), book.author().id()))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn insert_printed_book(&self, book: &Book) -> RepoResult<BookId> {
        let BookFormat::Printed(edition) = book.format() else {
            return Err(RepoError::KindMismatch {
                expected: BookKind::Printed,
                actual: book.kind(),
            });
        };
        book.validate()?;

        self.conn
            .execute(
                "INSERT INTO books (
                    title,
                    isbn,
                    author_id,
                    publish_year,
                    book_type,
                    shelf_location,
                    weight,
                    available
                ) VALUES (?1, ?2, ?3, ?4, 'PRINTED', ?5, ?6, ?7);",
                params![
                    book.title(),
                    book.isbn(),
                    book.author().id(),
                    book.year(),
                    edition.shelf_location(),
                    edition.weight(),
                    bool_to_int(book.is_available()),
                ],
            )
            .map_err(|err| map_write_error(err, book.isbn(), book.author().id()))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn select_one(&self, sql: &str, key: &dyn ToSql) -> RepoResult<Option<Book>> {
        let mut stmt = self.conn.prepare(sql)?;
        let Some(row) = stmt.query_row([key], BookRow::read).optional()? else {
            return Ok(None);
        };

        let mut authors = HashMap::new();
        self.materialize(row, &mut authors).map(Some)
    }

    fn select_all(&self) -> RepoResult<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
        let rows = stmt
            .query_map([], BookRow::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // One lookup per distinct author for the whole scan.
        let mut authors = HashMap::new();
        rows.into_iter()
            .map(|row| self.materialize(row, &mut authors))
            .collect()
    }

    fn apply_update(&self, id: BookId, update: &BookUpdate) -> RepoResult<()> {
        validate_title(&update.title)?;
        validate_year(update.publish_year)?;

        let stored_type: Option<String> = self
            .conn
            .query_row("SELECT book_type FROM books WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;
        let stored_type = stored_type.ok_or(RepoError::BookNotFound(id))?;
        let kind =
            BookKind::parse(&stored_type).ok_or(RepoError::UnknownBookType(stored_type))?;

        let (file_size, download_url, shelf_location, weight) = match kind {
            BookKind::EBook => {
                validate_file_size(update.file_size)?;
                (
                    Some(update.file_size),
                    Some(update.download_url.as_str()),
                    None,
                    None,
                )
            }
            BookKind::Printed => {
                validate_weight(update.weight)?;
                (
                    None,
                    None,
                    Some(update.shelf_location.as_str()),
                    Some(update.weight),
                )
            }
        };

        let changed = self
            .conn
            .execute(
                BOOK_UPDATE_SQL,
                params![
                    update.title,
                    update.isbn,
                    update.author_id,
                    update.publish_year,
                    file_size,
                    download_url,
                    shelf_location,
                    weight,
                    id,
                ],
            )
            .map_err(|err| map_write_error(err, &update.isbn, update.author_id))?;

        if changed == 0 {
            return Err(RepoError::BookNotFound(id));
        }
        Ok(())
    }

    fn write_available(&self, id: BookId, available: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE books SET available = ?2 WHERE id = ?1;",
            params![id, bool_to_int(available)],
        )?;
        if changed == 0 {
            return Err(RepoError::BookNotFound(id));
        }
        Ok(())
    }

    fn delete_row(&self, id: BookId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::BookNotFound(id));
        }
        Ok(())
    }

    fn materialize(
        &self,
        row: BookRow,
        authors: &mut HashMap<AuthorId, Arc<Author>>,
    ) -> RepoResult<Book> {
        let kind = BookKind::parse(&row.book_type)
            .ok_or_else(|| RepoError::UnknownBookType(row.book_type.clone()))?;
        let author = self.resolve_author(row.author_id, authors)?;

        let format = match kind {
            BookKind::EBook => BookFormat::EBook(EBook::new(
                required(row.file_size, "file_size", row.id)?,
                required(row.download_url, "download_url", row.id)?,
            )?),
            BookKind::Printed => BookFormat::Printed(PrintedBook::new(
                required(row.shelf_location, "shelf_location", row.id)?,
                required(row.weight, "weight", row.id)?,
            )?),
        };

        let mut book = Book::new(
            row.id,
            row.title,
            author,
            row.publish_year,
            row.isbn,
            format,
        )?;
        book.set_available(row.available);
        Ok(book)
    }

    fn resolve_author(
        &self,
        author_id: AuthorId,
        authors: &mut HashMap<AuthorId, Arc<Author>>,
    ) -> RepoResult<Arc<Author>> {
        if let Some(author) = authors.get(&author_id) {
            return Ok(Arc::clone(author));
        }

        let author = self
            .authors
            .get_author(author_id)?
            .map(Arc::new)
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "books.author_id {author_id} references a missing author"
                ))
            })?;
        authors.insert(author_id, Arc::clone(&author));
        Ok(author)
    }
}

/// Raw column values of one `books` row.
struct BookRow {
    id: BookId,
    title: String,
    isbn: String,
    author_id: AuthorId,
    publish_year: i32,
    book_type: String,
    download_url: Option<String>,
    file_size: Option<f64>,
    shelf_location: Option<String>,
    weight: Option<f64>,
    available: bool,
}

impl BookRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            isbn: row.get("isbn")?,
            author_id: row.get("author_id")?,
            publish_year: row.get("publish_year")?,
            book_type: row.get("book_type")?,
            download_url: row.get("download_url")?,
            file_size: row.get("file_size")?,
            shelf_location: row.get("shelf_location")?,
            weight: row.get("weight")?,
            available: row.get("available")?,
        })
    }
}

fn required<T>(value: Option<T>, column: &str, id: BookId) -> RepoResult<T> {
    value.ok_or_else(|| RepoError::InvalidData(format!("books.{column} is NULL for book {id}")))
}

fn map_write_error(err: rusqlite::Error, isbn: &str, author_id: AuthorId) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            SQLITE_CONSTRAINT_UNIQUE => return RepoError::DuplicateIsbn(isbn.to_string()),
            SQLITE_CONSTRAINT_FOREIGNKEY => return RepoError::AuthorNotFound(author_id),
            _ => {}
        }
    }
    err.into()
}

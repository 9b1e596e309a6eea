use libcat_core::db::open_db_in_memory;
use libcat_core::{
    Author, AuthorRepository, Book, BookFormat, BookKind, BookRepository, BookUpdate,
    BookValidationError, CatalogError, RepoError, SqliteAuthorRepository, SqliteBookRepository,
};
use rusqlite::Connection;
use std::sync::Arc;

fn stored_author(conn: &Connection) -> Arc<Author> {
    let authors = SqliteAuthorRepository::try_new(conn).unwrap();
    let id = authors
        .create_author(&Author::new("George Orwell", 1903, "British").unwrap())
        .unwrap();
    Arc::new(authors.get_author(id).unwrap().unwrap())
}

fn ebook(author: &Arc<Author>) -> Book {
    Book::ebook("1984", Arc::clone(author), 1949, "12345", 2.5, "site.com").unwrap()
}

fn printed(author: &Arc<Author>) -> Book {
    Book::printed("Animal Farm", Arc::clone(author), 1945, "67890", "A1", 0.5).unwrap()
}

#[test]
fn author_roundtrip_assigns_id() {
    let conn = open_db_in_memory().unwrap();
    let authors = SqliteAuthorRepository::try_new(&conn).unwrap();

    let id = authors
        .create_author(&Author::new("Ursula Le Guin", 1929, "American").unwrap())
        .unwrap();
    let loaded = authors.get_author(id).unwrap().unwrap();
    assert_eq!(loaded.id(), id);
    assert_eq!(loaded.name(), "Ursula Le Guin");
    assert_eq!(loaded.birth_year(), 1929);
    assert_eq!(loaded.nationality(), "American");

    assert!(authors.get_author(id + 100).unwrap().is_none());
    assert_eq!(authors.list_authors().unwrap().len(), 1);
}

#[test]
fn ebook_roundtrip_matches_except_author_identity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    let book = ebook(&author);

    let id = repo.add_ebook(&book).unwrap();
    let loaded = repo.get_book(id).unwrap().unwrap();

    assert_eq!(loaded.id(), id);
    assert_eq!(loaded.title(), book.title());
    assert_eq!(loaded.isbn(), book.isbn());
    assert_eq!(loaded.year(), book.year());
    assert_eq!(loaded.format(), book.format());
    assert_eq!(loaded.author(), book.author());
    assert!(!Arc::ptr_eq(loaded.author(), book.author()));
}

#[test]
fn printed_roundtrip_preserves_availability() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    let mut book = printed(&author);
    book.as_borrowable_mut().unwrap().borrow();

    let id = repo.add_printed_book(&book).unwrap();
    let loaded = repo.get_book(id).unwrap().unwrap();

    assert_eq!(loaded.kind(), BookKind::Printed);
    assert_eq!(loaded.access_instructions(), "Go to shelf: A1");
    assert!(!loaded.is_available());
}

#[test]
fn non_applicable_columns_are_null() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);

    let ebook_id = repo.add_ebook(&ebook(&author)).unwrap();
    let printed_id = repo.add_printed_book(&printed(&author)).unwrap();

    let (book_type, shelf, weight): (String, Option<String>, Option<f64>) = conn
        .query_row(
            "SELECT book_type, shelf_location, weight FROM books WHERE id = ?1;",
            [ebook_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(book_type, "EBOOK");
    assert_eq!((shelf, weight), (None, None));

    let (book_type, url, size): (String, Option<String>, Option<f64>) = conn
        .query_row(
            "SELECT book_type, download_url, file_size FROM books WHERE id = ?1;",
            [printed_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(book_type, "PRINTED");
    assert_eq!((url, size), (None, None));
}

#[test]
fn add_entry_points_reject_wrong_variant() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);

    let err = repo.add_ebook(&printed(&author)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::KindMismatch {
            expected: BookKind::EBook,
            actual: BookKind::Printed,
        }
    ));
    assert!(repo.list_books().unwrap().is_empty());

    let id = repo.add_book(&printed(&author)).unwrap();
    assert_eq!(repo.get_book(id).unwrap().unwrap().kind(), BookKind::Printed);
}

#[test]
fn missing_book_is_none_not_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    assert!(repo.get_book(42).unwrap().is_none());
    assert!(repo.get_book_by_isbn("nope").unwrap().is_none());
}

#[test]
fn get_by_isbn_finds_matching_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    repo.add_ebook(&ebook(&author)).unwrap();
    repo.add_printed_book(&printed(&author)).unwrap();

    let found = repo.get_book_by_isbn("67890").unwrap().unwrap();
    assert_eq!(found.title(), "Animal Farm");
}

#[test]
fn list_books_returns_rows_in_id_order_with_shared_author() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    let first = repo.add_ebook(&ebook(&author)).unwrap();
    let second = repo.add_printed_book(&printed(&author)).unwrap();

    let books = repo.list_books().unwrap();
    let ids: Vec<i64> = books.iter().map(|book| book.id()).collect();
    assert_eq!(ids, vec![first, second]);
    assert!(Arc::ptr_eq(books[0].author(), books[1].author()));
}

#[test]
fn duplicate_isbn_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    repo.add_ebook(&ebook(&author)).unwrap();

    let err = repo.add_ebook(&ebook(&author)).unwrap_err();
    assert!(matches!(&err, RepoError::DuplicateIsbn(isbn) if isbn == "12345"));
    assert!(matches!(
        CatalogError::from(err),
        CatalogError::DuplicateResource(_)
    ));
}

#[test]
fn unknown_author_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let ghost = Arc::new(Author::with_id(404, "Nobody", 1900, "None").unwrap());

    let err = repo.add_ebook(&ebook(&ghost)).unwrap_err();
    assert!(matches!(err, RepoError::AuthorNotFound(404)));
}

#[test]
fn update_rewrites_ebook_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    let id = repo.add_ebook(&ebook(&author)).unwrap();

    let mut update = BookUpdate::from_book(&repo.get_book(id).unwrap().unwrap());
    update.title = "1984 (Second Edition)".to_string();
    update.file_size = 4.0;
    update.download_url = "mirror.example".to_string();
    update.shelf_location = "ignored".to_string();
    repo.update_book(id, &update).unwrap();

    let loaded = repo.get_book(id).unwrap().unwrap();
    assert_eq!(loaded.title(), "1984 (Second Edition)");
    let digital = loaded.as_digital_access().unwrap();
    assert_eq!(digital.file_size(), 4.0);
    assert_eq!(digital.download_url(), "mirror.example");

    let shelf: Option<String> = conn
        .query_row("SELECT shelf_location FROM books WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(shelf, None);
}

#[test]
fn update_rewrites_printed_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    let id = repo.add_printed_book(&printed(&author)).unwrap();

    let mut update = BookUpdate::from_book(&repo.get_book(id).unwrap().unwrap());
    update.shelf_location = "B7".to_string();
    update.weight = 0.8;
    update.publish_year = 1946;
    repo.update_book(id, &update).unwrap();

    let loaded = repo.get_book(id).unwrap().unwrap();
    assert_eq!(loaded.year(), 1946);
    match loaded.format() {
        BookFormat::Printed(edition) => {
            assert_eq!(edition.shelf_location(), "B7");
            assert_eq!(edition.weight(), 0.8);
        }
        other => panic!("unexpected format: {other:?}"),
    }
}

#[test]
fn update_validates_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    let id = repo.add_ebook(&ebook(&author)).unwrap();
    let base = BookUpdate::from_book(&repo.get_book(id).unwrap().unwrap());

    let blank = BookUpdate {
        title: "  ".to_string(),
        ..base.clone()
    };
    assert!(matches!(
        repo.update_book(id, &blank).unwrap_err(),
        RepoError::Validation(BookValidationError::EmptyTitle)
    ));

    let negative = BookUpdate {
        file_size: -1.0,
        ..base.clone()
    };
    assert!(matches!(
        repo.update_book(id, &negative).unwrap_err(),
        RepoError::Validation(BookValidationError::NegativeFileSize(_))
    ));

    assert_eq!(repo.get_book(id).unwrap().unwrap().title(), "1984");
}

#[test]
fn non_finite_weight_never_reaches_the_table() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    repo.add_ebook(&ebook(&author)).unwrap();

    assert!(matches!(
        Book::printed("Heavy", Arc::clone(&author), 2000, "999", "A1", f64::NAN),
        Err(BookValidationError::InvalidWeight(_))
    ));

    let id = repo.add_printed_book(&printed(&author)).unwrap();
    let update = BookUpdate {
        weight: f64::NAN,
        ..BookUpdate::from_book(&repo.get_book(id).unwrap().unwrap())
    };
    assert!(matches!(
        repo.update_book(id, &update).unwrap_err(),
        RepoError::Validation(BookValidationError::InvalidWeight(_))
    ));

    let stored = repo.get_book(id).unwrap().unwrap();
    match stored.format() {
        BookFormat::Printed(edition) => assert_eq!(edition.weight(), 0.5),
        other => panic!("expected printed edition, got {other:?}"),
    }
    assert_eq!(repo.list_books().unwrap().len(), 2);
}

#[test]
fn update_of_missing_book_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    let update = BookUpdate::from_book(&ebook(&author));

    let err = repo.update_book(99, &update).unwrap_err();
    assert!(matches!(err, RepoError::BookNotFound(99)));
}

#[test]
fn unknown_discriminator_is_rejected_on_update_and_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    conn.execute(
        "INSERT INTO books (id, title, isbn, author_id, publish_year, book_type)
         VALUES (7, 'Spoken', '777', ?1, 2001, 'AUDIOBOOK');",
        [author.id()],
    )
    .unwrap();

    let update = BookUpdate {
        title: "Changed".to_string(),
        ..BookUpdate::from_book(&ebook(&author))
    };
    let err = repo.update_book(7, &update).unwrap_err();
    assert!(matches!(&err, RepoError::UnknownBookType(kind) if kind == "AUDIOBOOK"));

    let title: String = conn
        .query_row("SELECT title FROM books WHERE id = 7;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(title, "Spoken");

    let err = repo.get_book(7).unwrap_err();
    assert!(matches!(err, RepoError::UnknownBookType(_)));
}

#[test]
fn set_available_persists_lending_state() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    let id = repo.add_ebook(&ebook(&author)).unwrap();

    repo.set_available(id, false).unwrap();
    assert!(!repo.get_book(id).unwrap().unwrap().is_available());
    repo.set_available(id, true).unwrap();
    assert!(repo.get_book(id).unwrap().unwrap().is_available());

    let err = repo.set_available(id + 1, false).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn delete_removes_row_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let author = stored_author(&conn);
    let first = repo.add_ebook(&ebook(&author)).unwrap();
    let second = repo.add_printed_book(&printed(&author)).unwrap();

    repo.delete_book(second).unwrap();
    let remaining: Vec<i64> = repo
        .list_books()
        .unwrap()
        .iter()
        .map(|book| book.id())
        .collect();
    assert_eq!(remaining, vec![first]);
    assert!(repo.get_book(second).unwrap().is_none());

    let err = repo.delete_book(second).unwrap_err();
    assert!(matches!(err, RepoError::BookNotFound(id) if id == second));
}

#[test]
fn storage_failure_is_an_error_not_a_missing_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    conn.execute_batch("DROP TABLE books;").unwrap();

    let err = repo.get_book(1).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(!err.is_not_found());
}

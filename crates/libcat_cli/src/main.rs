//! Catalog demonstration entry point.
//!
//! # Responsibility
//! - Run a fixed script over the in-memory services, then the same kind of
//!   CRUD against SQLite, printing one line per observable step.
//!
//! # Configuration
//! - `LIBCAT_LOG_DIR` / `LIBCAT_LOG_LEVEL`: optional file logging.
//! - `LIBCAT_DB_PATH`: database file for the persistence part; in-memory when
//!   unset.

use libcat_core::db::{open_db, open_db_in_memory};
use libcat_core::{
    init_logging, Author, AuthorRepository, AuthorService, Book, BookRepository, BookService,
    BookUpdate, Capability, CatalogError, LoggingConfig, RepoError, SqliteAuthorRepository,
    SqliteBookRepository,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

const DB_PATH_ENV: &str = "LIBCAT_DB_PATH";
const LATE_DAYS: u32 = 10;

fn main() -> ExitCode {
    match LoggingConfig::from_env() {
        Ok(Some(config)) => {
            if let Err(err) = init_logging(&config) {
                eprintln!("logging disabled: {err}");
            }
        }
        Ok(None) => {}
        Err(err) => eprintln!("logging disabled: {err}"),
    }
    info!(
        "event=demo_start module=cli status=ok version={}",
        libcat_core::core_version()
    );

    if let Err(err) = run_in_memory_demo() {
        eprintln!("unexpected error: {err}");
        return ExitCode::FAILURE;
    }

    println!("\n--- Persistence Test ---");
    if let Err(err) = run_persistence_demo() {
        eprintln!("Persistence demo failed: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run_in_memory_demo() -> Result<(), Box<dyn Error>> {
    let mut books = BookService::new();
    let mut authors = AuthorService::new();

    println!("--- Polymorphism Test ---");
    let orwell = authors.create_author(Author::new("George Orwell", 1903, "British")?);

    let first_id = books.create_ebook(Book::ebook(
        "1984",
        Arc::clone(&orwell),
        1949,
        "12345",
        2.5,
        "site.com",
    )?)?;
    let second_id = books.create_printed_book(Book::printed(
        "Animal Farm",
        Arc::clone(&orwell),
        1945,
        "67890",
        "A1",
        0.5,
    )?)?;

    let first = books.get_book_by_id(first_id)?;
    let second = books.get_book_by_id(second_id)?;
    println!(
        "Book 1 Fee ({LATE_DAYS} days): {:.1}",
        first.late_fee(LATE_DAYS)
    );
    println!(
        "Book 2 Fee ({LATE_DAYS} days): {:.1}",
        second.late_fee(LATE_DAYS)
    );
    println!("Book 1 Access: {}", first.access_instructions());
    println!("Book 2 Access: {}", second.access_instructions());
    if let Some(digital) = first.as_digital_access() {
        println!(
            "Book 1 Download: {} ({} MB)",
            digital.download_url(),
            digital.file_size()
        );
    }

    println!("\n--- Interface Test ---");
    let first = books.get_book_by_id_mut(first_id)?;
    if let Some(item) = first.as_borrowable_mut() {
        item.borrow();
        println!("Book 1 is available: {}", item.is_available());
        item.return_item();
        println!(
            "Book 1 is available after return: {}",
            item.is_available()
        );
    }
    let second = books.get_book_by_id(second_id)?;
    for capability in [Capability::Borrowable, Capability::DigitalAccess] {
        println!(
            "Book 2 supports {}: {}",
            capability.as_str(),
            second.supports(capability)
        );
    }

    println!("\n--- CRUD Test ---");
    println!("Total books: {}", books.get_all_books().len());
    for book in books.get_all_books() {
        println!("ID: {}, Title: {}", book.id(), book.title());
    }

    let found = books.get_book_by_id_mut(first_id)?;
    println!("Found book: {}", found.title());
    found.set_title("1984 (Updated)")?;
    println!("Updated title: {}", found.title());

    books.delete_book_by_id(second_id)?;
    println!(
        "Book with ID {second_id} deleted. Remaining: {}",
        books.get_all_books().len()
    );

    println!("\n--- Exception Test ---");
    if let Err(err) = books.get_book_by_id(99) {
        println!("Caught exception: {err}");
    }

    let outcome = Book::ebook("", Arc::clone(&orwell), 2020, "000", 1.0, "url")
        .map_err(CatalogError::from)
        .and_then(|book| books.create_ebook(book));
    if let Err(err) = outcome {
        println!("Caught exception: {err}");
    }

    println!("\n--- Composition Test ---");
    let first = books.get_book_by_id(first_id)?;
    println!(
        "Book: {} is written by {}",
        first.title(),
        first.author().name()
    );

    Ok(())
}

fn run_persistence_demo() -> Result<(), Box<dyn Error>> {
    let conn = match std::env::var(DB_PATH_ENV) {
        Ok(path) => open_db(path)?,
        Err(_) => open_db_in_memory()?,
    };
    let authors = SqliteAuthorRepository::try_new(&conn)?;
    let books = SqliteBookRepository::try_new(&conn)?;

    let author_id = authors.create_author(&Author::new("George Orwell", 1903, "British")?)?;
    let orwell = authors
        .get_author(author_id)?
        .map(Arc::new)
        .ok_or(RepoError::AuthorNotFound(author_id))?;

    let ebook_id = books
        .add_ebook(&Book::ebook(
            "1984",
            Arc::clone(&orwell),
            1949,
            "12345",
            2.5,
            "site.com",
        )?)
        .map_err(CatalogError::from)?;
    let printed_id = books
        .add_printed_book(&Book::printed(
            "Animal Farm",
            Arc::clone(&orwell),
            1945,
            "67890",
            "A1",
            0.5,
        )?)
        .map_err(CatalogError::from)?;
    println!("Stored books with IDs {ebook_id} and {printed_id}");

    let Some(stored) = books.get_book(ebook_id)? else {
        return Err(CatalogError::ResourceNotFound(ebook_id).into());
    };
    println!(
        "Loaded book {}: {} by {} ({})",
        stored.id(),
        stored.title(),
        stored.author().name(),
        stored.kind()
    );
    if let Some(by_isbn) = books.get_book_by_isbn("67890")? {
        println!(
            "Found by ISBN 67890: {} [{}]",
            by_isbn.title(),
            by_isbn.access_instructions()
        );
    }

    let mut update = BookUpdate::from_book(&stored);
    update.title = "1984 (Second Edition)".to_string();
    books.update_book(ebook_id, &update)?;
    println!("Book updated successfully");

    books.set_available(printed_id, false)?;
    if let Some(lent) = books.get_book(printed_id)? {
        println!("Book {printed_id} is available: {}", lent.is_available());
    }

    books.delete_book(printed_id)?;
    println!(
        "Book with ID {printed_id} deleted. Remaining: {}",
        books.list_books()?.len()
    );

    if books.get_book(printed_id)?.is_none() {
        println!("There is no book with ID {printed_id}");
    }
    if let Err(err) = books.delete_book(printed_id).map_err(CatalogError::from) {
        println!("Caught exception: {err}");
    }

    Ok(())
}

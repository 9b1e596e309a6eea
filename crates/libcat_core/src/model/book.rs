//! Book domain model.
//!
//! # Responsibility
//! - Define the shared book record and its closed set of format variants.
//! - Dispatch variant behavior (late fee, access instructions, capabilities)
//!   by matching on the format.
//!
//! # Invariants
//! - `title` is non-blank after trimming; the supplied text is kept as-is.
//! - `year <= MAX_PUBLISH_YEAR`.
//! - E-book `file_size >= 0`.
//! - Every mutation path re-checks the invariant it touches.

use super::author::Author;
use super::capability::{Borrowable, Capability, DigitalAccess};
use super::UNASSIGNED_ID;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Numeric book identifier (SQLite rowid compatible).
pub type BookId = i64;

/// Latest publication year accepted by the catalog.
pub const MAX_PUBLISH_YEAR: i32 = 2026;

const EBOOK_FEE_PER_DAY: f64 = 0.25;
const PRINTED_FEE_PER_DAY: f64 = 0.50;
const EBOOK_ACCESS_INSTRUCTIONS: &str = "Download from portal";

/// Book variant tag, mirrored to the `book_type` discriminator column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookKind {
    EBook,
    Printed,
}

impl BookKind {
    /// Discriminator value stored in `books.book_type`.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::EBook => "EBOOK",
            Self::Printed => "PRINTED",
        }
    }

    /// Parses a stored discriminator. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EBOOK" => Some(Self::EBook),
            "PRINTED" => Some(Self::Printed),
            _ => None,
        }
    }
}

impl Display for BookKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Validation failures for book construction and mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookValidationError {
    EmptyTitle,
    FutureYear { year: i32, max: i32 },
    NegativeFileSize(f64),
    /// Weight is negative or not a finite number.
    InvalidWeight(f64),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title cannot be empty"),
            Self::FutureYear { year, max } => {
                write!(f, "year {year} cannot be in the future (max {max})")
            }
            Self::NegativeFileSize(size) => write!(f, "file size cannot be negative: {size}"),
            Self::InvalidWeight(weight) => {
                write!(f, "weight must be a finite non-negative number: {weight}")
            }
        }
    }
}

impl Error for BookValidationError {}

/// Electronic edition fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EBook {
    file_size: f64,
    download_url: String,
    #[serde(default = "default_available")]
    available: bool,
}

impl EBook {
    /// Creates an available e-book edition.
    pub fn new(
        file_size: f64,
        download_url: impl Into<String>,
    ) -> Result<Self, BookValidationError> {
        validate_file_size(file_size)?;
        Ok(Self {
            file_size,
            download_url: download_url.into(),
            available: true,
        })
    }

    pub fn set_file_size(&mut self, file_size: f64) -> Result<(), BookValidationError> {
        validate_file_size(file_size)?;
        self.file_size = file_size;
        Ok(())
    }

    pub fn set_download_url(&mut self, download_url: impl Into<String>) {
        self.download_url = download_url.into();
    }
}

impl Borrowable for EBook {
    fn borrow(&mut self) {
        if self.available {
            self.available = false;
        }
    }

    fn return_item(&mut self) {
        self.available = true;
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

impl DigitalAccess for EBook {
    fn download_url(&self) -> &str {
        &self.download_url
    }

    fn file_size(&self) -> f64 {
        self.file_size
    }
}

/// Physical edition fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintedBook {
    shelf_location: String,
    /// Weight in kilograms.
    weight: f64,
    #[serde(default = "default_available")]
    available: bool,
}

impl PrintedBook {
    /// Creates an available printed edition.
    pub fn new(
        shelf_location: impl Into<String>,
        weight: f64,
    ) -> Result<Self, BookValidationError> {
        validate_weight(weight)?;
        Ok(Self {
            shelf_location: shelf_location.into(),
            weight,
            available: true,
        })
    }

    pub fn shelf_location(&self) -> &str {
        &self.shelf_location
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_shelf_location(&mut self, shelf_location: impl Into<String>) {
        self.shelf_location = shelf_location.into();
    }

    pub fn set_weight(&mut self, weight: f64) -> Result<(), BookValidationError> {
        validate_weight(weight)?;
        self.weight = weight;
        Ok(())
    }
}

impl Borrowable for PrintedBook {
    fn borrow(&mut self) {
        self.available = false;
    }

    fn return_item(&mut self) {
        self.available = true;
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

/// Closed set of book formats.
///
/// Serialized inline with the book, tagged by `book_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "book_type")]
pub enum BookFormat {
    #[serde(rename = "EBOOK")]
    EBook(EBook),
    #[serde(rename = "PRINTED")]
    Printed(PrintedBook),
}

impl BookFormat {
    pub fn kind(&self) -> BookKind {
        match self {
            Self::EBook(_) => BookKind::EBook,
            Self::Printed(_) => BookKind::Printed,
        }
    }
}

/// Catalog book.
///
/// The author is shared, not owned: several books may point at the same
/// `Author` allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BookWire")]
pub struct Book {
    id: BookId,
    title: String,
    author: Arc<Author>,
    year: i32,
    isbn: String,
    #[serde(flatten)]
    format: BookFormat,
}

#[derive(Deserialize)]
struct BookWire {
    id: BookId,
    title: String,
    author: Arc<Author>,
    year: i32,
    isbn: String,
    #[serde(flatten)]
    format: BookFormat,
}

impl TryFrom<BookWire> for Book {
    type Error = BookValidationError;

    fn try_from(value: BookWire) -> Result<Self, Self::Error> {
        Self::new(
            value.id,
            value.title,
            value.author,
            value.year,
            value.isbn,
            value.format,
        )
    }
}

impl Book {
    /// Creates a book with a known id after validating every field.
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: Arc<Author>,
        year: i32,
        isbn: impl Into<String>,
        format: BookFormat,
    ) -> Result<Self, BookValidationError> {
        let book = Self {
            id,
            title: title.into(),
            author,
            year,
            isbn: isbn.into(),
            format,
        };
        book.validate()?;
        Ok(book)
    }

    /// Creates an unnumbered e-book.
    pub fn ebook(
        title: impl Into<String>,
        author: Arc<Author>,
        year: i32,
        isbn: impl Into<String>,
        file_size: f64,
        download_url: impl Into<String>,
    ) -> Result<Self, BookValidationError> {
        let edition = EBook::new(file_size, download_url)?;
        Self::new(
            UNASSIGNED_ID,
            title,
            author,
            year,
            isbn,
            BookFormat::EBook(edition),
        )
    }

    /// Creates an unnumbered printed book.
    pub fn printed(
        title: impl Into<String>,
        author: Arc<Author>,
        year: i32,
        isbn: impl Into<String>,
        shelf_location: impl Into<String>,
        weight: f64,
    ) -> Result<Self, BookValidationError> {
        Self::new(
            UNASSIGNED_ID,
            title,
            author,
            year,
            isbn,
            BookFormat::Printed(PrintedBook::new(shelf_location, weight)?),
        )
    }

    /// Checks every field invariant.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        validate_title(&self.title)?;
        validate_year(self.year)?;
        match &self.format {
            BookFormat::EBook(edition) => validate_file_size(edition.file_size),
            BookFormat::Printed(edition) => validate_weight(edition.weight),
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: BookId) {
        self.id = id;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), BookValidationError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        Ok(())
    }

    pub fn author(&self) -> &Arc<Author> {
        &self.author
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn set_year(&mut self, year: i32) -> Result<(), BookValidationError> {
        validate_year(year)?;
        self.year = year;
        Ok(())
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn kind(&self) -> BookKind {
        self.format.kind()
    }

    pub fn format(&self) -> &BookFormat {
        &self.format
    }

    /// Fee owed for returning the book `days` days late.
    pub fn late_fee(&self, days: u32) -> f64 {
        let per_day = match self.format {
            BookFormat::EBook(_) => EBOOK_FEE_PER_DAY,
            BookFormat::Printed(_) => PRINTED_FEE_PER_DAY,
        };
        f64::from(days) * per_day
    }

    /// Human-readable instructions for getting hold of the book.
    pub fn access_instructions(&self) -> String {
        match &self.format {
            BookFormat::EBook(_) => EBOOK_ACCESS_INSTRUCTIONS.to_string(),
            BookFormat::Printed(edition) => format!("Go to shelf: {}", edition.shelf_location),
        }
    }

    /// Returns whether this book's variant exposes `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Borrowable => self.as_borrowable().is_some(),
            Capability::DigitalAccess => self.as_digital_access().is_some(),
        }
    }

    pub fn as_borrowable(&self) -> Option<&dyn Borrowable> {
        match &self.format {
            BookFormat::EBook(edition) => Some(edition),
            BookFormat::Printed(edition) => Some(edition),
        }
    }

    pub fn as_borrowable_mut(&mut self) -> Option<&mut dyn Borrowable> {
        match &mut self.format {
            BookFormat::EBook(edition) => Some(edition),
            BookFormat::Printed(edition) => Some(edition),
        }
    }

    pub fn as_digital_access(&self) -> Option<&dyn DigitalAccess> {
        match &self.format {
            BookFormat::EBook(edition) => Some(edition),
            BookFormat::Printed(_) => None,
        }
    }

    /// Availability flag regardless of variant.
    pub fn is_available(&self) -> bool {
        self.as_borrowable()
            .is_some_and(|borrowable| borrowable.is_available())
    }

    pub(crate) fn set_available(&mut self, available: bool) {
        match &mut self.format {
            BookFormat::EBook(edition) => edition.available = available,
            BookFormat::Printed(edition) => edition.available = available,
        }
    }
}

fn default_available() -> bool {
    true
}

pub(crate) fn validate_title(title: &str) -> Result<(), BookValidationError> {
    if title.trim().is_empty() {
        return Err(BookValidationError::EmptyTitle);
    }
    Ok(())
}

pub(crate) fn validate_year(year: i32) -> Result<(), BookValidationError> {
    if year > MAX_PUBLISH_YEAR {
        return Err(BookValidationError::FutureYear {
            year,
            max: MAX_PUBLISH_YEAR,
        });
    }
    Ok(())
}

pub(crate) fn validate_file_size(file_size: f64) -> Result<(), BookValidationError> {
    if file_size.is_nan() || file_size < 0.0 {
        return Err(BookValidationError::NegativeFileSize(file_size));
    }
    Ok(())
}

pub(crate) fn validate_weight(weight: f64) -> Result<(), BookValidationError> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(BookValidationError::InvalidWeight(weight));
    }
    Ok(())
}

//! Author repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist authors and read them back by id for book materialization.
//!
//! # Invariants
//! - Stored ids are assigned by SQLite when the entity is unnumbered.
//! - Rows that fail `Author` validation are reported, not masked.

use super::{logged, RepoResult};
use crate::db::ensure_connection_ready;
use crate::model::author::{Author, AuthorId};
use crate::model::UNASSIGNED_ID;
use rusqlite::{params, Connection, OptionalExtension, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT id, name, birth_year, nationality FROM authors";

/// Repository interface for author persistence.
pub trait AuthorRepository {
    /// Inserts one author and returns its stored id.
    fn create_author(&self, author: &Author) -> RepoResult<AuthorId>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    /// Lists all authors ordered by id.
    fn list_authors(&self) -> RepoResult<Vec<Author>>;
}

/// SQLite-backed author repository.
#[derive(Clone, Copy)]
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["authors"])?;
        Ok(Self { conn })
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn create_author(&self, author: &Author) -> RepoResult<AuthorId> {
        logged("author_insert", self.insert_author(author))
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        logged("author_get", self.select_author(id))
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        logged("author_list", self.select_all_authors())
    }
}

impl SqliteAuthorRepository<'_> {
    fn insert_author(&self, author: &Author) -> RepoResult<AuthorId> {
        let explicit_id = (author.id() != UNASSIGNED_ID).then_some(author.id());
        self.conn.execute(
            "INSERT INTO authors (id, name, birth_year, nationality)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                explicit_id,
                author.name(),
                author.birth_year(),
                author.nationality(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn select_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt.query_row([id], read_author_fields).optional()?;
        row.map(build_author).transpose()
    }

    fn select_all_authors(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} ORDER BY id ASC;"))?;
        let rows = stmt.query_map([], read_author_fields)?;

        let mut authors = Vec::new();
        for row in rows {
            authors.push(build_author(row?)?);
        }
        Ok(authors)
    }
}

type AuthorFields = (AuthorId, String, i32, String);

fn read_author_fields(row: &Row<'_>) -> rusqlite::Result<AuthorFields> {
    Ok((
        row.get("id")?,
        row.get("name")?,
        row.get("birth_year")?,
        row.get("nationality")?,
    ))
}

fn build_author((id, name, birth_year, nationality): AuthorFields) -> RepoResult<Author> {
    Ok(Author::with_id(id, name, birth_year, nationality)?)
}

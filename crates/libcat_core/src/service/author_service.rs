//! Author use-case service.
//!
//! # Responsibility
//! - Number new authors and keep them in insertion order.
//!
//! # Invariants
//! - Every stored author has a unique id assigned here exactly once.

use crate::model::author::Author;
use crate::service::ids::{IdGenerator, SequentialIdGenerator};
use log::debug;
use std::sync::Arc;

/// In-memory author registry.
pub struct AuthorService<G: IdGenerator = SequentialIdGenerator> {
    authors: Vec<Arc<Author>>,
    ids: G,
}

impl AuthorService {
    /// Creates an empty service numbering from 1.
    pub fn new() -> Self {
        Self::with_id_generator(SequentialIdGenerator::new())
    }
}

impl Default for AuthorService {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> AuthorService<G> {
    pub fn with_id_generator(ids: G) -> Self {
        Self {
            authors: Vec::new(),
            ids,
        }
    }

    /// Assigns the next id to `author` and stores it.
    ///
    /// Any id already carried by `author` is overwritten. The returned handle
    /// can be shared by the books this author wrote.
    pub fn create_author(&mut self, mut author: Author) -> Arc<Author> {
        author.set_id(self.ids.next_id());
        debug!(
            "event=author_create module=service status=ok id={}",
            author.id()
        );
        let author = Arc::new(author);
        self.authors.push(Arc::clone(&author));
        author
    }

    /// Returns all authors in insertion order.
    pub fn get_all_authors(&self) -> &[Arc<Author>] {
        &self.authors
    }
}

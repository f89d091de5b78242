//! In-memory [`BookRepository`] implementation guarded by a single mutex.
//!
//! The collection is small and flat, so the whole state sits behind one
//! [`parking_lot::Mutex`]. Every operation takes the lock exactly once and
//! never yields while holding it.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::traits::BookRepository;
use crate::types::{Book, BookFields, BookId, BookPayload};

/// How the store picks the id of a newly created record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdAssignment {
    /// Last record's id + 1, or 1 when empty. Deleting the tail record
    /// makes its id available again.
    #[default]
    LastPlusOne,
    /// Highest id ever assigned + 1. Ids are never reused.
    Monotonic,
}

#[derive(Debug)]
struct StoreState {
    books: Vec<Book>,
    highest_assigned: BookId,
}

impl StoreState {
    fn position(&self, id: BookId) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }

    /// `None` once the id space is used up. `highest_assigned` is never
    /// below the last record's id, so `Monotonic` only needs the counter.
    fn next_id(&self, strategy: IdAssignment) -> Option<BookId> {
        match strategy {
            IdAssignment::LastPlusOne => self.books.last().map_or(Some(1), |b| b.id.checked_add(1)),
            IdAssignment::Monotonic => self.highest_assigned.checked_add(1),
        }
    }
}

/// Process-local book collection.
#[derive(Debug)]
pub struct InMemoryBookStore {
    state: Mutex<StoreState>,
    id_assignment: IdAssignment,
}

impl InMemoryBookStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(id_assignment: IdAssignment) -> Self {
        Self::with_books(id_assignment, Vec::new())
    }

    /// Creates a store holding the two startup records.
    #[must_use]
    pub fn seeded(id_assignment: IdAssignment) -> Self {
        Self::with_books(id_assignment, seed_books())
    }

    /// Creates a store from an initial set of records.
    ///
    /// Records are ordered by id and later duplicates of an id are dropped,
    /// so the collection starts out in the shape the store itself maintains.
    #[must_use]
    pub fn with_books(id_assignment: IdAssignment, mut books: Vec<Book>) -> Self {
        books.sort_by_key(|b| b.id);
        books.dedup_by_key(|b| b.id);
        let highest_assigned = books.last().map_or(0, |b| b.id);

        Self {
            state: Mutex::new(StoreState {
                books,
                highest_assigned,
            }),
            id_assignment,
        }
    }

    /// Returns the configured id strategy.
    #[must_use]
    pub fn id_assignment(&self) -> IdAssignment {
        self.id_assignment
    }
}

impl Default for InMemoryBookStore {
    fn default() -> Self {
        Self::seeded(IdAssignment::default())
    }
}

impl BookRepository for InMemoryBookStore {
    fn list(&self) -> Vec<Book> {
        self.state.lock().books.clone()
    }

    fn get(&self, id: BookId) -> Result<Book, StoreError> {
        let state = self.state.lock();
        state
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn create(&self, payload: BookPayload) -> Result<Book, StoreError> {
        let fields: BookFields = payload.validate()?;

        let mut state = self.state.lock();
        let Some(id) = state.next_id(self.id_assignment) else {
            warn!(strategy = ?self.id_assignment, "no book ids left to assign");
            return Err(StoreError::IdsExhausted);
        };
        let book = Book::from_fields(id, fields);
        state.books.push(book.clone());
        state.highest_assigned = state.highest_assigned.max(id);

        info!(book_id = id, total = state.books.len(), "book created");
        Ok(book)
    }

    fn update(&self, id: BookId, payload: BookPayload) -> Result<Book, StoreError> {
        let mut state = self.state.lock();
        let idx = state.position(id).ok_or(StoreError::NotFound)?;
        let fields = payload.validate()?;

        let book = &mut state.books[idx];
        book.apply(fields);

        debug!(book_id = id, "book updated");
        Ok(book.clone())
    }

    fn delete(&self, id: BookId) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let idx = state.position(id).ok_or(StoreError::NotFound)?;
        state.books.remove(idx);

        info!(book_id = id, total = state.books.len(), "book deleted");
        Ok(())
    }

    fn len(&self) -> usize {
        self.state.lock().books.len()
    }
}

fn seed_books() -> Vec<Book> {
    vec![
        Book {
            id: 1,
            title: "1984".to_string(),
            author: "George Orwell".to_string(),
            published_year: 1949,
        },
        Book {
            id: 2,
            title: "To Kill a Mockingbird".to_string(),
            author: "Harper Lee".to_string(),
            published_year: 1960,
        },
    ]
}

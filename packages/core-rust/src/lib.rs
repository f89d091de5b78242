//! Bookshelf Core: book records, required-field validation, and the in-memory record store.

pub mod error;
pub mod schema;
pub mod store;
pub mod traits;
pub mod types;

pub use error::StoreError;
pub use schema::{FieldDef, BOOK_SCHEMA};
pub use store::{IdAssignment, InMemoryBookStore};
pub use traits::BookRepository;
pub use types::{parse_id, Book, BookFields, BookId, BookPayload};

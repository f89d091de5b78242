//! Storage seam between the HTTP handlers and the book collection.

use crate::error::StoreError;
use crate::types::{Book, BookId, BookPayload};

/// Authoritative owner of the book collection.
///
/// Implementations serialize every operation against every other one; callers
/// only ever receive clones, never the underlying container. Each operation
/// either fully succeeds or fails with no side effect.
pub trait BookRepository: Send + Sync {
    /// Returns the whole collection in insertion order.
    fn list(&self) -> Vec<Book>;

    /// Returns the record with the given id.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no record has that id.
    fn get(&self, id: BookId) -> Result<Book, StoreError>;

    /// Validates the payload, assigns an id, and appends a new record.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] if a required field is missing,
    /// [`StoreError::IdsExhausted`] if no id is left to assign.
    fn create(&self, payload: BookPayload) -> Result<Book, StoreError>;

    /// Overwrites the mutable fields of an existing record in place.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the id is absent (checked before
    /// validation), otherwise [`StoreError::Validation`] for missing fields.
    fn update(&self, id: BookId, payload: BookPayload) -> Result<Book, StoreError>;

    /// Removes the record, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no record has that id.
    fn delete(&self, id: BookId) -> Result<(), StoreError>;

    /// Number of records currently held.
    fn len(&self) -> usize;

    /// Whether the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

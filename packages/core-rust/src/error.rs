//! Errors returned by record store operations.

/// The failure kinds a store operation can produce.
///
/// The `Display` text is the exact message sent to HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record in the collection has the requested id.
    #[error("Book not found")]
    NotFound,
    /// A write carried one or more missing or empty required fields.
    #[error("All fields are required")]
    Validation,
    /// The next id would overflow [`BookId`](crate::BookId).
    #[error("No book ids left to assign")]
    IdsExhausted,
}

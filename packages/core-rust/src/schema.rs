//! Required-field schema for book writes.
//!
//! Decoding and validation are separate steps: a request body is decoded into
//! a [`BookPayload`] with every field optional, then [`BookPayload::validate`]
//! checks it against [`BOOK_SCHEMA`] and yields typed [`BookFields`].

use crate::error::StoreError;
use crate::types::{BookFields, BookPayload};

/// Single field definition within the book schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Wire name of the field.
    pub name: &'static str,
    /// Whether the field must be present on every write.
    pub required: bool,
}

/// Fields every create and update must carry.
pub const BOOK_SCHEMA: [FieldDef; 3] = [
    FieldDef { name: "title", required: true },
    FieldDef { name: "author", required: true },
    FieldDef { name: "publishedYear", required: true },
];

impl BookPayload {
    /// Returns the wire names of required fields that are absent.
    ///
    /// Empty strings and a zero year count as absent. Whitespace-only
    /// strings are accepted.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        BOOK_SCHEMA
            .iter()
            .filter(|field| field.required && !self.has_field(field.name))
            .map(|field| field.name)
            .collect()
    }

    fn has_field(&self, name: &str) -> bool {
        match name {
            "title" => self.title.as_deref().is_some_and(|s| !s.is_empty()),
            "author" => self.author.as_deref().is_some_and(|s| !s.is_empty()),
            "publishedYear" => self.published_year.is_some_and(|y| y != 0),
            _ => false,
        }
    }

    /// Checks the payload against [`BOOK_SCHEMA`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if any required field is missing.
    pub fn validate(self) -> Result<BookFields, StoreError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(?missing, "book payload rejected");
            return Err(StoreError::Validation);
        }

        match (self.title, self.author, self.published_year) {
            (Some(title), Some(author), Some(published_year)) => Ok(BookFields {
                title,
                author,
                published_year,
            }),
            _ => Err(StoreError::Validation),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Store-assigned book identifier. Always positive.
pub type BookId = u64;

/// A single book record as held by the store and returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier, immutable after creation.
    pub id: BookId,
    /// Non-empty title.
    pub title: String,
    /// Non-empty author name.
    pub author: String,
    /// Year of first publication.
    pub published_year: i64,
}

impl Book {
    /// Builds a record from validated fields and an assigned id.
    #[must_use]
    pub fn from_fields(id: BookId, fields: BookFields) -> Self {
        Self {
            id,
            title: fields.title,
            author: fields.author,
            published_year: fields.published_year,
        }
    }

    /// Overwrites every mutable field wholesale. The id is left untouched.
    pub fn apply(&mut self, fields: BookFields) {
        self.title = fields.title;
        self.author = fields.author;
        self.published_year = fields.published_year;
    }
}

/// Untrusted write input: every field optional, unknown fields ignored.
///
/// Produced by decoding a request body; turned into [`BookFields`] by
/// [`BookPayload::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_year: Option<i64>,
}

impl BookPayload {
    /// Convenience constructor with every field present.
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>, published_year: i64) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
            published_year: Some(published_year),
        }
    }
}

/// The validated, fully-populated mutable fields of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub published_year: i64,
}

/// Parses a textual identifier (typically a URL path segment).
///
/// Accepts leading whitespace, an optional `+`, and reads the longest run of
/// leading ASCII digits, ignoring anything after it (`"12abc"` is 12,
/// `"1.5"` is 1). Returns `None` when there are no leading digits, the value
/// is negative or zero, or it overflows, so such input can never match a
/// stored record.
#[must_use]
pub fn parse_id(raw: &str) -> Option<BookId> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let id: BookId = unsigned[..digits_end].parse().ok()?;
    (id > 0).then_some(id)
}
